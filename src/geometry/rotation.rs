//! Quarter-turn rotation and page-space helpers
//!
//! The document engine speaks unrotated page space with a top-left origin.
//! Everything the converter and layout see is "view space": the page after
//! clockwise rotation, with the natural size swapped on odd quarter turns.

use serde::{Deserialize, Serialize};

use super::Rectangle;

/// Clockwise page rotation in quarter turns
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Build from degrees; any multiple of 90 (negative included) is accepted
    #[must_use]
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        match degrees.rem_euclid(360) {
            0 => Some(Self::Deg0),
            90 => Some(Self::Deg90),
            180 => Some(Self::Deg180),
            270 => Some(Self::Deg270),
            _ => None,
        }
    }

    #[must_use]
    pub const fn degrees(self) -> i32 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    #[must_use]
    pub const fn clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg90,
            Self::Deg90 => Self::Deg180,
            Self::Deg180 => Self::Deg270,
            Self::Deg270 => Self::Deg0,
        }
    }

    #[must_use]
    pub const fn counter_clockwise(self) -> Self {
        match self {
            Self::Deg0 => Self::Deg270,
            Self::Deg90 => Self::Deg0,
            Self::Deg180 => Self::Deg90,
            Self::Deg270 => Self::Deg180,
        }
    }

    /// Odd quarter turns exchange width and height
    #[must_use]
    pub const fn swaps_axes(self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }

    /// Map a rectangle from unrotated page space into view space.
    ///
    /// `page` is the unrotated page size.
    #[must_use]
    pub fn page_to_view(self, r: Rectangle, page: PageSize) -> Rectangle {
        let (w, h) = page.to_int();
        match self {
            Self::Deg0 => r,
            Self::Deg90 => Rectangle::new(h - r.bottom(), r.x, r.height, r.width),
            Self::Deg180 => Rectangle::new(w - r.right(), h - r.bottom(), r.width, r.height),
            Self::Deg270 => Rectangle::new(r.y, w - r.right(), r.height, r.width),
        }
    }

    /// Inverse of [`Rotation::page_to_view`]
    #[must_use]
    pub fn view_to_page(self, r: Rectangle, page: PageSize) -> Rectangle {
        let (w, h) = page.to_int();
        match self {
            Self::Deg0 => r,
            Self::Deg90 => Rectangle::new(r.y, h - r.right(), r.height, r.width),
            Self::Deg180 => Rectangle::new(w - r.right(), h - r.bottom(), r.width, r.height),
            Self::Deg270 => Rectangle::new(w - r.bottom(), r.x, r.height, r.width),
        }
    }
}

impl TryFrom<i32> for Rotation {
    type Error = String;

    fn try_from(degrees: i32) -> Result<Self, Self::Error> {
        Self::from_degrees(degrees)
            .ok_or_else(|| format!("rotation must be a multiple of 90, got {degrees}"))
    }
}

impl From<Rotation> for i32 {
    fn from(r: Rotation) -> Self {
        r.degrees()
    }
}

/// Natural page size in points
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size as seen after rotation
    #[must_use]
    pub fn rotated(self, rotation: Rotation) -> Self {
        if rotation.swaps_axes() {
            Self::new(self.height, self.width)
        } else {
            self
        }
    }

    fn to_int(self) -> (i32, i32) {
        (self.width.round() as i32, self.height.round() as i32)
    }
}

/// Switch a rectangle between top-left and bottom-left Y origins
#[must_use]
pub fn flip_y(r: Rectangle, height: f64) -> Rectangle {
    let h = height.round() as i32;
    Rectangle::new(r.x, h - r.bottom(), r.width, r.height)
}

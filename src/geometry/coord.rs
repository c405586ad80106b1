//! Screen <-> document coordinate conversion for one rendered frame

use super::{PageSize, Rectangle, Rotation};

/// Affine map between a placement rectangle on screen and view-space
/// document coordinates.
///
/// With `invert_y` the document origin is bottom-left (page coordinates as
/// link areas are reported), otherwise top-left (pixel-buffer order, as text
/// selection and search results use).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoordConv {
    placement: Rectangle,
    invert_y: bool,
    x_scale: f64,
    y_scale: f64,
}

impl CoordConv {
    /// Build a converter for `page` drawn into `placement`.
    ///
    /// `placement` must have a non-zero area.
    #[must_use]
    pub fn new(page: PageSize, placement: Rectangle, invert_y: bool, rotation: Rotation) -> Self {
        debug_assert!(
            placement.width != 0 && placement.height != 0,
            "zero-area placement {placement:?}"
        );
        let natural = page.rotated(rotation);

        Self {
            placement,
            invert_y,
            x_scale: natural.width / f64::from(placement.width),
            y_scale: natural.height / f64::from(placement.height),
        }
    }

    #[must_use]
    pub fn placement(&self) -> Rectangle {
        self.placement
    }

    #[must_use]
    pub fn to_document_x(&self, x: f64) -> f64 {
        (x - f64::from(self.placement.x)) * self.x_scale
    }

    #[must_use]
    pub fn to_document_y(&self, y: f64) -> f64 {
        let top = f64::from(self.placement.y);
        if self.invert_y {
            (f64::from(self.placement.height) - (y - top)) * self.y_scale
        } else {
            (y - top) * self.y_scale
        }
    }

    #[must_use]
    pub fn to_screen_x(&self, x: f64) -> f64 {
        x / self.x_scale + f64::from(self.placement.x)
    }

    #[must_use]
    pub fn to_screen_y(&self, y: f64) -> f64 {
        if self.invert_y {
            f64::from(self.placement.bottom()) - y / self.y_scale
        } else {
            y / self.y_scale + f64::from(self.placement.y)
        }
    }

    /// Convert a screen rectangle corner by corner.
    ///
    /// The size is the difference of the converted corners, so a rectangle
    /// edge lands exactly where a point test at that edge would.
    #[must_use]
    pub fn to_document_rect(&self, r: &Rectangle) -> Rectangle {
        let x0 = self.to_document_x(f64::from(r.x));
        let y0 = self.to_document_y(f64::from(r.y));
        Rectangle::new(
            x0 as i32,
            y0 as i32,
            (self.to_document_x(f64::from(r.right())) - x0) as i32,
            (self.to_document_y(f64::from(r.bottom())) - y0) as i32,
        )
    }

    /// Convert a document rectangle corner by corner
    #[must_use]
    pub fn to_screen_rect(&self, r: &Rectangle) -> Rectangle {
        let x0 = self.to_screen_x(f64::from(r.x));
        let y0 = self.to_screen_y(f64::from(r.y));
        Rectangle::new(
            x0 as i32,
            y0 as i32,
            (self.to_screen_x(f64::from(r.right())) - x0) as i32,
            (self.to_screen_y(f64::from(r.bottom())) - y0) as i32,
        )
    }
}

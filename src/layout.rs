//! Render geometry: how a page (or a magnified part of it) is scaled and
//! placed inside the viewport.
//!
//! The output is what the document engine is asked to rasterize (scale and
//! crop) and where the result lands on screen (placement).

use serde::{Deserialize, Serialize};

use crate::geometry::{CoordConv, PageSize, Rectangle, Rotation, Size};

/// Points per inch; the scale is reported as dpi relative to this
pub const POINTS_PER_INCH: f64 = 72.0;

/// Absorbs float noise before truncating a scaled length to whole pixels
const PIXEL_EPSILON: f64 = 1e-6;

/// How the page is bound to the viewport
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewMode {
    /// Whole page visible, letterboxed along one axis
    #[default]
    FitPage,
    /// Page width bound to the viewport, multiplied by the zoom factor
    FitWidth,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViewMode::FitPage => "fit page",
            ViewMode::FitWidth => "fit width",
        }
    }
}

/// Everything about the view that affects geometry, minus the page itself
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutInput {
    pub mode: ViewMode,
    pub zoom: f64,
    pub rotation: Rotation,
    pub viewport: Size,
    /// Sub-rectangle of the page in view space to show instead of the page
    pub magnify: Option<Rectangle>,
    /// Previous vertical placement origin
    pub scroll_offset: i32,
    /// Arriving from the page below: show the bottom edge
    pub scrolling_up: bool,
}

/// Scale, placement and crop for one frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderGeometry {
    /// Device pixels per document point
    pub scale: f64,
    /// Where the rendered pixels go, in screen space
    pub placement: Rectangle,
    /// Region to rasterize, in document space already scaled to pixels
    pub crop: Rectangle,
}

impl RenderGeometry {
    /// Compute the geometry of `page` (unrotated natural size) for `input`.
    ///
    /// The viewport must be non-empty; callers do not lay out before the
    /// first resize.
    #[must_use]
    pub fn compute(page: PageSize, input: &LayoutInput) -> Self {
        debug_assert!(!input.viewport.is_empty(), "layout before first resize");

        let natural = page.rotated(input.rotation);
        let (x0, y0, width, height) = match input.magnify {
            Some(m) => (
                f64::from(m.x),
                f64::from(m.y),
                f64::from(m.width),
                f64::from(m.height),
            ),
            None => (0.0, 0.0, natural.width, natural.height),
        };

        let view = input.viewport;
        let vw = f64::from(view.width);
        let vh = f64::from(view.height);

        let (scale, placement) = match input.mode {
            ViewMode::FitPage => {
                if vw / vh > width / height {
                    let scale = vh / height;
                    let w = to_pixels(width, scale);
                    (scale, Rectangle::new((view.width - w) / 2, 0, w, view.height))
                } else {
                    let scale = vw / width;
                    let h = to_pixels(height, scale);
                    (scale, Rectangle::new(0, (view.height - h) / 2, view.width, h))
                }
            }
            ViewMode::FitWidth => {
                let scale = vw / width * input.zoom;
                let w = to_pixels(width, scale);
                let h = to_pixels(height, scale);
                let x = place_on_axis(view.width, w, 0, false);
                let y = place_on_axis(view.height, h, input.scroll_offset, input.scrolling_up);
                (scale, Rectangle::new(x, y, w, h))
            }
        };

        let crop = Rectangle::new(
            to_pixels(x0, scale),
            to_pixels(y0, scale),
            to_pixels(width, scale),
            to_pixels(height, scale),
        );

        Self {
            scale,
            placement,
            crop,
        }
    }

    /// Scale expressed as dots per inch
    #[must_use]
    pub fn dpi(&self) -> f64 {
        self.scale * POINTS_PER_INCH
    }
}

/// Origin of a `size`-long span inside a `view`-long axis.
///
/// Short spans are centred. Long spans keep `origin` but never scroll past
/// either edge, or pin their far edge when `pin_end` is set.
#[must_use]
pub fn place_on_axis(view: i32, size: i32, origin: i32, pin_end: bool) -> i32 {
    if size <= view {
        (view - size) / 2
    } else if pin_end {
        view - size
    } else {
        origin.max(view - size).min(0)
    }
}

fn to_pixels(length: f64, scale: f64) -> i32 {
    (length * scale + PIXEL_EPSILON).floor() as i32
}

/// One page's share of a frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageSlot {
    /// 1-based page number
    pub page: usize,
    /// Unrotated natural size
    pub natural: PageSize,
    pub placement: Rectangle,
    pub crop: Rectangle,
}

impl PageSlot {
    /// Converter between this slot's screen area and its view-space page
    #[must_use]
    pub fn converter(&self, invert_y: bool, rotation: Rotation) -> CoordConv {
        CoordConv::new(self.natural, self.placement, invert_y, rotation)
    }
}

/// Committed geometry of everything on screen
#[derive(Clone, Debug, PartialEq)]
pub struct Frame {
    pub geometry: RenderGeometry,
    pub slots: Vec<PageSlot>,
}

impl Frame {
    /// Frame showing a single page
    #[must_use]
    pub fn single(page: usize, natural: PageSize, input: &LayoutInput) -> Self {
        let geometry = RenderGeometry::compute(natural, input);
        Self {
            geometry,
            slots: vec![PageSlot {
                page,
                natural,
                placement: geometry.placement,
                crop: geometry.crop,
            }],
        }
    }

    /// Frame showing two pages side by side, top-aligned.
    ///
    /// Magnification does not apply to spreads.
    #[must_use]
    pub fn spread(left: (usize, PageSize), right: (usize, PageSize), input: &LayoutInput) -> Self {
        let l = left.1.rotated(input.rotation);
        let r = right.1.rotated(input.rotation);
        let spread = PageSize::new(l.width + r.width, l.height.max(r.height));

        let flat = LayoutInput {
            rotation: Rotation::Deg0,
            magnify: None,
            ..*input
        };
        let geometry = RenderGeometry::compute(spread, &flat);
        let s = geometry.scale;
        let origin = geometry.placement;

        let left_w = to_pixels(l.width, s);
        let slot = |page: usize, natural: PageSize, rotated: PageSize, x: i32| {
            let w = to_pixels(rotated.width, s);
            let h = to_pixels(rotated.height, s);
            PageSlot {
                page,
                natural,
                placement: Rectangle::new(x, origin.y, w, h),
                crop: Rectangle::new(0, 0, w, h),
            }
        };

        Self {
            geometry,
            slots: vec![
                slot(left.0, left.1, l, origin.x),
                slot(right.0, right.1, r, origin.x + left_w),
            ],
        }
    }

    #[must_use]
    pub fn placement(&self) -> Rectangle {
        self.geometry.placement
    }

    /// Slot under a screen point, edges inclusive
    #[must_use]
    pub fn slot_at(&self, x: i32, y: i32) -> Option<&PageSlot> {
        self.slots.iter().find(|s| s.placement.contains(x, y))
    }

    /// Slot showing `page`, if it is on screen
    #[must_use]
    pub fn slot_for(&self, page: usize) -> Option<&PageSlot> {
        self.slots.iter().find(|s| s.page == page)
    }

    /// Same frame moved vertically; the rendered pixels stay valid
    #[must_use]
    pub fn scrolled_to(&self, offset: i32) -> Self {
        let dy = offset - self.geometry.placement.y;
        let mut moved = self.clone();
        moved.geometry.placement = moved.geometry.placement.translate(0, dy);
        for slot in &mut moved.slots {
            slot.placement = slot.placement.translate(0, dy);
        }
        moved
    }
}

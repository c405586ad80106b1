//! Minimal redraw regions
//!
//! All functions here work in screen space. Regions are kept as separate
//! rectangles; merging them into a bounding box would repaint pixels that
//! did not change.

use crate::geometry::{Rectangle, Size};

/// Screen areas to clear and to paint after a rectangle changed
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Damage {
    /// Covered before, uncovered now
    pub erase: Vec<Rectangle>,
    /// Covered now, not before
    pub draw: Vec<Rectangle>,
}

impl Damage {
    /// Every damaged rectangle, erase strips first
    #[must_use]
    pub fn regions(self) -> Vec<Rectangle> {
        let mut all = self.erase;
        all.extend(self.draw);
        all
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.erase.is_empty() && self.draw.is_empty()
    }
}

/// Damage caused by `old` turning into `new`
#[must_use]
pub fn diff(old: &Rectangle, new: &Rectangle) -> Damage {
    Damage {
        erase: non_empty(old.subtract(new)),
        draw: non_empty(new.subtract(old)),
    }
}

/// Damage after the page moved from `old` to `new` without re-rendering.
///
/// The strips the page no longer covers are erased; the visible part of the
/// page is painted again because its content shifted.
#[must_use]
pub fn scrolled(old: &Rectangle, new: &Rectangle, viewport: Size) -> Vec<Rectangle> {
    let screen = viewport.to_rect();
    let mut regions: Vec<Rectangle> = old
        .subtract(new)
        .into_iter()
        .map(|r| r.intersect(&screen))
        .collect();
    regions.push(new.intersect(&screen));
    non_empty(regions)
}

fn non_empty(rects: Vec<Rectangle>) -> Vec<Rectangle> {
    rects.into_iter().filter(|r| !r.is_empty()).collect()
}

/// Accumulates damage between two repaints
#[derive(Clone, Debug, Default)]
pub struct DamageTracker {
    full: bool,
    regions: Vec<Rectangle>,
}

impl DamageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark(&mut self, rect: Rectangle) {
        if !self.full && !rect.is_empty() {
            self.regions.push(rect);
        }
    }

    pub fn mark_all<I: IntoIterator<Item = Rectangle>>(&mut self, rects: I) {
        for rect in rects {
            self.mark(rect);
        }
    }

    /// Everything must be repainted; individual regions stop mattering
    pub fn mark_full(&mut self) {
        self.full = true;
        self.regions.clear();
    }

    pub fn is_full(&self) -> bool {
        self.full
    }

    pub fn is_clean(&self) -> bool {
        !self.full && self.regions.is_empty()
    }

    /// Drain the pending damage, clipped to the viewport
    pub fn take_regions(&mut self, viewport: Size) -> Vec<Rectangle> {
        let screen = viewport.to_rect();
        let regions = if self.full {
            vec![screen]
        } else {
            self.regions.iter().map(|r| r.intersect(&screen)).collect()
        };
        self.full = false;
        self.regions.clear();
        non_empty(regions)
    }
}

/// Copy of bitmap pixels to the screen
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Blit {
    /// Source area in bitmap coordinates
    pub src: Rectangle,
    pub dst_x: i32,
    pub dst_y: i32,
}

/// How to repaint one exposed rectangle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExposePlan {
    /// Background outside the page
    pub clear: Vec<Rectangle>,
    /// Page pixels to copy from the cached bitmap
    pub blits: Vec<Blit>,
}

/// Plan the repaint of `expose` for a bitmap placed at `placement`.
///
/// Rows under `status` are left alone; the status bar paints itself.
#[must_use]
pub fn plan_expose(
    expose: &Rectangle,
    placement: &Rectangle,
    status: Option<&Rectangle>,
) -> ExposePlan {
    let without_status = |r: Rectangle| match status {
        Some(s) if !s.is_empty() => r.subtract(s),
        _ => vec![r],
    };

    let clear = non_empty(
        expose
            .subtract(placement)
            .into_iter()
            .flat_map(without_status)
            .collect(),
    );

    let visible = expose.intersect(placement);
    let blits = if visible.is_empty() {
        vec![]
    } else {
        non_empty(without_status(visible))
            .into_iter()
            .map(|part| Blit {
                src: part.translate(-placement.x, -placement.y),
                dst_x: part.x,
                dst_y: part.y,
            })
            .collect()
    };

    ExposePlan { clear, blits }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn growing_selection_draws_only_new_strips() {
        let old = Rectangle::new(10, 10, 20, 20);
        let new = Rectangle::new(10, 10, 30, 25);
        let d = diff(&old, &new);

        assert!(d.erase.is_empty());
        assert_eq!(
            d.draw,
            vec![Rectangle::new(10, 30, 30, 5), Rectangle::new(30, 10, 10, 20)]
        );
    }

    #[test]
    fn diff_from_zero_size_start() {
        let old = Rectangle::new(10, 10, 0, 0);
        let new = Rectangle::new(10, 10, 5, 5);
        let d = diff(&old, &new);
        assert!(d.erase.is_empty());
        assert_eq!(d.draw, vec![new]);
    }

    #[test]
    fn disjoint_rectangles_swap_entirely() {
        let old = Rectangle::new(0, 0, 5, 5);
        let new = Rectangle::new(10, 10, 5, 5);
        let d = diff(&old, &new);
        assert_eq!(d.erase, vec![old]);
        assert_eq!(d.draw, vec![new]);
        assert_eq!(d.regions().len(), 2);
    }

    #[test]
    fn scroll_damage_is_clipped_to_viewport() {
        let view = Size::new(800, 600);
        let old = Rectangle::new(0, 0, 800, 1066);
        let new = Rectangle::new(0, -319, 800, 1066);
        assert_eq!(
            scrolled(&old, &new, view),
            vec![Rectangle::new(0, 0, 800, 600)]
        );

        // A short page moving down uncovers a strip above it.
        let old = Rectangle::new(100, 100, 400, 300);
        let new = Rectangle::new(100, 150, 400, 300);
        assert_eq!(
            scrolled(&old, &new, view),
            vec![Rectangle::new(100, 100, 400, 50), new]
        );
    }

    #[test]
    fn full_damage_overrides_regions() {
        let mut tracker = DamageTracker::new();
        tracker.mark(Rectangle::new(1, 1, 2, 2));
        tracker.mark_full();
        tracker.mark(Rectangle::new(5, 5, 2, 2));

        assert!(tracker.is_full());
        assert_eq!(
            tracker.take_regions(Size::new(80, 40)),
            vec![Rectangle::new(0, 0, 80, 40)]
        );
        assert!(tracker.is_clean());
    }

    #[test]
    fn tracker_skips_empty_and_clips() {
        let mut tracker = DamageTracker::new();
        tracker.mark(Rectangle::new(1, 1, 0, 4));
        tracker.mark_all([Rectangle::new(70, 30, 20, 20), Rectangle::new(200, 0, 5, 5)]);
        assert_eq!(
            tracker.take_regions(Size::new(80, 40)),
            vec![Rectangle::new(70, 30, 10, 10)]
        );
        assert!(tracker.take_regions(Size::new(80, 40)).is_empty());
    }

    #[test]
    fn expose_skips_status_rows() {
        let placement = Rectangle::new(175, 0, 450, 600);
        let status = Rectangle::new(0, 598, 800, 2);
        let plan = plan_expose(&Rectangle::new(0, 0, 800, 600), &placement, Some(&status));

        assert_eq!(
            plan.blits,
            vec![Blit {
                src: Rectangle::new(0, 0, 450, 598),
                dst_x: 175,
                dst_y: 0,
            }]
        );
        assert_eq!(
            plan.clear,
            vec![Rectangle::new(0, 0, 175, 598), Rectangle::new(625, 0, 175, 598)]
        );
    }

    #[test]
    fn expose_maps_scrolled_page_into_bitmap() {
        let placement = Rectangle::new(0, -319, 800, 1066);
        let plan = plan_expose(&Rectangle::new(10, 20, 30, 40), &placement, None);
        assert!(plan.clear.is_empty());
        assert_eq!(
            plan.blits,
            vec![Blit {
                src: Rectangle::new(10, 339, 30, 40),
                dst_x: 10,
                dst_y: 20,
            }]
        );
    }
}

use breathe::damage;
use breathe::geometry::{CoordConv, PageSize, Rectangle, Rotation, Size};
use breathe::layout::{LayoutInput, RenderGeometry, ViewMode, place_on_axis};
use proptest::prelude::*;

fn any_rect() -> impl Strategy<Value = Rectangle> {
    (-200i32..200, -200i32..200, 1i32..300, 1i32..300)
        .prop_map(|(x, y, w, h)| Rectangle::new(x, y, w, h))
}

fn any_rotation() -> impl Strategy<Value = Rotation> {
    prop_oneof![
        Just(Rotation::Deg0),
        Just(Rotation::Deg90),
        Just(Rotation::Deg180),
        Just(Rotation::Deg270),
    ]
}

fn overlap_area(a: &Rectangle, b: &Rectangle) -> i64 {
    a.intersect(b).area()
}

proptest! {
    #[test]
    fn subtract_covers_exactly_the_difference(a in any_rect(), b in any_rect()) {
        let strips = a.subtract(&b);
        let total: i64 = strips.iter().map(Rectangle::area).sum();
        prop_assert_eq!(total, a.area() - overlap_area(&a, &b));

        for strip in &strips {
            prop_assert_eq!(overlap_area(strip, &b), 0);
            prop_assert_eq!(strip.intersect(&a), *strip);
        }
        for (i, s) in strips.iter().enumerate() {
            for t in &strips[i + 1..] {
                prop_assert_eq!(overlap_area(s, t), 0);
            }
        }
    }

    #[test]
    fn diff_erases_old_and_draws_new(old in any_rect(), new in any_rect()) {
        let d = damage::diff(&old, &new);
        let erased: i64 = d.erase.iter().map(Rectangle::area).sum();
        let drawn: i64 = d.draw.iter().map(Rectangle::area).sum();
        prop_assert_eq!(erased, old.area() - overlap_area(&old, &new));
        prop_assert_eq!(drawn, new.area() - overlap_area(&old, &new));
        prop_assert_eq!(d.is_empty(), old == new);
    }

    #[test]
    fn normalize_keeps_corners(x in -100i32..100, y in -100i32..100, w in -100i32..100, h in -100i32..100) {
        let n = Rectangle::new(x, y, w, h).normalize();
        prop_assert!(n.width >= 0 && n.height >= 0);
        prop_assert_eq!(n.normalize(), n);
        prop_assert_eq!((n.x, n.y), (x.min(x + w), y.min(y + h)));
        prop_assert_eq!((n.right(), n.bottom()), (x.max(x + w), y.max(y + h)));
    }

    #[test]
    fn rotation_round_trips(r in any_rect(), rotation in any_rotation()) {
        let page = PageSize::new(612.0, 792.0);
        let view = rotation.page_to_view(r, page);
        prop_assert_eq!(rotation.view_to_page(view, page), r);
        prop_assert_eq!(view.area(), r.area());
    }

    #[test]
    fn coordinates_round_trip(
        x in -500.0f64..1500.0,
        y in -500.0f64..1500.0,
        placement in any_rect(),
        invert_y in any::<bool>(),
        rotation in any_rotation(),
    ) {
        let conv = CoordConv::new(PageSize::new(595.0, 842.0), placement, invert_y, rotation);
        prop_assert!((conv.to_screen_x(conv.to_document_x(x)) - x).abs() < 1e-6);
        prop_assert!((conv.to_screen_y(conv.to_document_y(y)) - y).abs() < 1e-6);
    }

    #[test]
    fn fit_page_stays_inside_viewport(
        pw in 1.0f64..2000.0,
        ph in 1.0f64..2000.0,
        vw in 1i32..2000,
        vh in 1i32..2000,
        rotation in any_rotation(),
    ) {
        let input = LayoutInput {
            mode: ViewMode::FitPage,
            zoom: 1.0,
            rotation,
            viewport: Size::new(vw, vh),
            magnify: None,
            scroll_offset: 0,
            scrolling_up: false,
        };
        let p = RenderGeometry::compute(PageSize::new(pw, ph), &input).placement;
        prop_assert!(p.x >= 0 && p.y >= 0);
        prop_assert!(p.right() <= vw && p.bottom() <= vh);
        // One axis is bound to the viewport.
        prop_assert!(p.width == vw || p.height == vh);
    }

    #[test]
    fn fit_width_at_unit_zoom_spans_viewport(
        pw in 1.0f64..2000.0,
        ph in 1.0f64..2000.0,
        vw in 1i32..2000,
        vh in 1i32..2000,
        offset in -5000i32..100,
    ) {
        let input = LayoutInput {
            mode: ViewMode::FitWidth,
            zoom: 1.0,
            rotation: Rotation::Deg0,
            viewport: Size::new(vw, vh),
            magnify: None,
            scroll_offset: offset,
            scrolling_up: false,
        };
        let p = RenderGeometry::compute(PageSize::new(pw, ph), &input).placement;
        prop_assert_eq!((p.x, p.width), (0, vw));
        if p.height >= vh {
            prop_assert!(p.y <= 0 && p.bottom() >= vh);
        }
    }

    #[test]
    fn long_spans_cover_the_view(view in 1i32..1000, extra in 0i32..1000, origin in -3000i32..3000, pin in any::<bool>()) {
        let size = view + extra;
        let o = place_on_axis(view, size, origin, pin);
        prop_assert!(o <= 0 && o + size >= view);
    }
}

//! View state, commands and effects

use log::debug;

use super::{History, HistoryEntry};
use crate::geometry::{Rectangle, Rotation, Size};
use crate::layout::{LayoutInput, ViewMode};

/// Active magnification of a page sub-region
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Magnify {
    /// Region of the page in view space (rotated page points, top-left origin)
    pub rect: Rectangle,
    /// Scroll offset to return to when magnification ends
    pub saved_offset: i32,
}

/// Everything that decides what is on screen
#[derive(Clone, Debug, PartialEq)]
pub struct ViewState {
    /// Current page (1-based)
    pub page: usize,
    pub page_count: usize,
    pub viewport: Size,
    pub mode: ViewMode,
    pub zoom: f64,
    pub rotation: Rotation,
    /// Vertical placement origin; zero or negative for pages taller than
    /// the viewport
    pub scroll_offset: i32,
    /// The page was entered from the one below: show its bottom
    pub scrolling_up: bool,
    pub magnify: Option<Magnify>,
    pub two_page: bool,
    pub continuous: bool,
    pub dark_mode: bool,
    pub status_bar: bool,
    pub history: History,
}

impl ViewState {
    /// Fresh state on page 1
    #[must_use]
    pub fn new(page_count: usize, viewport: Size) -> Self {
        debug_assert!(page_count > 0, "document without pages");
        Self {
            page: 1,
            page_count,
            viewport,
            mode: ViewMode::default(),
            zoom: 1.0,
            rotation: Rotation::Deg0,
            scroll_offset: 0,
            scrolling_up: false,
            magnify: None,
            two_page: false,
            continuous: false,
            dark_mode: false,
            status_bar: true,
            history: History::new(),
        }
    }

    /// Input for the geometry calculator
    #[must_use]
    pub fn layout_input(&self) -> LayoutInput {
        LayoutInput {
            mode: self.mode,
            zoom: self.zoom,
            rotation: self.rotation,
            viewport: self.viewport,
            magnify: self.magnify.map(|m| m.rect),
            scroll_offset: self.scroll_offset,
            scrolling_up: self.scrolling_up,
        }
    }

    /// Page shown to the right of the current one, if any
    #[must_use]
    pub fn facing_page(&self) -> Option<usize> {
        (self.two_page && self.magnify.is_none() && self.page < self.page_count)
            .then_some(self.page + 1)
    }

    /// Screen rows covered by the status bar
    #[must_use]
    pub fn status_rect(&self, height: i32) -> Rectangle {
        let h = height.min(self.viewport.height).max(0);
        Rectangle::new(0, self.viewport.height - h, self.viewport.width, h)
    }

    fn page_step(&self) -> usize {
        if self.two_page { 2 } else { 1 }
    }

    fn location(&self) -> HistoryEntry {
        HistoryEntry::new(self.page, self.scroll_offset)
    }

    fn on_page(&self, page: usize, scrolling_up: bool) -> Self {
        Self {
            page,
            scroll_offset: 0,
            scrolling_up,
            ..self.clone()
        }
    }
}

/// Zoom bounds and step, read from configuration
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    /// Multiplier per ZoomIn, divisor per ZoomOut
    pub step: f64,
    pub min: f64,
    pub max: f64,
}

impl ZoomLimits {
    pub const DEFAULT_STEP: f64 = 1.1;
    pub const DEFAULT_MIN: f64 = 0.1;
    pub const DEFAULT_MAX: f64 = 5.0;

    pub fn clamp(&self, zoom: f64) -> f64 {
        zoom.clamp(self.min, self.max)
    }
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self {
            step: Self::DEFAULT_STEP,
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// What a transition may consult besides the state itself
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Context {
    /// Placement of the committed frame
    pub placement: Rectangle,
    pub zoom: ZoomLimits,
    /// Rows reserved for the status bar
    pub status_bar_height: i32,
}

/// User intents understood by the view
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    /// Jump to a 1-based page; out of range is rejected
    GotoPage(usize),
    /// Return to the last location recorded by a jump
    Back,
    /// Jump to a link target page
    FollowLink(usize),
    /// Scroll by a fraction of the page height, positive toward the end of
    /// the document
    ScrollBy { fraction: f64, turn_pages: bool },
    SetZoom(f64),
    ZoomIn,
    ZoomOut,
    SetMode(ViewMode),
    RotateCw,
    RotateCcw,
    ToggleTwoPage,
    ToggleContinuous,
    ToggleStatusBar,
    ToggleDarkMode,
    /// Show only this region of the page (view space)
    EnterMagnify(Rectangle),
    ExitMagnify,
    Resize(Size),
    /// The document was reopened with this many pages
    Reload { page_count: usize },
}

/// Side effects of a committed transition
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Effect {
    /// Cached pixels no longer match the state; render a new frame
    InvalidateBitmap,
    /// Same pixels, moved vertically from one placement origin to another
    Scrolled { from: i32, to: i32 },
    /// Only these screen rectangles changed
    Redraw(Vec<Rectangle>),
}

/// Candidate next state with the effects committing it would have
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: ViewState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn invalidating(state: ViewState) -> Self {
        Self {
            state,
            effects: vec![Effect::InvalidateBitmap],
        }
    }

    /// True if committing requires a fresh render
    #[must_use]
    pub fn invalidates_bitmap(&self) -> bool {
        self.effects.contains(&Effect::InvalidateBitmap)
    }
}

/// Vertical placement change for scrolling `fraction` of the page height.
///
/// Positive fractions move toward the end of the page. The page never
/// scrolls past its top or bottom edge; zero means there is nowhere to go.
#[must_use]
pub fn scroll_delta(placement: Rectangle, view_height: i32, fraction: f64) -> i32 {
    if placement.height < view_height {
        return 0;
    }
    let step = (f64::from(placement.height) * fraction) as i32;
    if step < 0 {
        (-step).min(-placement.y)
    } else {
        -(step.min(placement.bottom() - view_height))
    }
}

/// Compute the state `cmd` would lead to; `None` means the command is
/// ignored and nothing changes.
#[must_use]
pub fn transition(state: &ViewState, cmd: &Command, ctx: &Context) -> Option<Transition> {
    match cmd {
        Command::NextPage => {
            let target = (state.page + state.page_step()).min(state.page_count);
            (target != state.page).then(|| Transition::invalidating(state.on_page(target, false)))
        }

        Command::PrevPage => {
            let target = state.page.saturating_sub(state.page_step()).max(1);
            (target != state.page).then(|| Transition::invalidating(state.on_page(target, false)))
        }

        Command::FirstPage => {
            (state.page != 1).then(|| Transition::invalidating(state.on_page(1, false)))
        }

        Command::LastPage => {
            let last = state.page_count;
            (state.page != last).then(|| Transition::invalidating(state.on_page(last, false)))
        }

        Command::GotoPage(page) | Command::FollowLink(page) => {
            let page = *page;
            if page < 1 || page > state.page_count || page == state.page {
                return None;
            }
            let mut next = state.on_page(page, false);
            next.history.push(state.location());
            Some(Transition::invalidating(next))
        }

        Command::Back => {
            let mut next = state.clone();
            let entry = next.history.pop()?;
            next.page = entry.page.clamp(1, state.page_count);
            next.scroll_offset = entry.scroll_offset;
            next.scrolling_up = false;
            Some(Transition::invalidating(next))
        }

        Command::ScrollBy {
            fraction,
            turn_pages,
        } => scroll(state, *fraction, *turn_pages, ctx),

        Command::SetZoom(zoom) => set_zoom(state, *zoom, ctx),
        Command::ZoomIn => set_zoom(state, state.zoom * ctx.zoom.step, ctx),
        Command::ZoomOut => set_zoom(state, state.zoom / ctx.zoom.step, ctx),

        Command::SetMode(mode) => {
            if state.mode == *mode {
                return None;
            }
            Some(Transition::invalidating(ViewState {
                mode: *mode,
                scroll_offset: 0,
                scrolling_up: false,
                ..state.clone()
            }))
        }

        Command::RotateCw => Some(rotate(state, state.rotation.clockwise())),
        Command::RotateCcw => Some(rotate(state, state.rotation.counter_clockwise())),

        Command::ToggleTwoPage => Some(Transition::invalidating(ViewState {
            two_page: !state.two_page,
            ..state.clone()
        })),

        Command::ToggleContinuous => Some(Transition {
            state: ViewState {
                continuous: !state.continuous,
                ..state.clone()
            },
            effects: vec![],
        }),

        Command::ToggleStatusBar => Some(Transition {
            state: ViewState {
                status_bar: !state.status_bar,
                ..state.clone()
            },
            effects: vec![Effect::Redraw(vec![
                state.status_rect(ctx.status_bar_height),
            ])],
        }),

        Command::ToggleDarkMode => Some(Transition::invalidating(ViewState {
            dark_mode: !state.dark_mode,
            ..state.clone()
        })),

        Command::EnterMagnify(rect) => {
            if rect.is_empty() || state.two_page {
                return None;
            }
            let saved_offset = state
                .magnify
                .map_or(state.scroll_offset, |m| m.saved_offset);
            Some(Transition::invalidating(ViewState {
                magnify: Some(Magnify {
                    rect: *rect,
                    saved_offset,
                }),
                scroll_offset: 0,
                scrolling_up: false,
                ..state.clone()
            }))
        }

        Command::ExitMagnify => {
            let magnify = state.magnify?;
            Some(Transition::invalidating(ViewState {
                magnify: None,
                scroll_offset: magnify.saved_offset,
                scrolling_up: false,
                ..state.clone()
            }))
        }

        Command::Resize(size) => {
            if *size == state.viewport || size.is_empty() {
                return None;
            }
            Some(Transition::invalidating(ViewState {
                viewport: *size,
                ..state.clone()
            }))
        }

        Command::Reload { page_count } => {
            if *page_count == 0 {
                return None;
            }
            let mut next = ViewState {
                page_count: *page_count,
                ..state.clone()
            };
            if next.page > *page_count {
                next = next.on_page(1, false);
            }
            Some(Transition::invalidating(next))
        }
    }
}

fn scroll(state: &ViewState, fraction: f64, turn_pages: bool, ctx: &Context) -> Option<Transition> {
    if fraction == 0.0 {
        return None;
    }

    let delta = scroll_delta(ctx.placement, state.viewport.height, fraction);
    if delta != 0 {
        let from = ctx.placement.y;
        let to = from + delta;
        return Some(Transition {
            state: ViewState {
                scroll_offset: to,
                scrolling_up: false,
                ..state.clone()
            },
            effects: vec![Effect::Scrolled { from, to }],
        });
    }

    if !turn_pages || state.magnify.is_some() {
        return None;
    }

    let step = state.page_step();
    if fraction > 0.0 {
        let target = (state.page + step).min(state.page_count);
        (target != state.page).then(|| Transition::invalidating(state.on_page(target, false)))
    } else {
        let target = state.page.saturating_sub(step).max(1);
        (target != state.page).then(|| Transition::invalidating(state.on_page(target, true)))
    }
}

fn set_zoom(state: &ViewState, zoom: f64, ctx: &Context) -> Option<Transition> {
    let zoom = ctx.zoom.clamp(zoom);
    if state.mode == ViewMode::FitWidth && (state.zoom - zoom).abs() < f64::EPSILON {
        return None;
    }
    Some(Transition::invalidating(ViewState {
        zoom,
        mode: ViewMode::FitWidth,
        ..state.clone()
    }))
}

fn rotate(state: &ViewState, rotation: Rotation) -> Transition {
    // A magnified region is in the old rotation's view space.
    Transition::invalidating(ViewState {
        rotation,
        magnify: None,
        scroll_offset: 0,
        scrolling_up: false,
        ..state.clone()
    })
}

/// Owner of the committed view state
#[derive(Clone, Debug)]
pub struct Navigator {
    state: ViewState,
}

impl Navigator {
    pub fn new(state: ViewState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Candidate transition for `cmd`, leaving the committed state alone
    #[must_use]
    pub fn preview(&self, cmd: &Command, ctx: &Context) -> Option<Transition> {
        transition(&self.state, cmd, ctx)
    }

    /// Adopt a previewed transition and hand back its effects
    pub fn commit(&mut self, transition: Transition) -> Vec<Effect> {
        debug!(
            "view: page {}/{} mode {:?} zoom {:.2} rotation {} offset {}",
            transition.state.page,
            transition.state.page_count,
            transition.state.mode,
            transition.state.zoom,
            transition.state.rotation.degrees(),
            transition.state.scroll_offset
        );
        self.state = transition.state;
        transition.effects
    }

    /// Preview and commit in one step
    pub fn apply(&mut self, cmd: &Command, ctx: &Context) -> Vec<Effect> {
        match self.preview(cmd, ctx) {
            Some(t) => self.commit(t),
            None => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEW: Size = Size::new(800, 600);

    fn state() -> ViewState {
        ViewState::new(10, VIEW)
    }

    fn ctx(placement: Rectangle) -> Context {
        Context {
            placement,
            zoom: ZoomLimits::default(),
            status_bar_height: 2,
        }
    }

    fn fit_page_ctx() -> Context {
        ctx(Rectangle::new(175, 0, 450, 600))
    }

    fn tall_ctx(y: i32) -> Context {
        ctx(Rectangle::new(0, y, 800, 1066))
    }

    #[test]
    fn next_page_invalidates_bitmap() {
        let t = transition(&state(), &Command::NextPage, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 2);
        assert_eq!(t.effects, vec![Effect::InvalidateBitmap]);
    }

    #[test]
    fn page_moves_stop_at_the_ends() {
        let s = state();
        assert!(transition(&s, &Command::PrevPage, &fit_page_ctx()).is_none());
        assert!(transition(&s, &Command::FirstPage, &fit_page_ctx()).is_none());

        let last = transition(&s, &Command::LastPage, &fit_page_ctx()).unwrap().state;
        assert_eq!(last.page, 10);
        assert!(transition(&last, &Command::NextPage, &fit_page_ctx()).is_none());
    }

    #[test]
    fn two_page_mode_steps_by_two() {
        let mut s = state();
        s.two_page = true;
        let t = transition(&s, &Command::NextPage, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 3);
        assert_eq!(t.state.facing_page(), Some(4));

        s.page = 9;
        let t = transition(&s, &Command::NextPage, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 10);
        assert_eq!(t.state.facing_page(), None);
    }

    #[test]
    fn goto_out_of_range_is_rejected() {
        let s = state();
        assert!(transition(&s, &Command::GotoPage(0), &fit_page_ctx()).is_none());
        assert!(transition(&s, &Command::GotoPage(11), &fit_page_ctx()).is_none());
        assert!(transition(&s, &Command::GotoPage(1), &fit_page_ctx()).is_none());
    }

    #[test]
    fn goto_then_back_restores_page_and_offset() {
        let mut nav = Navigator::new(ViewState {
            page: 3,
            mode: ViewMode::FitWidth,
            scroll_offset: -200,
            ..state()
        });

        let effects = nav.apply(&Command::GotoPage(7), &tall_ctx(-200));
        assert_eq!(effects, vec![Effect::InvalidateBitmap]);
        assert_eq!(nav.state().page, 7);
        assert_eq!(nav.state().scroll_offset, 0);

        nav.apply(&Command::Back, &tall_ctx(0));
        assert_eq!(nav.state().page, 3);
        assert_eq!(nav.state().scroll_offset, -200);
        assert!(nav.state().history.is_empty());
    }

    #[test]
    fn back_with_empty_history_is_ignored() {
        assert!(transition(&state(), &Command::Back, &fit_page_ctx()).is_none());
    }

    #[test]
    fn follow_link_to_current_page_records_nothing() {
        let s = state();
        assert!(transition(&s, &Command::FollowLink(1), &fit_page_ctx()).is_none());

        let t = transition(&s, &Command::FollowLink(4), &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 4);
        assert_eq!(t.state.history.peek(), Some(&HistoryEntry::new(1, 0)));
    }

    #[test]
    fn scroll_within_page_only_translates() {
        let s = ViewState {
            mode: ViewMode::FitWidth,
            ..state()
        };
        let t = transition(
            &s,
            &Command::ScrollBy {
                fraction: 0.3,
                turn_pages: true,
            },
            &tall_ctx(0),
        )
        .unwrap();

        assert_eq!(t.state.scroll_offset, -319);
        assert_eq!(t.effects, vec![Effect::Scrolled { from: 0, to: -319 }]);
        assert!(!t.invalidates_bitmap());
    }

    #[test]
    fn scroll_clamps_at_bottom_edge() {
        assert_eq!(scroll_delta(Rectangle::new(0, -400, 800, 1066), 600, 0.3), -66);
        assert_eq!(scroll_delta(Rectangle::new(0, -100, 800, 1066), 600, -0.3), 100);
        assert_eq!(scroll_delta(Rectangle::new(175, 0, 450, 600), 600, 0.3), 0);
        assert_eq!(scroll_delta(Rectangle::new(200, 33, 400, 533), 600, 0.3), 0);
    }

    #[test]
    fn scroll_at_bottom_turns_to_next_page() {
        let s = ViewState {
            mode: ViewMode::FitWidth,
            scroll_offset: -466,
            ..state()
        };
        let cmd = Command::ScrollBy {
            fraction: 0.3,
            turn_pages: true,
        };
        let t = transition(&s, &cmd, &tall_ctx(-466)).unwrap();
        assert_eq!(t.state.page, 2);
        assert_eq!(t.state.scroll_offset, 0);
        assert!(!t.state.scrolling_up);
        assert!(t.invalidates_bitmap());

        let no_turn = Command::ScrollBy {
            fraction: 0.3,
            turn_pages: false,
        };
        assert!(transition(&s, &no_turn, &tall_ctx(-466)).is_none());
    }

    #[test]
    fn scroll_at_top_turns_back_showing_bottom() {
        let s = ViewState {
            page: 4,
            mode: ViewMode::FitWidth,
            ..state()
        };
        let cmd = Command::ScrollBy {
            fraction: -0.3,
            turn_pages: true,
        };
        let t = transition(&s, &cmd, &tall_ctx(0)).unwrap();
        assert_eq!(t.state.page, 3);
        assert!(t.state.scrolling_up);

        let first = ViewState { page: 1, ..s };
        assert!(transition(&first, &cmd, &tall_ctx(0)).is_none());
    }

    #[test]
    fn magnified_view_does_not_turn_pages() {
        let s = ViewState {
            magnify: Some(Magnify {
                rect: Rectangle::new(0, 0, 100, 75),
                saved_offset: 0,
            }),
            ..state()
        };
        let cmd = Command::ScrollBy {
            fraction: 0.3,
            turn_pages: true,
        };
        assert!(transition(&s, &cmd, &ctx(Rectangle::new(0, 0, 800, 600))).is_none());
    }

    #[test]
    fn zoom_in_then_out_restores_zoom() {
        let mut nav = Navigator::new(ViewState {
            mode: ViewMode::FitWidth,
            ..state()
        });
        let c = fit_page_ctx();
        nav.apply(&Command::ZoomIn, &c);
        assert!((nav.state().zoom - 1.1).abs() < 1e-9);
        nav.apply(&Command::ZoomOut, &c);
        assert!((nav.state().zoom - 1.0).abs() < 1e-9);
    }

    #[test]
    fn zoom_is_clamped_and_forces_fit_width() {
        let s = state();
        let t = transition(&s, &Command::SetZoom(50.0), &fit_page_ctx()).unwrap();
        assert_eq!(t.state.mode, ViewMode::FitWidth);
        assert!((t.state.zoom - 5.0).abs() < 1e-9);

        assert!(transition(&t.state, &Command::ZoomIn, &fit_page_ctx()).is_none());
    }

    #[test]
    fn rotation_wraps_and_resets_offset() {
        let s = ViewState {
            rotation: Rotation::Deg270,
            scroll_offset: -50,
            ..state()
        };
        let t = transition(&s, &Command::RotateCw, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.rotation, Rotation::Deg0);
        assert_eq!(t.state.scroll_offset, 0);

        let t = transition(&state(), &Command::RotateCcw, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.rotation, Rotation::Deg270);
    }

    #[test]
    fn magnify_saves_and_restores_offset() {
        let s = ViewState {
            mode: ViewMode::FitWidth,
            scroll_offset: -300,
            ..state()
        };
        let rect = Rectangle::new(10, 10, 200, 150);
        let entered = transition(&s, &Command::EnterMagnify(rect), &tall_ctx(-300))
            .unwrap()
            .state;
        assert_eq!(entered.scroll_offset, 0);
        assert_eq!(entered.magnify.map(|m| m.saved_offset), Some(-300));

        let left = transition(&entered, &Command::ExitMagnify, &tall_ctx(0))
            .unwrap()
            .state;
        assert_eq!(left.magnify, None);
        assert_eq!(left.scroll_offset, -300);

        assert!(transition(&left, &Command::ExitMagnify, &tall_ctx(0)).is_none());
        assert!(
            transition(&s, &Command::EnterMagnify(Rectangle::ZERO), &tall_ctx(0)).is_none()
        );
    }

    #[test]
    fn magnify_is_ignored_in_two_page_mode() {
        let s = ViewState {
            two_page: true,
            ..state()
        };
        let rect = Rectangle::new(10, 10, 200, 150);
        assert!(transition(&s, &Command::EnterMagnify(rect), &fit_page_ctx()).is_none());

        // Also on the last page, where no facing page is shown.
        let last = ViewState {
            page: s.page_count,
            ..s
        };
        assert!(transition(&last, &Command::EnterMagnify(rect), &fit_page_ctx()).is_none());
    }

    #[test]
    fn overlay_toggles_do_not_invalidate() {
        let s = state();
        let t = transition(&s, &Command::ToggleStatusBar, &fit_page_ctx()).unwrap();
        assert!(!t.state.status_bar);
        assert_eq!(
            t.effects,
            vec![Effect::Redraw(vec![Rectangle::new(0, 598, 800, 2)])]
        );

        let t = transition(&s, &Command::ToggleContinuous, &fit_page_ctx()).unwrap();
        assert!(t.state.continuous);
        assert!(t.effects.is_empty());

        let t = transition(&s, &Command::ToggleDarkMode, &fit_page_ctx()).unwrap();
        assert!(t.invalidates_bitmap());
    }

    #[test]
    fn resize_to_same_or_empty_size_is_ignored() {
        let s = state();
        assert!(transition(&s, &Command::Resize(VIEW), &fit_page_ctx()).is_none());
        assert!(transition(&s, &Command::Resize(Size::new(0, 10)), &fit_page_ctx()).is_none());
        let t = transition(&s, &Command::Resize(Size::new(640, 480)), &fit_page_ctx()).unwrap();
        assert_eq!(t.state.viewport, Size::new(640, 480));
    }

    #[test]
    fn reload_with_fewer_pages_returns_to_first() {
        let s = ViewState { page: 8, ..state() };
        let t = transition(&s, &Command::Reload { page_count: 5 }, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 1);
        assert_eq!(t.state.page_count, 5);

        let t = transition(&s, &Command::Reload { page_count: 12 }, &fit_page_ctx()).unwrap();
        assert_eq!(t.state.page, 8);
        assert!(t.invalidates_bitmap());
    }

    #[test]
    fn preview_leaves_committed_state_alone() {
        let nav = Navigator::new(state());
        let t = nav.preview(&Command::NextPage, &fit_page_ctx());
        assert!(t.is_some());
        assert_eq!(nav.state().page, 1);
    }
}

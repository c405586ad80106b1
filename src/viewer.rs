//! The viewer: input events in, redraw requests out
//!
//! Owns the open document, the committed view state with its frame and
//! rendered bitmap, the selection and the status prompt. A transition that
//! needs new pixels is committed only after its frame rendered.

use std::path::{Path, PathBuf};

use crossterm::event::{Event, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::config::{Config, ConfigError};
use crate::damage::{self, plan_expose};
use crate::engine::{Bitmap, DocumentEngine, EngineError, RenderRequest, WHITE};
use crate::geometry::{Rectangle, Size, flip_y};
use crate::keymap::{Action, Keymap};
use crate::layout::{Frame, PageSlot, ViewMode};
use crate::navigation::{Command, Context, Effect, Navigator, ViewState};
use crate::prompt::{Prompt, PromptOutcome, Submission};
use crate::search::{self, SearchQuery};
use crate::selection::Selection;

/// Letterbox colour around the page
pub const BACKGROUND: [u8; 3] = [0x80, 0x80, 0x80];
/// Letterbox colour in dark mode
pub const DARK_BACKGROUND: [u8; 3] = [0x20, 0x20, 0x20];

/// The surface the viewer draws on
pub trait Display {
    /// These screen rectangles must be repainted from the viewer
    fn request_redraw(&mut self, rects: &[Rectangle]);

    /// The cached bitmap was replaced; repaint everything
    fn invalidate_bitmap(&mut self);
}

/// Pixels per terminal cell (or any input unit the frontend reports)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellSize {
    pub width: i32,
    pub height: i32,
}

impl CellSize {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{} has no pages", path.display())]
    Empty { path: PathBuf },
}

pub struct Viewer<E: DocumentEngine> {
    engine: E,
    path: PathBuf,
    doc: E::Document,
    config: Config,
    keymap: Keymap,
    cell: CellSize,
    nav: Navigator,
    frame: Frame,
    bitmap: Bitmap,
    selection: Selection,
    prompt: Option<Prompt>,
    /// Text of the last finished selection
    primary: Option<String>,
    /// Text waiting to go to the clipboard
    copied: Option<String>,
}

impl<E: DocumentEngine> Viewer<E> {
    /// Open `path` and render its first frame for a `columns` x `rows` screen
    pub fn open(
        engine: E,
        path: &Path,
        config: Config,
        cell: CellSize,
        columns: u16,
        rows: u16,
    ) -> Result<Self, ViewerError> {
        let keymap = config.keymap()?;
        let doc = engine.open(path)?;
        let page_count = engine.page_count(&doc)?;
        if page_count == 0 {
            return Err(ViewerError::Empty {
                path: path.to_path_buf(),
            });
        }

        let viewport = viewport_for(cell, columns, rows);
        let mut state = config.initial_state(page_count, viewport);
        let (frame, bitmap) = build_frame(&engine, &doc, &state)?;
        state.scroll_offset = frame.placement().y;
        info!("opened {} ({page_count} pages)", path.display());

        Ok(Self {
            engine,
            path: path.to_path_buf(),
            doc,
            config,
            keymap,
            cell,
            nav: Navigator::new(state),
            frame,
            bitmap,
            selection: Selection::new(),
            prompt: None,
            primary: None,
            copied: None,
        })
    }

    pub fn state(&self) -> &ViewState {
        self.nav.state()
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn bitmap(&self) -> &Bitmap {
        &self.bitmap
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        self.prompt.as_ref()
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn primary_selection(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Text the user asked to copy since the last call
    pub fn take_copied(&mut self) -> Option<String> {
        self.copied.take()
    }

    pub fn viewport(&self) -> Size {
        self.state().viewport
    }

    /// Status bar rows, when the status bar is showing
    pub fn status_rect(&self) -> Option<Rectangle> {
        let state = self.state();
        (state.status_bar || self.prompt.is_some())
            .then(|| state.status_rect(self.config.status_bar_height))
            .filter(|r| !r.is_empty())
    }

    /// Status bar line, when the status bar is showing
    pub fn status_text(&self) -> Option<String> {
        if let Some(prompt) = &self.prompt {
            return Some(prompt.text());
        }
        let state = self.state();
        state.status_bar.then(|| {
            let zoom = match state.mode {
                ViewMode::FitPage => state.mode.as_str().to_string(),
                ViewMode::FitWidth => format!("{:.0}%", state.zoom * 100.0),
            };
            format!(
                "page {}/{}  {}  {}°",
                state.page,
                state.page_count,
                zoom,
                state.rotation.degrees()
            )
        })
    }

    /// Repaint `expose` into `canvas`, a screen-sized bitmap.
    ///
    /// The status rows are left for the frontend to draw.
    pub fn paint(&self, expose: &Rectangle, canvas: &mut Bitmap) {
        let status = self.status_rect();
        let plan = plan_expose(expose, &self.frame.placement(), status.as_ref());

        let background = if self.state().dark_mode {
            DARK_BACKGROUND
        } else {
            BACKGROUND
        };
        for r in &plan.clear {
            canvas.fill(r, background);
        }
        for blit in &plan.blits {
            canvas.blit(&self.bitmap, &blit.src, blit.dst_x, blit.dst_y);
        }

        if let Some(sel) = self.selection.screen_rect(&self.frame, self.state().rotation) {
            let visible = sel.intersect(expose);
            if visible.is_empty() {
                return;
            }
            let parts = match status {
                Some(s) => visible.subtract(&s),
                None => vec![visible],
            };
            for part in parts.iter().filter(|p| !p.is_empty()) {
                canvas.invert_rect(part);
            }
        }
    }

    pub fn handle_event(&mut self, event: &Event, display: &mut impl Display) -> Flow {
        match event {
            Event::Key(key) if key.kind != KeyEventKind::Release => {
                return self.handle_key(key, display);
            }
            Event::Mouse(mouse) => self.handle_mouse(mouse, display),
            Event::Resize(columns, rows) => {
                let size = viewport_for(self.cell, *columns, *rows);
                self.dispatch(Command::Resize(size), display);
            }
            Event::FocusGained => display.request_redraw(&[self.viewport().to_rect()]),
            _ => {}
        }
        Flow::Continue
    }

    fn handle_key(&mut self, key: &KeyEvent, display: &mut impl Display) -> Flow {
        if let Some(prompt) = &mut self.prompt {
            match prompt.handle_key(key) {
                PromptOutcome::Unchanged => {}
                PromptOutcome::Edited => self.redraw_status(display),
                PromptOutcome::Dismissed => self.close_prompt(display),
                PromptOutcome::Cancelled => {
                    self.close_prompt(display);
                    if self.state().magnify.is_some() {
                        self.dispatch(Command::ExitMagnify, display);
                    }
                }
                PromptOutcome::Submitted(Submission::Goto(page)) => {
                    self.close_prompt(display);
                    self.dispatch(Command::GotoPage(page), display);
                }
                PromptOutcome::Submitted(Submission::Search(input)) => {
                    self.close_prompt(display);
                    self.search(&input, display);
                }
            }
            return Flow::Continue;
        }

        match self.keymap.lookup(key) {
            Some(action) => self.perform(action, display),
            None => Flow::Continue,
        }
    }

    /// Run a keyboard action
    pub fn perform(&mut self, action: Action, display: &mut impl Display) -> Flow {
        debug!("action {action:?}");
        let continuous = self.state().continuous;
        let command = match action {
            Action::Quit => return Flow::Quit,
            Action::NextPage => Command::NextPage,
            Action::PrevPage => Command::PrevPage,
            Action::FirstPage => Command::FirstPage,
            Action::LastPage => Command::LastPage,
            Action::FitPage => Command::SetMode(ViewMode::FitPage),
            Action::FitWidth => Command::SetMode(ViewMode::FitWidth),
            Action::ScrollDown => Command::ScrollBy {
                fraction: self.config.arrow_scroll,
                turn_pages: continuous,
            },
            Action::ScrollUp => Command::ScrollBy {
                fraction: -self.config.arrow_scroll,
                turn_pages: continuous,
            },
            Action::PageDown => Command::ScrollBy {
                fraction: self.config.page_scroll,
                turn_pages: true,
            },
            Action::PageUp => Command::ScrollBy {
                fraction: -self.config.page_scroll,
                turn_pages: true,
            },
            Action::Back => Command::Back,
            Action::RotateCw => Command::RotateCw,
            Action::RotateCcw => Command::RotateCcw,
            Action::ZoomIn => Command::ZoomIn,
            Action::ZoomOut => Command::ZoomOut,
            Action::ToggleTwoPage => Command::ToggleTwoPage,
            Action::ToggleContinuous => Command::ToggleContinuous,
            Action::ToggleStatusBar => Command::ToggleStatusBar,
            Action::ToggleDarkMode => Command::ToggleDarkMode,
            Action::Reload => {
                self.reload(display);
                return Flow::Continue;
            }
            Action::Copy => {
                self.copy();
                return Flow::Continue;
            }
            Action::GotoPrompt => {
                let count = self.state().page_count;
                self.open_prompt(Prompt::goto(count), display);
                return Flow::Continue;
            }
            Action::SearchPrompt => {
                self.open_prompt(Prompt::search(), display);
                return Flow::Continue;
            }
            Action::PageInfo => {
                let state = self.state();
                let prompt = Prompt::page_info(state.page, state.page_count);
                self.open_prompt(prompt, display);
                return Flow::Continue;
            }
            Action::Magnify => {
                self.magnify(display);
                return Flow::Continue;
            }
        };
        self.dispatch(command, display);
        Flow::Continue
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, display: &mut impl Display) {
        let x = i32::from(mouse.column) * self.cell.width;
        let y = i32::from(mouse.row) * self.cell.height;

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.press(x, y, display),
            MouseEventKind::Drag(MouseButton::Left) => {
                let damage = self.selection.extend(x, y);
                request(display, &damage);
            }
            MouseEventKind::Up(MouseButton::Left) => self.release(x, y, display),
            MouseEventKind::ScrollDown => {
                let fraction = self.config.mouse_scroll;
                self.dispatch(
                    Command::ScrollBy {
                        fraction,
                        turn_pages: true,
                    },
                    display,
                );
            }
            MouseEventKind::ScrollUp => {
                let fraction = -self.config.mouse_scroll;
                self.dispatch(
                    Command::ScrollBy {
                        fraction,
                        turn_pages: true,
                    },
                    display,
                );
            }
            _ => {}
        }
    }

    fn press(&mut self, x: i32, y: i32, display: &mut impl Display) {
        if self.state().magnify.is_some() {
            return;
        }
        let Some(slot) = self.frame.slot_at(x, y).copied() else {
            return;
        };

        if let Some(target) = self.link_at(&slot, x, y) {
            self.dispatch(Command::FollowLink(target), display);
            return;
        }

        let rotation = self.state().rotation;
        let damage = self.selection.begin(
            x,
            y,
            &slot,
            &self.frame,
            rotation,
            self.config.selection_padding,
        );
        request(display, &damage);
    }

    fn release(&mut self, x: i32, y: i32, display: &mut impl Display) {
        if !self.selection.is_dragging() {
            return;
        }
        let Some(slot) = self.frame.slot_for(self.selection.page()).copied() else {
            self.selection.reset();
            return;
        };

        let rotation = self.state().rotation;
        let damage = self.selection.finish(x, y, &slot, rotation);
        request(display, &damage);

        if let Some((page, rect)) = self.selection.document() {
            match self.selected_text(&slot, rect) {
                Ok(text) => {
                    debug!("selected {} chars on page {page}", text.chars().count());
                    self.primary = Some(text);
                }
                Err(e) => warn!("selected text on page {page}: {e}"),
            }
        }
    }

    /// Link target under a screen point of `slot`
    fn link_at(&self, slot: &PageSlot, x: i32, y: i32) -> Option<usize> {
        let links = match self.engine.links(&self.doc, slot.page) {
            Ok(links) => links,
            Err(e) => {
                warn!("links of page {}: {e}", slot.page);
                return None;
            }
        };
        if links.is_empty() {
            return None;
        }

        let rotation = self.state().rotation;
        let conv = slot.converter(true, rotation);
        let px = conv.to_document_x(f64::from(x)) as i32;
        let py = conv.to_document_y(f64::from(y)) as i32;
        let rotated = slot.natural.rotated(rotation);

        links
            .iter()
            .find(|link| {
                let top_left = flip_y(link.area, slot.natural.height);
                let view = rotation.page_to_view(top_left, slot.natural);
                flip_y(view, rotated.height).contains(px, py)
            })
            .map(|link| link.target)
    }

    fn selected_text(&self, slot: &PageSlot, rect: Rectangle) -> Result<String, EngineError> {
        let page_rect = self.state().rotation.view_to_page(rect, slot.natural);
        self.engine.selected_text(&self.doc, slot.page, page_rect)
    }

    fn copy(&mut self) {
        let Some((page, rect)) = self.selection.document() else {
            return;
        };
        let Some(slot) = self.frame.slot_for(page).copied() else {
            return;
        };
        match self.selected_text(&slot, rect) {
            Ok(text) => self.copied = Some(text),
            Err(e) => warn!("copy from page {page}: {e}"),
        }
    }

    fn magnify(&mut self, display: &mut impl Display) {
        let Some((page, rect)) = self.selection.document() else {
            return;
        };
        if page != self.state().page {
            return;
        }
        if self.dispatch(Command::EnterMagnify(rect), display) {
            self.open_prompt(Prompt::message("magnify"), display);
        }
    }

    fn search(&mut self, input: &str, display: &mut impl Display) {
        let Some(query) = SearchQuery::parse(input) else {
            return;
        };
        let (page, page_count) = (self.state().page, self.state().page_count);

        match search::find(&self.engine, &self.doc, &query, page, page_count) {
            Ok(Some(hit)) => {
                if hit.page != page && !self.dispatch(Command::GotoPage(hit.page), display) {
                    return;
                }
                let natural = match self.engine.page_size(&self.doc, hit.page) {
                    Ok(size) => size,
                    Err(e) => {
                        self.show_error(&e, display);
                        return;
                    }
                };
                let rotation = self.state().rotation;
                let rect = rotation.page_to_view(hit.rect, natural);
                let damage = self.selection.select(
                    hit.page,
                    rect,
                    &self.frame,
                    rotation,
                    self.config.selection_padding,
                );
                request(display, &damage);
            }
            Ok(None) => {
                let rotation = self.state().rotation;
                let damage =
                    self.selection
                        .clear(&self.frame, rotation, self.config.selection_padding);
                request(display, &damage);
                self.open_prompt(Prompt::message("not found"), display);
            }
            Err(e) => self.show_error(&e, display),
        }
    }

    fn reload(&mut self, display: &mut impl Display) {
        let doc = match self.engine.open(&self.path) {
            Ok(doc) => doc,
            Err(e) => {
                self.show_error(&e, display);
                return;
            }
        };
        let page_count = match self.engine.page_count(&doc) {
            Ok(n) => n,
            Err(e) => {
                self.show_error(&e, display);
                return;
            }
        };

        let previous = std::mem::replace(&mut self.doc, doc);
        if self.dispatch(Command::Reload { page_count }, display) {
            info!("reloaded {} ({page_count} pages)", self.path.display());
        } else {
            self.doc = previous;
        }
    }

    fn context(&self) -> Context {
        Context {
            placement: self.frame.placement(),
            zoom: self.config.zoom_limits(),
            status_bar_height: self.config.status_bar_height,
        }
    }

    /// Preview `cmd`, render if needed, commit and forward effects.
    ///
    /// Returns false if the command was ignored or its frame failed to
    /// render; the committed state is untouched then.
    pub fn dispatch(&mut self, cmd: Command, display: &mut impl Display) -> bool {
        let Some(mut transition) = self.nav.preview(&cmd, &self.context()) else {
            return false;
        };

        let old = self.state().clone();
        if transition.invalidates_bitmap() {
            match build_frame(&self.engine, &self.doc, &transition.state) {
                Ok((frame, bitmap)) => {
                    transition.state.scroll_offset = frame.placement().y;
                    transition.state.scrolling_up = false;
                    self.frame = frame;
                    self.bitmap = bitmap;
                }
                Err(e) => {
                    error!("{cmd:?}: {e}");
                    self.show_error(&e, display);
                    return false;
                }
            }
        }

        let effects = self.nav.commit(transition);

        // The selection lives in view space, which a rotation replaces.
        let new = self.state();
        if new.page != old.page || new.magnify != old.magnify || new.rotation != old.rotation {
            self.selection.reset();
        }

        for effect in effects {
            match effect {
                Effect::InvalidateBitmap => display.invalidate_bitmap(),
                Effect::Scrolled { to, .. } => {
                    let before = self.frame.placement();
                    self.frame = self.frame.scrolled_to(to);
                    let damage = damage::scrolled(&before, &self.frame.placement(), self.viewport());
                    request(display, &damage);
                }
                Effect::Redraw(rects) => request(display, &rects),
            }
        }
        self.redraw_status(display);
        true
    }

    fn open_prompt(&mut self, prompt: Prompt, display: &mut impl Display) {
        self.prompt = Some(prompt);
        self.redraw_status(display);
    }

    fn close_prompt(&mut self, display: &mut impl Display) {
        // Repaint before forgetting, so the rows are covered even with the
        // status bar turned off.
        let rect = self.status_rect();
        self.prompt = None;
        if let Some(rect) = rect {
            display.request_redraw(&[rect]);
        }
    }

    fn show_error(&mut self, e: &EngineError, display: &mut impl Display) {
        self.open_prompt(Prompt::message(format!("error: {e}")), display);
    }

    fn redraw_status(&self, display: &mut impl Display) {
        if let Some(rect) = self.status_rect() {
            display.request_redraw(&[rect]);
        }
    }
}

fn request(display: &mut impl Display, rects: &[Rectangle]) {
    if !rects.is_empty() {
        display.request_redraw(rects);
    }
}

fn viewport_for(cell: CellSize, columns: u16, rows: u16) -> Size {
    Size::new(
        (i32::from(columns) * cell.width).max(1),
        (i32::from(rows) * cell.height).max(1),
    )
}

/// Lay out and render everything `state` shows
fn build_frame<E: DocumentEngine>(
    engine: &E,
    doc: &E::Document,
    state: &ViewState,
) -> Result<(Frame, Bitmap), EngineError> {
    let input = state.layout_input();
    let natural = engine.page_size(doc, state.page)?;
    let frame = match state.facing_page() {
        Some(right) => {
            let right_size = engine.page_size(doc, right)?;
            Frame::spread((state.page, natural), (right, right_size), &input)
        }
        None => Frame::single(state.page, natural, &input),
    };

    let placement = frame.placement();
    let mut bitmap = Bitmap::filled(Size::new(placement.width, placement.height), WHITE);
    for slot in &frame.slots {
        let request = RenderRequest {
            page: slot.page,
            scale: frame.geometry.scale,
            rotation: state.rotation,
            crop: slot.crop,
        };
        let pixels = engine.render(doc, &request)?;
        bitmap.blit(
            &pixels,
            &pixels.size().to_rect(),
            slot.placement.x - placement.x,
            slot.placement.y - placement.y,
        );
    }

    if state.dark_mode {
        bitmap.invert();
    }

    debug!(
        "frame for page {}: scale {:.3} ({:.0} dpi) placement {:?}",
        state.page,
        frame.geometry.scale,
        frame.geometry.dpi(),
        placement
    );
    Ok((frame, bitmap))
}

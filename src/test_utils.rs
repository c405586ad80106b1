//! Fakes and helpers shared by unit and integration tests

use std::cell::{Cell, RefCell};
use std::path::Path;

use crate::engine::text::{self, TextLine};
use crate::engine::{
    Bitmap, DocumentEngine, EngineError, FindFlags, LinkArea, RenderRequest, check_page,
};
use crate::geometry::{PageSize, Rectangle, Size};
use crate::viewer::Display;

const GLYPH_ADVANCE: f32 = 10.0;
const LINE_HEIGHT: f32 = 12.0;
const LEFT_MARGIN: f32 = 10.0;
const TOP_MARGIN: f32 = 100.0;

#[derive(Clone, Debug, PartialEq)]
pub struct FakePage {
    pub size: PageSize,
    pub lines: Vec<TextLine>,
    pub links: Vec<LinkArea>,
}

/// In-memory document: page sizes, monospace text and links
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FakeDocument {
    pub pages: Vec<FakePage>,
}

impl FakeDocument {
    pub fn uniform(count: usize, size: PageSize) -> Self {
        Self {
            pages: (0..count)
                .map(|_| FakePage {
                    size,
                    lines: Vec::new(),
                    links: Vec::new(),
                })
                .collect(),
        }
    }

    /// Add a page to the end
    pub fn with_page(mut self, size: PageSize) -> Self {
        self.pages.push(FakePage {
            size,
            lines: Vec::new(),
            links: Vec::new(),
        });
        self
    }

    /// Lay `lines` out on `page`, 10pt per glyph and 12pt per line,
    /// starting at (10, 100)
    pub fn with_text(mut self, page: usize, lines: &[&str]) -> Self {
        if let Some(p) = self.pages.get_mut(page - 1) {
            p.lines = lines
                .iter()
                .enumerate()
                .map(|(i, line)| {
                    TextLine::monospace(
                        line,
                        LEFT_MARGIN,
                        TOP_MARGIN + i as f32 * LINE_HEIGHT,
                        GLYPH_ADVANCE,
                        LINE_HEIGHT,
                    )
                })
                .collect();
        }
        self
    }

    /// Add a link on `page`; `area` has a bottom-left origin
    pub fn with_link(mut self, page: usize, area: Rectangle, target: usize) -> Self {
        if let Some(p) = self.pages.get_mut(page - 1) {
            p.links.push(LinkArea { area, target });
        }
        self
    }

    fn page(&self, page: usize) -> Result<&FakePage, EngineError> {
        check_page(page, self.pages.len())?;
        Ok(&self.pages[page - 1])
    }
}

/// Colour the fake engine paints `page` with
pub fn page_color(page: usize) -> [u8; 3] {
    [(page * 20 % 256) as u8, 0x40, 0xc0]
}

/// Engine over [`FakeDocument`]s.
///
/// Every render is one solid [`page_color`]. Opening a path whose name
/// contains `missing` fails; any other path opens the current document.
pub struct FakeEngine {
    document: RefCell<FakeDocument>,
    fail_renders: Cell<bool>,
    renders: Cell<usize>,
}

impl FakeEngine {
    pub fn new(document: FakeDocument) -> Self {
        Self {
            document: RefCell::new(document),
            fail_renders: Cell::new(false),
            renders: Cell::new(0),
        }
    }

    /// What the next `open` returns
    pub fn document(&self) -> FakeDocument {
        self.document.borrow().clone()
    }

    /// Change the file on "disk", for reload tests
    pub fn set_document(&self, document: FakeDocument) {
        *self.document.borrow_mut() = document;
    }

    pub fn fail_renders(&self, fail: bool) {
        self.fail_renders.set(fail);
    }

    pub fn render_count(&self) -> usize {
        self.renders.get()
    }
}

impl DocumentEngine for FakeEngine {
    type Document = FakeDocument;

    fn open(&self, path: &Path) -> Result<FakeDocument, EngineError> {
        if path.to_string_lossy().contains("missing") {
            return Err(EngineError::Open {
                path: path.to_path_buf(),
                detail: "no such file".to_string(),
            });
        }
        Ok(self.document())
    }

    fn page_count(&self, doc: &FakeDocument) -> Result<usize, EngineError> {
        Ok(doc.pages.len())
    }

    fn page_size(&self, doc: &FakeDocument, page: usize) -> Result<PageSize, EngineError> {
        Ok(doc.page(page)?.size)
    }

    fn render(&self, doc: &FakeDocument, request: &RenderRequest) -> Result<Bitmap, EngineError> {
        doc.page(request.page)?;
        if self.fail_renders.get() {
            return Err(EngineError::Render {
                page: request.page,
                detail: "rendering disabled".to_string(),
            });
        }
        self.renders.set(self.renders.get() + 1);
        Ok(Bitmap::filled(
            Size::new(request.crop.width, request.crop.height),
            page_color(request.page),
        ))
    }

    fn find_text(
        &self,
        doc: &FakeDocument,
        page: usize,
        query: &str,
        flags: FindFlags,
    ) -> Result<Option<Rectangle>, EngineError> {
        Ok(text::find_in_lines(&doc.page(page)?.lines, query, flags))
    }

    fn links(&self, doc: &FakeDocument, page: usize) -> Result<Vec<LinkArea>, EngineError> {
        Ok(doc.page(page)?.links.clone())
    }

    fn selected_text(
        &self,
        doc: &FakeDocument,
        page: usize,
        rect: Rectangle,
    ) -> Result<String, EngineError> {
        Ok(text::select_text(&doc.page(page)?.lines, rect))
    }
}

/// Display that remembers what it was asked to do
#[derive(Debug, Default)]
pub struct RecordingDisplay {
    pub redraws: Vec<Rectangle>,
    pub invalidations: usize,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.redraws.clear();
        self.invalidations = 0;
    }

    pub fn is_idle(&self) -> bool {
        self.redraws.is_empty() && self.invalidations == 0
    }
}

impl Display for RecordingDisplay {
    fn request_redraw(&mut self, rects: &[Rectangle]) {
        self.redraws.extend_from_slice(rects);
    }

    fn invalidate_bitmap(&mut self) {
        self.invalidations += 1;
    }
}

pub mod test_helpers {
    use crate::event_source::{Event, KeyCode, SimulatedEventSource};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    /// Builder for creating test scenarios with simulated user input
    #[derive(Default)]
    pub struct TestScenarioBuilder {
        events: Vec<Event>,
    }

    impl TestScenarioBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn press_key(mut self, code: KeyCode) -> Self {
            self.events.push(SimulatedEventSource::key(code));
            self
        }

        pub fn press_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::char_key(c));
            self
        }

        pub fn press_ctrl_char(mut self, c: char) -> Self {
            self.events.push(SimulatedEventSource::ctrl_char_key(c));
            self
        }

        pub fn press_enter(self) -> Self {
            self.press_key(KeyCode::Enter)
        }

        pub fn press_esc(self) -> Self {
            self.press_key(KeyCode::Esc)
        }

        /// Type each character of `text`
        pub fn type_text(mut self, text: &str) -> Self {
            for c in text.chars() {
                self.events.push(SimulatedEventSource::char_key(c));
            }
            self
        }

        /// Next page (Ctrl+PageDown)
        pub fn next_page(mut self) -> Self {
            self.events
                .push(SimulatedEventSource::ctrl_key(KeyCode::PageDown));
            self
        }

        /// Previous page (Ctrl+PageUp)
        pub fn prev_page(mut self) -> Self {
            self.events.push(SimulatedEventSource::ctrl_key(KeyCode::PageUp));
            self
        }

        /// Arrow down `times` times
        pub fn scroll_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::key(KeyCode::Down));
            }
            self
        }

        pub fn page_down(self) -> Self {
            self.press_key(KeyCode::PageDown)
        }

        /// Press, drag and release the left button
        pub fn drag(mut self, from: (u16, u16), to: (u16, u16)) -> Self {
            self.events
                .push(SimulatedEventSource::left_down(from.0, from.1));
            self.events.push(SimulatedEventSource::left_drag(to.0, to.1));
            self.events.push(SimulatedEventSource::left_up(to.0, to.1));
            self
        }

        pub fn click(mut self, column: u16, row: u16) -> Self {
            self.events.push(SimulatedEventSource::left_down(column, row));
            self.events.push(SimulatedEventSource::left_up(column, row));
            self
        }

        pub fn wheel_down(mut self, times: usize) -> Self {
            for _ in 0..times {
                self.events.push(SimulatedEventSource::wheel_down(0, 0));
            }
            self
        }

        pub fn resize(mut self, columns: u16, rows: u16) -> Self {
            self.events.push(SimulatedEventSource::resize(columns, rows));
            self
        }

        pub fn quit(self) -> Self {
            self.press_char('q')
        }

        /// The events, for feeding a viewer directly
        pub fn events(self) -> Vec<Event> {
            self.events
        }

        pub fn build(self) -> SimulatedEventSource {
            SimulatedEventSource::new(self.events)
        }
    }

    pub fn create_test_terminal(width: u16, height: u16) -> Terminal<TestBackend> {
        let backend = TestBackend::new(width, height);
        Terminal::new(backend).unwrap()
    }

    /// The terminal buffer as text, trailing blanks trimmed
    pub fn capture_terminal_state(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let mut lines = Vec::new();

        for y in 0..buffer.area.height {
            let mut line = String::new();
            for x in 0..buffer.area.width {
                line.push_str(buffer[(x, y)].symbol());
            }
            lines.push(line.trim_end().to_string());
        }

        while lines.last().is_some_and(|l| l.is_empty()) {
            lines.pop();
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::test_helpers::*;
    use super::*;

    #[test]
    fn scenario_builder_collects_events() {
        let events = TestScenarioBuilder::new()
            .next_page()
            .drag((1, 1), (5, 5))
            .type_text("ab")
            .quit()
            .events();
        assert_eq!(events.len(), 7);
    }

    #[test]
    fn fake_engine_renders_crop_in_page_colour() {
        let engine = FakeEngine::new(FakeDocument::uniform(3, PageSize::new(100.0, 100.0)));
        let doc = engine.open(Path::new("doc.pdf")).unwrap();
        let bitmap = engine
            .render(
                &doc,
                &RenderRequest {
                    page: 3,
                    scale: 1.0,
                    rotation: crate::geometry::Rotation::Deg0,
                    crop: Rectangle::new(0, 0, 4, 2),
                },
            )
            .unwrap();
        assert_eq!(bitmap.size(), Size::new(4, 2));
        assert_eq!(bitmap.pixel(3, 1), Some(page_color(3)));
        assert_eq!(engine.render_count(), 1);

        assert!(matches!(
            engine.page_size(&doc, 4),
            Err(EngineError::PageOutOfRange { page: 4, count: 3 })
        ));
        assert!(engine.open(Path::new("missing.pdf")).is_err());
    }
}

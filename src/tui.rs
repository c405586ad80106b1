//! Terminal frontend
//!
//! Pixels are drawn with upper half blocks: each cell shows two vertically
//! stacked pixels, the top one as the foreground colour and the bottom one
//! as the background colour.

use std::time::Duration;

use anyhow::Result;
use log::debug;
use ratatui::Terminal;
use ratatui::backend::Backend;
use ratatui::buffer::Buffer;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Paragraph, Widget};
use unicode_width::UnicodeWidthChar;

use crate::damage::DamageTracker;
use crate::engine::{Bitmap, DocumentEngine};
use crate::event_source::EventSource;
use crate::geometry::Rectangle;
use crate::viewer::{BACKGROUND, CellSize, Display, Flow, Viewer};

/// One column by two rows of pixels per cell
pub const HALF_BLOCK: CellSize = CellSize::new(1, 2);

const UPPER_HALF: &str = "\u{2580}";

/// Screen-sized pixel buffer plus the damage it is waiting to repaint
pub struct Screen {
    canvas: Bitmap,
    damage: DamageTracker,
}

impl Default for Screen {
    fn default() -> Self {
        Self::new()
    }
}

impl Screen {
    pub fn new() -> Self {
        let mut damage = DamageTracker::new();
        damage.mark_full();
        Self {
            canvas: Bitmap::filled(Default::default(), BACKGROUND),
            damage,
        }
    }

    pub fn canvas(&self) -> &Bitmap {
        &self.canvas
    }

    /// Repaint pending damage from `viewer`; false if nothing was dirty
    pub fn repaint<E: DocumentEngine>(&mut self, viewer: &Viewer<E>) -> bool {
        let viewport = viewer.viewport();
        if self.canvas.size() != viewport {
            self.canvas = Bitmap::filled(viewport, BACKGROUND);
            self.damage.mark_full();
        }
        if self.damage.is_clean() {
            return false;
        }

        let regions = self.damage.take_regions(viewport);
        debug!("repainting {} region(s)", regions.len());
        for region in &regions {
            viewer.paint(region, &mut self.canvas);
        }
        true
    }
}

impl Display for Screen {
    fn request_redraw(&mut self, rects: &[Rectangle]) {
        self.damage.mark_all(rects.iter().copied());
    }

    fn invalidate_bitmap(&mut self) {
        self.damage.mark_full();
    }
}

/// Half-block rendering of a pixel buffer
pub struct PixelView<'a> {
    pixels: &'a Bitmap,
}

impl<'a> PixelView<'a> {
    pub fn new(pixels: &'a Bitmap) -> Self {
        Self { pixels }
    }
}

impl Widget for PixelView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for row in 0..area.height {
            for col in 0..area.width {
                let x = i32::from(col);
                let y = i32::from(row) * HALF_BLOCK.height;
                let (Some(top), Some(bottom)) =
                    (self.pixels.pixel(x, y), self.pixels.pixel(x, y + 1))
                else {
                    continue;
                };
                if let Some(cell) = buf.cell_mut((area.x + col, area.y + row)) {
                    cell.set_symbol(UPPER_HALF)
                        .set_fg(rgb(top))
                        .set_bg(rgb(bottom));
                }
            }
        }
    }
}

fn rgb([r, g, b]: [u8; 3]) -> Color {
    Color::Rgb(r, g, b)
}

/// Cut `text` to at most `width` terminal columns
pub fn truncate(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut out = String::new();
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        out.push(c);
    }
    out
}

pub fn draw<E: DocumentEngine>(f: &mut ratatui::Frame, screen: &Screen, viewer: &Viewer<E>) {
    let area = f.area();
    f.render_widget(PixelView::new(screen.canvas()), area);

    let (Some(rect), Some(text)) = (viewer.status_rect(), viewer.status_text()) else {
        return;
    };
    let top = u16::try_from(rect.y / HALF_BLOCK.height).unwrap_or(u16::MAX);
    if top >= area.height {
        return;
    }
    let status_area = Rect::new(area.x, area.y + top, area.width, area.height - top);

    let style = if viewer.prompt().is_some() {
        Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Black).bg(Color::Gray)
    };
    let line = Line::from(Span::styled(
        truncate(&text, usize::from(area.width)),
        style,
    ));
    f.render_widget(Paragraph::new(line).style(style), status_area);
}

/// Drive `viewer` from `events` until it quits.
///
/// Ready events are handled in a batch before repainting; when none are
/// ready the loop blocks on the next one.
pub fn run<B, E>(
    terminal: &mut Terminal<B>,
    viewer: &mut Viewer<E>,
    events: &mut dyn EventSource,
    copy: &mut dyn FnMut(&str),
) -> Result<()>
where
    B: Backend,
    B::Error: Send + Sync + 'static,
    E: DocumentEngine,
{
    let mut screen = Screen::new();
    loop {
        if screen.repaint(viewer) {
            terminal.draw(|f| draw(f, &screen, viewer))?;
        }

        let mut batch = Vec::new();
        while events.poll(Duration::ZERO)? {
            batch.push(events.read()?);
        }
        if batch.is_empty() {
            batch.push(events.read()?);
        }

        for event in &batch {
            if viewer.handle_event(event, &mut screen) == Flow::Quit {
                return Ok(());
            }
            if let Some(text) = viewer.take_copied() {
                copy(&text);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_counts_columns() {
        assert_eq!(truncate("page 1/3", 4), "page");
        assert_eq!(truncate("日本語", 5), "日本");
        assert_eq!(truncate("short", 80), "short");
    }

    #[test]
    fn pixel_view_stacks_two_pixels_per_cell() {
        let mut pixels = Bitmap::filled(crate::geometry::Size::new(2, 4), [0, 0, 0]);
        pixels.set_pixel(1, 3, [9, 8, 7]);

        let area = Rect::new(0, 0, 2, 2);
        let mut buf = Buffer::empty(area);
        PixelView::new(&pixels).render(area, &mut buf);

        let cell = &buf[(1, 1)];
        assert_eq!(cell.symbol(), UPPER_HALF);
        assert_eq!(cell.fg, Color::Rgb(0, 0, 0));
        assert_eq!(cell.bg, Color::Rgb(9, 8, 7));
    }
}

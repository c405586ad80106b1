//! Text lookup over laid-out lines
//!
//! Engines extract lines and glyph origins from their own text model; the
//! matching and selection rules live here so every engine agrees on them.

use super::FindFlags;
use crate::geometry::Rectangle;

/// A glyph and the x coordinate of its origin
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Glyph {
    pub c: char,
    pub x: f32,
}

/// One line of text in page space with a top-left origin
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub top: f32,
    pub bottom: f32,
    /// Right edge of the line box
    pub right: f32,
    pub glyphs: Vec<Glyph>,
}

impl TextLine {
    /// Lay out `text` with a fixed advance, handy for tests and fakes
    pub fn monospace(text: &str, x: f32, top: f32, advance: f32, height: f32) -> Self {
        let glyphs: Vec<Glyph> = text
            .chars()
            .enumerate()
            .map(|(i, c)| Glyph {
                c,
                x: x + i as f32 * advance,
            })
            .collect();
        Self {
            top,
            bottom: top + height,
            right: x + glyphs.len() as f32 * advance,
            glyphs,
        }
    }
}

fn fold(c: char, ignore_case: bool) -> char {
    if ignore_case {
        c.to_lowercase().next().unwrap_or(c)
    } else {
        c
    }
}

fn is_word(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// First match of `query` inside one line
pub fn find_in_line(line: &TextLine, query: &str, flags: FindFlags) -> Option<Rectangle> {
    let needle: Vec<char> = query.chars().map(|c| fold(c, flags.ignore_case)).collect();
    let hay: Vec<char> = line
        .glyphs
        .iter()
        .map(|g| fold(g.c, flags.ignore_case))
        .collect();
    let n = needle.len();
    if n == 0 || n > hay.len() {
        return None;
    }

    let start = (0..=hay.len() - n).find(|&i| {
        hay[i..i + n] == needle[..]
            && (!flags.whole_words
                || ((i == 0 || !is_word(hay[i - 1])) && (i + n == hay.len() || !is_word(hay[i + n]))))
    })?;

    let x0 = line.glyphs[start].x;
    let x1 = line.glyphs.get(start + n).map_or(line.right, |g| g.x);
    Some(Rectangle::new(
        x0 as i32,
        line.top as i32,
        (x1 - x0).ceil() as i32,
        (line.bottom - line.top).ceil() as i32,
    ))
}

/// First match of `query` in reading order
pub fn find_in_lines(lines: &[TextLine], query: &str, flags: FindFlags) -> Option<Rectangle> {
    lines.iter().find_map(|line| find_in_line(line, query, flags))
}

/// Text selected by `rect`, following the reading flow.
///
/// The first line starts at the left edge of the rectangle and the last
/// line ends at its right edge; lines in between are taken whole.
pub fn select_text(lines: &[TextLine], rect: Rectangle) -> String {
    let rect = rect.normalize();
    let (start_x, end_x) = (rect.x as f32, rect.right() as f32);
    let (min_y, max_y) = (rect.y as f32, rect.bottom() as f32);

    let mut selected = Vec::new();
    for line in lines {
        if line.bottom < min_y || line.top > max_y {
            continue;
        }
        let is_first = line.top <= min_y && line.bottom >= min_y;
        let is_last = line.top <= max_y && line.bottom >= max_y;

        let text: String = line
            .glyphs
            .iter()
            .filter(|g| match (is_first, is_last) {
                (true, true) => g.x >= start_x && g.x <= end_x,
                (true, false) => g.x >= start_x,
                (false, true) => g.x <= end_x,
                (false, false) => true,
            })
            .map(|g| g.c)
            .collect();

        if !text.is_empty() {
            selected.push(text);
        }
    }
    selected.join("\n")
}

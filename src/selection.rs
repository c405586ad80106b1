//! Rubber-band text selection
//!
//! While dragging, the selection lives in screen space. On release it is
//! stored in document space (view space of its page, top-left origin) so it
//! follows the page when the view scrolls.

use crate::damage;
use crate::geometry::{Rectangle, Rotation};
use crate::layout::{Frame, PageSlot};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
    /// Raw drag rectangle; extents go negative when dragging up or left
    screen: Rectangle,
    /// Committed rectangle in the page's view space
    document: Rectangle,
    page: usize,
    dragging: bool,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// Page the selection was started on
    pub fn page(&self) -> usize {
        self.page
    }

    /// Committed selection with a positive area, with its page
    pub fn document(&self) -> Option<(usize, Rectangle)> {
        (!self.dragging && !self.document.is_empty()).then_some((self.page, self.document))
    }

    /// Where the selection currently is on screen
    pub fn screen_rect(&self, frame: &Frame, rotation: Rotation) -> Option<Rectangle> {
        if self.dragging {
            return Some(self.screen.normalize());
        }
        let (page, document) = self.document()?;
        let slot = frame.slot_for(page)?;
        Some(
            slot.converter(false, rotation)
                .to_screen_rect(&document)
                .normalize(),
        )
    }

    /// Start a new selection at a pointer press inside `slot`.
    ///
    /// Returns the damage of removing the previous selection, re-derived from
    /// its document rectangle since the page may have moved.
    pub fn begin(
        &mut self,
        x: i32,
        y: i32,
        slot: &PageSlot,
        frame: &Frame,
        rotation: Rotation,
        padding: i32,
    ) -> Vec<Rectangle> {
        let damage = self.clear(frame, rotation, padding);
        self.screen = Rectangle::new(x, y, 0, 0);
        self.page = slot.page;
        self.dragging = true;
        damage
    }

    /// Move the free corner of a drag; returns only the changed strips
    pub fn extend(&mut self, x: i32, y: i32) -> Vec<Rectangle> {
        if !self.dragging {
            return vec![];
        }
        let prev = self.screen.normalize();
        self.screen.width = x - self.screen.x;
        self.screen.height = y - self.screen.y;
        damage::diff(&prev, &self.screen.normalize()).regions()
    }

    /// Finish the drag and store the selection in document space
    pub fn finish(
        &mut self,
        x: i32,
        y: i32,
        slot: &PageSlot,
        rotation: Rotation,
    ) -> Vec<Rectangle> {
        if !self.dragging {
            return vec![];
        }
        let damage = self.extend(x, y);
        let rect = self.screen.normalize();
        self.document = if rect.is_empty() {
            Rectangle::ZERO
        } else {
            slot.converter(false, rotation).to_document_rect(&rect)
        };
        self.dragging = false;
        damage
    }

    /// Select a document rectangle directly, as a search hit does
    pub fn select(
        &mut self,
        page: usize,
        document: Rectangle,
        frame: &Frame,
        rotation: Rotation,
        padding: i32,
    ) -> Vec<Rectangle> {
        let mut damage = self.clear(frame, rotation, padding);
        self.page = page;
        self.document = document;
        if let Some(rect) = self.screen_rect(frame, rotation) {
            damage.push(rect.pad(padding));
        }
        damage
    }

    /// Drop the selection; returns the padded area it covered
    pub fn clear(&mut self, frame: &Frame, rotation: Rotation, padding: i32) -> Vec<Rectangle> {
        let damage = self
            .screen_rect(frame, rotation)
            .filter(|r| !r.is_empty())
            .map(|r| vec![r.pad(padding)])
            .unwrap_or_default();
        *self = Self::default();
        damage
    }

    /// Forget the selection without computing damage, for full repaints
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

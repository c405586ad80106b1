//! Document engine seam
//!
//! The viewer never decodes documents itself. It asks an engine for page
//! sizes, rasterized regions, text hits, links and selected text, always
//! with 1-based page numbers.

mod bitmap;
#[cfg(feature = "pdf")]
pub mod pdf;
pub mod text;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::geometry::{PageSize, Rectangle, Rotation};

pub use bitmap::{Bitmap, WHITE};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("cannot open {path}: {detail}")]
    Open { path: PathBuf, detail: String },

    #[error("page {page} out of range (document has {count})")]
    PageOutOfRange { page: usize, count: usize },

    #[error("render of page {page} failed: {detail}")]
    Render { page: usize, detail: String },

    #[cfg(feature = "pdf")]
    #[error("PDF engine: {0}")]
    Pdf(#[from] mupdf::error::Error),

    #[error("{detail}")]
    Generic { detail: String },
}

impl EngineError {
    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic { detail: msg.into() }
    }
}

/// Rasterize part of a page
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderRequest {
    /// 1-based page
    pub page: usize,
    /// Device pixels per point
    pub scale: f64,
    pub rotation: Rotation,
    /// Pixel region of the scaled, rotated page to return
    pub crop: Rectangle,
}

/// Text search options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FindFlags {
    pub ignore_case: bool,
    pub whole_words: bool,
}

/// A link on a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LinkArea {
    /// Active area in page space with a bottom-left origin
    pub area: Rectangle,
    /// 1-based destination page
    pub target: usize,
}

pub trait DocumentEngine {
    type Document;

    fn open(&self, path: &Path) -> Result<Self::Document, EngineError>;

    fn page_count(&self, doc: &Self::Document) -> Result<usize, EngineError>;

    /// Natural size of a page in points, unrotated
    fn page_size(&self, doc: &Self::Document, page: usize) -> Result<PageSize, EngineError>;

    fn render(&self, doc: &Self::Document, request: &RenderRequest) -> Result<Bitmap, EngineError>;

    /// First match of `query` on `page`, in page space with a top-left origin
    fn find_text(
        &self,
        doc: &Self::Document,
        page: usize,
        query: &str,
        flags: FindFlags,
    ) -> Result<Option<Rectangle>, EngineError>;

    fn links(&self, doc: &Self::Document, page: usize) -> Result<Vec<LinkArea>, EngineError>;

    /// Text under `rect` (page space, top-left origin)
    fn selected_text(
        &self,
        doc: &Self::Document,
        page: usize,
        rect: Rectangle,
    ) -> Result<String, EngineError>;
}

/// Reject pages outside `1..=count`
pub fn check_page(page: usize, count: usize) -> Result<(), EngineError> {
    if page == 0 || page > count {
        Err(EngineError::PageOutOfRange { page, count })
    } else {
        Ok(())
    }
}

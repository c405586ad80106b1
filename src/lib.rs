//! A minimal document viewer built around a precise viewport engine:
//! rectangle algebra, coordinate conversion, page layout, navigation
//! transitions and damage tracking, with the document engine behind a
//! trait.

pub mod config;
pub mod damage;
pub mod engine;
pub mod event_source;
pub mod geometry;
pub mod keymap;
pub mod layout;
pub mod navigation;
pub mod panic_handler;
pub mod prompt;
pub mod search;
pub mod selection;
pub mod tui;
pub mod viewer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use engine::{Bitmap, DocumentEngine, EngineError};
pub use geometry::{CoordConv, PageSize, Rectangle, Rotation, Size};
pub use viewer::{Display, Flow, Viewer};

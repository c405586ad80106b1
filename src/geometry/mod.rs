//! Geometry primitives: rectangles, rotation, and coordinate conversion

mod coord;
mod rect;
mod rotation;

pub use coord::CoordConv;
pub use rect::{Rectangle, Size};
pub use rotation::{PageSize, Rotation, flip_y};

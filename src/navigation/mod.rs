//! View state and the pure transitions that move it
//!
//! Every user intent becomes a [`Command`]. [`transition`] turns the current
//! [`ViewState`] and a command into a candidate [`Transition`] without
//! touching anything; the caller decides whether to commit it.

mod history;
mod state;

pub use history::{History, HistoryEntry};
pub use state::{
    Command, Context, Effect, Magnify, Navigator, Transition, ViewState, ZoomLimits,
    scroll_delta, transition,
};

use anyhow::Result;
pub use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyEventState, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use std::collections::VecDeque;
use std::time::Duration;

/// Where input events come from: the terminal, or a script in tests
pub trait EventSource {
    /// Wait up to `timeout` for an event; true if one is ready
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Next event, blocking until there is one
    fn read(&mut self) -> Result<Event>;
}

/// Terminal input through crossterm
pub struct KeyboardEventSource;

impl EventSource for KeyboardEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Replays a fixed list of events, then reports `q` forever
pub struct SimulatedEventSource {
    events: VecDeque<Event>,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events: events.into(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            state: KeyEventState::empty(),
        })
    }

    pub fn key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::empty())
    }

    pub fn char_key(c: char) -> Event {
        Self::key(KeyCode::Char(c))
    }

    pub fn ctrl_key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::CONTROL)
    }

    pub fn ctrl_char_key(c: char) -> Event {
        Self::ctrl_key(KeyCode::Char(c))
    }

    pub fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    pub fn left_down(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    pub fn left_drag(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    pub fn left_up(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::Up(MouseButton::Left), column, row)
    }

    pub fn wheel_down(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::ScrollDown, column, row)
    }

    pub fn wheel_up(column: u16, row: u16) -> Event {
        Self::mouse(MouseEventKind::ScrollUp, column, row)
    }

    pub fn resize(columns: u16, rows: u16) -> Event {
        Event::Resize(columns, rows)
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(!self.events.is_empty())
    }

    fn read(&mut self) -> Result<Event> {
        Ok(self
            .events
            .pop_front()
            .unwrap_or_else(|| SimulatedEventSource::char_key('q')))
    }
}

//! Status-bar prompt: one line of input or a message

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputKind {
    Goto { page_count: usize },
    Search,
}

/// Accepted input
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    Goto(usize),
    Search(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PromptOutcome {
    /// Key ignored
    Unchanged,
    /// The text changed; the status bar needs repainting
    Edited,
    Cancelled,
    /// Enter on a message: close it, nothing else
    Dismissed,
    Submitted(Submission),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Prompt {
    Input { kind: InputKind, value: String },
    Message(String),
}

impl Prompt {
    pub fn goto(page_count: usize) -> Self {
        Self::Input {
            kind: InputKind::Goto { page_count },
            value: String::new(),
        }
    }

    pub fn search() -> Self {
        Self::Input {
            kind: InputKind::Search,
            value: String::new(),
        }
    }

    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    pub fn page_info(page: usize, page_count: usize) -> Self {
        Self::Message(format!("page {page}/{page_count}"))
    }

    /// What the status bar shows
    pub fn text(&self) -> String {
        match self {
            Self::Input {
                kind: InputKind::Goto { page_count },
                value,
            } => format!("goto page [1, {page_count}]: {value}"),
            Self::Input {
                kind: InputKind::Search,
                value,
            } => format!("search: {value}"),
            Self::Message(text) => text.clone(),
        }
    }

    pub fn handle_key(&mut self, key: &KeyEvent) -> PromptOutcome {
        if key.code == KeyCode::Esc {
            return PromptOutcome::Cancelled;
        }

        let Self::Input { kind, value } = self else {
            return if key.code == KeyCode::Enter {
                PromptOutcome::Dismissed
            } else {
                PromptOutcome::Unchanged
            };
        };

        match key.code {
            KeyCode::Backspace => {
                if value.pop().is_some() {
                    PromptOutcome::Edited
                } else {
                    PromptOutcome::Unchanged
                }
            }
            KeyCode::Enter => match *kind {
                InputKind::Goto { page_count } => parse_page(value, page_count)
                    .map_or(PromptOutcome::Unchanged, |page| {
                        PromptOutcome::Submitted(Submission::Goto(page))
                    }),
                InputKind::Search => PromptOutcome::Submitted(Submission::Search(value.clone())),
            },
            KeyCode::Char(c)
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                value.push(c);
                PromptOutcome::Edited
            }
            _ => PromptOutcome::Unchanged,
        }
    }
}

/// Page number typed by the user, if it is in `1..=page_count`
pub fn parse_page(input: &str, page_count: usize) -> Option<usize> {
    input
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|p| (1..=page_count).contains(p))
}

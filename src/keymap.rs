//! Keyboard shortcuts
//!
//! A binding maps a key plus modifier set to an [`Action`]. Bindings with
//! [`ModifierMatch::Any`] fire regardless of the modifiers held.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Quit,
    NextPage,
    PrevPage,
    FirstPage,
    LastPage,
    FitPage,
    FitWidth,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    Back,
    Reload,
    Copy,
    GotoPrompt,
    SearchPrompt,
    PageInfo,
    Magnify,
    RotateCw,
    RotateCcw,
    ZoomIn,
    ZoomOut,
    ToggleTwoPage,
    ToggleContinuous,
    ToggleStatusBar,
    ToggleDarkMode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModifierMatch {
    Exact(KeyModifiers),
    Any,
}

impl ModifierMatch {
    fn matches(&self, modifiers: KeyModifiers) -> bool {
        match self {
            Self::Any => true,
            Self::Exact(m) => *m == modifiers,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Binding {
    pub code: KeyCode,
    pub modifiers: ModifierMatch,
    pub action: Action,
}

impl Binding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers, action: Action) -> Self {
        Self {
            code,
            modifiers: ModifierMatch::Exact(modifiers),
            action,
        }
    }

    pub const fn any_modifiers(code: KeyCode, action: Action) -> Self {
        Self {
            code,
            modifiers: ModifierMatch::Any,
            action,
        }
    }
}

/// Binding as written in the config file
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSpec {
    /// Key name: a single character or one of `esc`, `enter`, `pageup`,
    /// `pagedown`, `home`, `end`, `up`, `down`, `left`, `right`, `f1`..`f12`
    pub key: String,
    /// `+`-separated list of `ctrl`, `alt`, `shift`, or `any`
    #[serde(default)]
    pub modifiers: String,
    pub action: Action,
}

impl BindingSpec {
    pub fn to_binding(&self) -> Result<Binding, String> {
        let code = parse_key(&self.key).ok_or_else(|| format!("unknown key {:?}", self.key))?;
        let modifiers = parse_modifiers(&self.modifiers)
            .ok_or_else(|| format!("unknown modifiers {:?}", self.modifiers))?;
        Ok(Binding {
            code,
            modifiers,
            action: self.action,
        })
    }
}

pub fn parse_key(name: &str) -> Option<KeyCode> {
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(KeyCode::Char(c));
    }

    let lower = name.to_ascii_lowercase();
    let code = match lower.as_str() {
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "tab" => KeyCode::Tab,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        other => {
            let n = other.strip_prefix('f')?.parse::<u8>().ok()?;
            if !(1..=12).contains(&n) {
                return None;
            }
            KeyCode::F(n)
        }
    };
    Some(code)
}

pub fn parse_modifiers(spec: &str) -> Option<ModifierMatch> {
    let spec = spec.trim();
    if spec.eq_ignore_ascii_case("any") {
        return Some(ModifierMatch::Any);
    }

    let mut modifiers = KeyModifiers::empty();
    for part in spec.split('+').map(str::trim).filter(|p| !p.is_empty()) {
        modifiers |= match part.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "alt" => KeyModifiers::ALT,
            "shift" => KeyModifiers::SHIFT,
            _ => return None,
        };
    }
    Some(ModifierMatch::Exact(modifiers))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    bindings: Vec<Binding>,
}

impl Default for Keymap {
    fn default() -> Self {
        use Action as A;
        use KeyCode as K;

        let none = KeyModifiers::empty();
        let ctrl = KeyModifiers::CONTROL;

        Self {
            bindings: vec![
                Binding::any_modifiers(K::Char('q'), A::Quit),
                Binding::new(K::Esc, none, A::Quit),
                Binding::new(K::PageDown, ctrl, A::NextPage),
                Binding::new(K::PageUp, ctrl, A::PrevPage),
                Binding::new(K::Home, ctrl, A::FirstPage),
                Binding::new(K::End, ctrl, A::LastPage),
                Binding::new(K::Char('z'), none, A::FitPage),
                Binding::new(K::Char('w'), none, A::FitWidth),
                Binding::new(K::Down, none, A::ScrollDown),
                Binding::new(K::Up, none, A::ScrollUp),
                Binding::new(K::PageDown, none, A::PageDown),
                Binding::new(K::PageUp, none, A::PageUp),
                Binding::new(K::Char('b'), none, A::Back),
                Binding::new(K::Char('r'), none, A::Reload),
                Binding::new(K::Char('c'), ctrl, A::Copy),
                Binding::new(K::Char('g'), none, A::GotoPrompt),
                Binding::new(K::Char('s'), none, A::SearchPrompt),
                Binding::new(K::Char('/'), none, A::SearchPrompt),
                Binding::new(K::Char('p'), none, A::PageInfo),
                Binding::new(K::Char('m'), none, A::Magnify),
                Binding::new(K::Char(']'), none, A::RotateCw),
                Binding::new(K::Char('['), none, A::RotateCcw),
                Binding::new(K::Char('+'), ctrl, A::ZoomIn),
                Binding::new(K::Char('='), ctrl, A::ZoomIn),
                Binding::new(K::Char('-'), ctrl, A::ZoomOut),
                Binding::new(K::Char('t'), none, A::ToggleTwoPage),
                Binding::new(K::Char('c'), none, A::ToggleContinuous),
                Binding::new(K::F(7), none, A::ToggleStatusBar),
                Binding::new(K::Char('i'), none, A::ToggleDarkMode),
            ],
        }
    }
}

impl Keymap {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Add a binding, replacing any existing binding of the same key
    pub fn bind(&mut self, binding: Binding) {
        self.bindings
            .retain(|b| !(b.code == binding.code && b.modifiers == binding.modifiers));
        self.bindings.push(binding);
    }

    pub fn lookup(&self, key: &KeyEvent) -> Option<Action> {
        let modifiers = effective_modifiers(key);
        self.bindings
            .iter()
            .find(|b| b.code == key.code && b.modifiers.matches(modifiers))
            .map(|b| b.action)
    }
}

/// Shift is already part of a typed character
fn effective_modifiers(key: &KeyEvent) -> KeyModifiers {
    match key.code {
        KeyCode::Char(_) => key.modifiers - KeyModifiers::SHIFT,
        _ => key.modifiers,
    }
}

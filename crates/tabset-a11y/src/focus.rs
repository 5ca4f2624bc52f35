//! Focus Management
//!
//! Roving tabindex and keyboard navigation across a row of triggers.

use std::fmt;
use std::str::FromStr;

use crate::A11yError;

/// Keys the widget reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
}

impl FromStr for Key {
    type Err = A11yError;

    /// Parse a `KeyboardEvent.key` value
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "ArrowLeft" | "Left" => Self::ArrowLeft,
            "ArrowRight" | "Right" => Self::ArrowRight,
            "ArrowUp" | "Up" => Self::ArrowUp,
            "ArrowDown" | "Down" => Self::ArrowDown,
            "Home" => Self::Home,
            "End" => Self::End,
            "Enter" => Self::Enter,
            " " | "Space" | "Spacebar" => Self::Space,
            _ => return Err(A11yError::UnknownKey(s.to_string())),
        })
    }
}

/// What a key press on trigger `current` means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    /// Move focus to the trigger at this index
    Move(usize),
    /// Activate (or toggle) the focused trigger
    Activate,
}

/// Roving tabindex over `len` triggers
#[derive(Debug, Clone, Copy)]
pub struct RovingTabIndex {
    len: usize,
}

impl RovingTabIndex {
    pub fn new(len: usize) -> Self {
        Self { len }
    }

    /// Resolve a key press. Arrows wrap at both ends.
    pub fn resolve(&self, key: Key, current: usize) -> Option<KeyAction> {
        if self.len == 0 {
            return None;
        }
        let current = current.min(self.len - 1);
        Some(match key {
            Key::ArrowRight | Key::ArrowDown => KeyAction::Move((current + 1) % self.len),
            Key::ArrowLeft | Key::ArrowUp => KeyAction::Move((current + self.len - 1) % self.len),
            Key::Home => KeyAction::Move(0),
            Key::End => KeyAction::Move(self.len - 1),
            Key::Enter | Key::Space => KeyAction::Activate,
        })
    }
}

/// Tab index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabIndex {
    NotFocusable,     // tabindex="-1"
    Sequential(i32),  // tabindex="0" or positive
}

impl TabIndex {
    pub fn parse(value: &str) -> Self {
        match value.trim().parse::<i32>() {
            Ok(n) if n < 0 => Self::NotFocusable,
            Ok(n) => Self::Sequential(n),
            Err(_) => Self::NotFocusable,
        }
    }

    pub fn is_focusable(&self) -> bool {
        matches!(self, Self::Sequential(_))
    }
}

impl fmt::Display for TabIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFocusable => f.write_str("-1"),
            Self::Sequential(n) => write!(f, "{n}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roving_wraps() {
        let nav = RovingTabIndex::new(3);
        assert_eq!(nav.resolve(Key::ArrowRight, 2), Some(KeyAction::Move(0)));
        assert_eq!(nav.resolve(Key::ArrowLeft, 0), Some(KeyAction::Move(2)));
        assert_eq!(nav.resolve(Key::End, 0), Some(KeyAction::Move(2)));
        assert_eq!(nav.resolve(Key::Space, 1), Some(KeyAction::Activate));
    }

    #[test]
    fn test_roving_empty() {
        assert_eq!(RovingTabIndex::new(0).resolve(Key::Home, 0), None);
    }

    #[test]
    fn test_key_parse() {
        assert_eq!(" ".parse::<Key>().unwrap(), Key::Space);
        assert_eq!("Left".parse::<Key>().unwrap(), Key::ArrowLeft);
        assert!("Escape".parse::<Key>().is_err());
    }

    #[test]
    fn test_tab_index() {
        assert_eq!(TabIndex::parse("-1"), TabIndex::NotFocusable);
        assert_eq!(TabIndex::parse("0"), TabIndex::Sequential(0));
        assert!(!TabIndex::parse("x").is_focusable());
        assert_eq!(TabIndex::Sequential(0).to_string(), "0");
    }
}

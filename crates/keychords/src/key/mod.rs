//! # Key representation
//!
//! ## Overview
//!
//! This module contains the canonical representation of a single key press,
//! the vim-style notation parser that produces sequences of them, and the
//! formatting used when showing an in-progress sequence to users.
//!
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;

use self::parse::parse_sequence_str;

pub(crate) mod parse;

/// Errors that occur while parsing key notation.
#[derive(thiserror::Error, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ParseError {
    /// A character that doesn't name a recognized key.
    #[error("Unrecognised Letter: {0}")]
    UnrecognisedLetter(String),

    /// A combo prefix other than `C-`, `S-` or `A-`.
    #[error("Unrecognised Modifier")]
    UnrecognisedModifier,
}

bitflags! {
    /// The modifier keys held down alongside a base key.
    #[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
    pub struct KeyModifiers: u8 {
        /// No modifiers held.
        const NONE = 0b000;
        /// The Control key.
        const CONTROL = 0b001;
        /// The Shift key.
        const SHIFT = 0b010;
        /// The Alt key.
        const ALT = 0b100;
    }
}

/// A base key identity, before any modifiers are applied.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Key {
    /// A letter or digit. Letters are always stored lowercase; their case is
    /// carried by [KeyModifiers::SHIFT].
    Char(char),
    /// A function key.
    F(u8),
    /// The Return key.
    Return,
    /// The Escape key.
    Escape,
    /// The space bar.
    Space,
    /// The Tab key.
    Tab,
    /// The Backspace key.
    Backspace,
    /// The Delete key.
    Delete,
    /// The Insert key.
    Insert,
    /// The Home key.
    Home,
    /// The End key.
    End,
    /// The Page Up key.
    PageUp,
    /// The Page Down key.
    PageDown,
    /// The up arrow.
    Up,
    /// The down arrow.
    Down,
    /// The left arrow.
    Left,
    /// The right arrow.
    Right,
    /// A bare press of the Shift key.
    Shift,
    /// A bare press of the Control key.
    Control,
    /// A bare press of the Alt key.
    Alt,
    /// A key this library has no representation for.
    Null,
}

impl Key {
    fn name(&self) -> Cow<'static, str> {
        let name = match self {
            Key::Char(c) => return Cow::Owned(c.to_string()),
            Key::F(n) => return Cow::Owned(format!("f{n}")),
            Key::Return => "return",
            Key::Escape => "escape",
            Key::Space => "space",
            Key::Tab => "tab",
            Key::Backspace => "backspace",
            Key::Delete => "delete",
            Key::Insert => "insert",
            Key::Home => "home",
            Key::End => "end",
            Key::PageUp => "pageup",
            Key::PageDown => "pagedown",
            Key::Up => "up",
            Key::Down => "down",
            Key::Left => "left",
            Key::Right => "right",
            Key::Shift => "shift",
            Key::Control => "control",
            Key::Alt => "alt",
            Key::Null => "null",
        };

        Cow::Borrowed(name)
    }

    fn shifted_name(&self) -> Cow<'static, str> {
        let name = match self {
            Key::Char(c) => return Cow::Owned(c.to_ascii_uppercase().to_string()),
            Key::F(n) => return Cow::Owned(format!("F{n}")),
            Key::Return => "Return",
            Key::Escape => "Escape",
            Key::Space => "Space",
            Key::Tab => "Tab",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Up => "Up",
            Key::Down => "Down",
            Key::Left => "Left",
            Key::Right => "Right",
            Key::Shift => "Shift",
            Key::Control => "Control",
            Key::Alt => "Alt",
            Key::Null => "Null",
        };

        Cow::Borrowed(name)
    }
}

/// A single key press: a base key plus the modifiers held with it.
///
/// Two symbols are equal iff both the base key and the full modifier set are
/// identical.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct KeySymbol {
    code: Key,
    modifiers: KeyModifiers,
}

impl KeySymbol {
    /// Create a new symbol.
    ///
    /// Uppercase characters are folded to lowercase with
    /// [KeyModifiers::SHIFT] OR-ed in, so that `A` and `<S-a>` compare
    /// equal.
    pub fn new(code: Key, mut modifiers: KeyModifiers) -> Self {
        let code = match code {
            Key::Char(c) if c.is_ascii_uppercase() => {
                modifiers |= KeyModifiers::SHIFT;

                Key::Char(c.to_ascii_lowercase())
            },
            code => code,
        };

        Self { code, modifiers }
    }

    /// Return the base key identity.
    pub fn code(&self) -> Key {
        self.code
    }

    /// Return the modifiers held with the base key.
    pub fn modifiers(&self) -> KeyModifiers {
        self.modifiers
    }
}

impl From<Key> for KeySymbol {
    fn from(code: Key) -> Self {
        KeySymbol::new(code, KeyModifiers::NONE)
    }
}

impl FromStr for KeySymbol {
    type Err = ParseError;

    fn from_str(input: &str) -> Result<Self, ParseError> {
        match parse_keys(input)?.as_slice() {
            [key] => Ok(*key),
            _ => Err(ParseError::UnrecognisedLetter(input.to_string())),
        }
    }
}

impl fmt::Display for KeySymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control wins over Shift, which wins over Alt, when more than one
        // modifier bit is set.
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            write!(f, "^{}", self.code.name())
        } else if self.modifiers.contains(KeyModifiers::SHIFT) {
            write!(f, "{}", self.code.shifted_name())
        } else if self.modifiers.contains(KeyModifiers::ALT) {
            write!(f, "!{}", self.code.name())
        } else {
            write!(f, "{}", self.code.name())
        }
    }
}

/// Parse vim-style notation into a sequence of key symbols.
///
/// Bare characters name themselves (`gw`), with uppercase implying Shift.
/// Angle-bracket combos take the shape `<C-x>`, `<S-x>` or `<A-x>`; the case
/// of the combo's key still implies Shift. Combos of any other shape produce
/// no symbol.
///
/// Fails without returning any symbols when a character or a combo's key
/// doesn't name a recognized key, or when a combo uses an unknown modifier
/// prefix.
pub fn parse_keys(input: &str) -> Result<Vec<KeySymbol>, ParseError> {
    parse_sequence_str(input)
}

/// Format a sequence of key symbols for display.
///
/// Control is shown as a `^` prefix, Shift as the capitalized key name, and
/// Alt as a `!` prefix; `parse_keys("<C-s>f")` formats as `^sf`. This is a
/// presentation path, not the inverse of [parse_keys].
pub fn keys_to_string(keys: &[KeySymbol]) -> String {
    keys.iter().map(ToString::to_string).collect()
}

#[cfg(feature = "crossterm")]
impl From<crossterm::event::KeyCode> for Key {
    fn from(code: crossterm::event::KeyCode) -> Self {
        use crossterm::event::{KeyCode, ModifierKeyCode};

        match code {
            KeyCode::Char(' ') => Key::Space,
            KeyCode::Char(c) => Key::Char(c),
            KeyCode::F(n) => Key::F(n),
            KeyCode::Enter => Key::Return,
            KeyCode::Esc => Key::Escape,
            KeyCode::Tab | KeyCode::BackTab => Key::Tab,
            KeyCode::Backspace => Key::Backspace,
            KeyCode::Delete => Key::Delete,
            KeyCode::Insert => Key::Insert,
            KeyCode::Home => Key::Home,
            KeyCode::End => Key::End,
            KeyCode::PageUp => Key::PageUp,
            KeyCode::PageDown => Key::PageDown,
            KeyCode::Up => Key::Up,
            KeyCode::Down => Key::Down,
            KeyCode::Left => Key::Left,
            KeyCode::Right => Key::Right,
            KeyCode::Modifier(mk) => match mk {
                ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => Key::Shift,
                ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => Key::Control,
                ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => Key::Alt,
                _ => Key::Null,
            },
            _ => Key::Null,
        }
    }
}

#[cfg(feature = "crossterm")]
impl From<crossterm::event::KeyEvent> for KeySymbol {
    fn from(ev: crossterm::event::KeyEvent) -> Self {
        use crossterm::event::KeyCode;

        let mut modifiers = KeyModifiers::NONE;

        if ev.modifiers.contains(crossterm::event::KeyModifiers::CONTROL) {
            modifiers |= KeyModifiers::CONTROL;
        }

        if ev.modifiers.contains(crossterm::event::KeyModifiers::SHIFT) {
            modifiers |= KeyModifiers::SHIFT;
        }

        if ev.modifiers.contains(crossterm::event::KeyModifiers::ALT) {
            modifiers |= KeyModifiers::ALT;
        }

        if let KeyCode::BackTab = ev.code {
            modifiers |= KeyModifiers::SHIFT;
        }

        KeySymbol::new(Key::from(ev.code), modifiers)
    }
}

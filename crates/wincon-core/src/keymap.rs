#![forbid(unsafe_code)]

//! Ordered key translation table.
//!
//! Each entry documents a case where the console's raw key delivery differs
//! from what an ANSI-style consumer expects. The table is consulted in
//! declared order with first-match-wins semantics: some rules are more
//! specific supersets of others, so this is ordered pattern matching, not a
//! keyed lookup.

use crate::event::{
    KeyEventRecord, Modifiers, VK_DELETE, VK_DOWN, VK_END, VK_HOME, VK_LEFT, VK_RETURN, VK_RIGHT,
    VK_TAB, VK_UP,
};

/// Matcher over the optional fields of a key event.
///
/// A field left as `None` is ignored; at least one field must be specified
/// for a pattern to be meaningful. A specified `modifiers` field requires
/// exact set equality, so `Some(Modifiers::NONE)` matches only unmodified
/// keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPattern {
    /// Exact modifier set, when specified.
    pub modifiers: Option<Modifiers>,
    /// Virtual key code, when specified.
    pub virtual_key_code: Option<u16>,
    /// Character code, when specified.
    pub char_code: Option<u32>,
}

impl KeyPattern {
    /// Whether this pattern matches the record; all specified fields must
    /// match simultaneously.
    #[must_use]
    pub const fn matches(&self, record: &KeyEventRecord) -> bool {
        let modifiers_match = match self.modifiers {
            Some(modifiers) => modifiers.bits() == record.modifiers().bits(),
            None => true,
        };
        let key_code_match = match self.virtual_key_code {
            Some(virtual_key_code) => virtual_key_code == record.virtual_key_code,
            None => true,
        };
        let char_code_match = match self.char_code {
            Some(char_code) => char_code == record.char_code,
            None => true,
        };
        modifiers_match && key_code_match && char_code_match
    }
}

/// One translation rule: a pattern and the bytes it emits.
#[derive(Debug, Clone, Copy)]
pub struct KeyBinding {
    /// The matcher.
    pub pattern: KeyPattern,
    /// Output bytes emitted verbatim when the pattern matches.
    pub bytes: &'static [u8],
}

const fn bind(pattern: KeyPattern, bytes: &'static [u8]) -> KeyBinding {
    KeyBinding { pattern, bytes }
}

const fn chord(modifiers: Modifiers, virtual_key_code: u16) -> KeyPattern {
    KeyPattern {
        modifiers: Some(modifiers),
        virtual_key_code: Some(virtual_key_code),
        char_code: None,
    }
}

/// The default translation table, immutable after construction.
///
/// Earlier entries supersede later ones and the generic character emission
/// that runs when no entry matches.
pub const DEFAULT_KEY_MAP: &[KeyBinding] = &[
    // Ctrl+Enter and Shift+Enter arrive as a plain CR record; deliver them
    // as Meta+Enter.
    bind(chord(Modifiers::CTRL, VK_RETURN), b"\x1b\r"),
    bind(chord(Modifiers::SHIFT, VK_RETURN), b"\x1b\r"),
    // Ctrl+Space is delivered as Meta+Space.
    bind(
        KeyPattern {
            modifiers: Some(Modifiers::CTRL),
            virtual_key_code: None,
            char_code: Some(0x20),
        },
        b"\x1b ",
    ),
    // Emulate the legacy getwch() two-byte sequences for navigation keys.
    bind(chord(Modifiers::NONE, VK_UP), &[0, 72]),
    bind(chord(Modifiers::NONE, VK_DOWN), &[0, 80]),
    bind(chord(Modifiers::NONE, VK_RIGHT), &[0, 77]),
    bind(chord(Modifiers::NONE, VK_LEFT), &[0, 75]),
    bind(chord(Modifiers::NONE, VK_DELETE), &[0, 83]),
    bind(chord(Modifiers::NONE, VK_HOME), &[0, 71]),
    bind(chord(Modifiers::NONE, VK_END), &[0, 79]),
    // Emulate the ANSI back-tab sequence.
    bind(chord(Modifiers::SHIFT, VK_TAB), b"\x1b[Z"),
];

/// Output bytes of the first rule in [`DEFAULT_KEY_MAP`] matching `record`.
#[must_use]
pub fn lookup(record: &KeyEventRecord) -> Option<&'static [u8]> {
    DEFAULT_KEY_MAP
        .iter()
        .find(|binding| binding.pattern.matches(record))
        .map(|binding| binding.bytes)
}

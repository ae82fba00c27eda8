#![forbid(unsafe_code)]

//! Native key event records and modifier state.
//!
//! A [`KeyEventRecord`] is one keyboard record as the console delivers it:
//! a virtual key code, a UTF-16 code unit (or 0), and a bitmask of modifier
//! flags. Modifier flags collapse into [`Modifiers`] so that rule matching
//! does not care which side of the keyboard a key was pressed on.

use bitflags::bitflags;

// ── Control key state bits ───────────────────────────────────────────────

/// Right Alt was held.
pub const RIGHT_ALT_PRESSED: u32 = 0x0001;
/// Left Alt was held.
pub const LEFT_ALT_PRESSED: u32 = 0x0002;
/// Right Ctrl was held.
pub const RIGHT_CTRL_PRESSED: u32 = 0x0004;
/// Left Ctrl was held.
pub const LEFT_CTRL_PRESSED: u32 = 0x0008;
/// Either Shift was held.
pub const SHIFT_PRESSED: u32 = 0x0010;
/// Num Lock was on.
pub const NUMLOCK_ON: u32 = 0x0020;
/// Scroll Lock was on.
pub const SCROLLLOCK_ON: u32 = 0x0040;
/// Caps Lock was on.
pub const CAPSLOCK_ON: u32 = 0x0080;
/// The key is an "enhanced" key (cursor block, numpad slash, ...).
pub const ENHANCED_KEY: u32 = 0x0100;

// ── Virtual key codes ────────────────────────────────────────────────────

/// Tab key.
pub const VK_TAB: u16 = 0x09;
/// Enter/Return key.
pub const VK_RETURN: u16 = 0x0D;
/// End key.
pub const VK_END: u16 = 0x23;
/// Home key.
pub const VK_HOME: u16 = 0x24;
/// Left arrow key.
pub const VK_LEFT: u16 = 0x25;
/// Up arrow key.
pub const VK_UP: u16 = 0x26;
/// Right arrow key.
pub const VK_RIGHT: u16 = 0x27;
/// Down arrow key.
pub const VK_DOWN: u16 = 0x28;
/// Delete key.
pub const VK_DELETE: u16 = 0x2E;

bitflags! {
    /// Modifier keys held during a key event.
    ///
    /// Left/right variants of Alt and Ctrl collapse into a single flag each.
    /// Lock-state bits (caps, num, scroll) are not modifiers and are ignored.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        /// Alt key (either side).
        const ALT = 1 << 0;
        /// Ctrl key (either side).
        const CTRL = 1 << 1;
        /// Shift key.
        const SHIFT = 1 << 2;
    }
}

impl Modifiers {
    /// No modifiers held.
    pub const NONE: Self = Self::empty();

    /// Derive modifier flags from a native control-key-state bitmask.
    #[must_use]
    pub const fn from_control_key_state(state: u32) -> Self {
        let mut modifiers = Self::empty();
        if state & (LEFT_ALT_PRESSED | RIGHT_ALT_PRESSED) != 0 {
            modifiers = modifiers.union(Self::ALT);
        }
        if state & (LEFT_CTRL_PRESSED | RIGHT_CTRL_PRESSED) != 0 {
            modifiers = modifiers.union(Self::CTRL);
        }
        if state & SHIFT_PRESSED != 0 {
            modifiers = modifiers.union(Self::SHIFT);
        }
        modifiers
    }
}

impl Default for Modifiers {
    fn default() -> Self {
        Self::NONE
    }
}

/// One native keyboard record.
///
/// Constructed per incoming record, consumed synchronously by the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEventRecord {
    /// Platform key identifier.
    pub virtual_key_code: u16,
    /// UTF-16 code unit on arrival (0 for pure modifier chords). After
    /// surrogate reassembly this may hold a combined scalar value, which is
    /// why the field is wider than a single code unit.
    pub char_code: u32,
    /// Raw modifier bitmask as delivered by the console.
    pub control_key_state: u32,
}

impl KeyEventRecord {
    /// Create a record from the native fields.
    #[must_use]
    pub const fn new(virtual_key_code: u16, char_code: u32, control_key_state: u32) -> Self {
        Self {
            virtual_key_code,
            char_code,
            control_key_state,
        }
    }

    /// Modifier keys held during this event.
    #[must_use]
    pub const fn modifiers(&self) -> Modifiers {
        Modifiers::from_control_key_state(self.control_key_state)
    }

    /// Whether the enhanced-key flag was set.
    #[must_use]
    pub const fn enhanced(&self) -> bool {
        self.control_key_state & ENHANCED_KEY != 0
    }

    /// The character carried by this record, if `char_code` is a valid
    /// Unicode scalar value.
    #[must_use]
    pub fn char(&self) -> Option<char> {
        char::from_u32(self.char_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_collapse_left_and_right() {
        assert_eq!(
            Modifiers::from_control_key_state(LEFT_ALT_PRESSED),
            Modifiers::ALT
        );
        assert_eq!(
            Modifiers::from_control_key_state(RIGHT_ALT_PRESSED),
            Modifiers::ALT
        );
        assert_eq!(
            Modifiers::from_control_key_state(LEFT_CTRL_PRESSED | RIGHT_CTRL_PRESSED),
            Modifiers::CTRL
        );
    }

    #[test]
    fn lock_bits_are_not_modifiers() {
        let state = CAPSLOCK_ON | NUMLOCK_ON | SCROLLLOCK_ON;
        assert_eq!(Modifiers::from_control_key_state(state), Modifiers::NONE);
    }

    #[test]
    fn combined_chord() {
        let state = LEFT_CTRL_PRESSED | SHIFT_PRESSED;
        assert_eq!(
            Modifiers::from_control_key_state(state),
            Modifiers::CTRL | Modifiers::SHIFT
        );
    }

    #[test]
    fn enhanced_flag() {
        let record = KeyEventRecord::new(VK_DELETE, 0, ENHANCED_KEY);
        assert!(record.enhanced());
        assert_eq!(record.modifiers(), Modifiers::NONE);

        let record = KeyEventRecord::new(VK_DELETE, 0, 0);
        assert!(!record.enhanced());
    }

    #[test]
    fn char_of_record() {
        assert_eq!(KeyEventRecord::new(0x41, 0x41, 0).char(), Some('A'));
        // Unpaired surrogate values are not scalar values.
        assert_eq!(KeyEventRecord::new(0, 0xD800, 0).char(), None);
    }
}

#![forbid(unsafe_code)]

//! Key event decoder with surrogate-pair reassembly.
//!
//! [`decode`] is a pure function of `(record, state)`: the only memory it
//! keeps across calls is the [`SurrogateState`] threaded in by the caller,
//! holding at most one pending high surrogate. Surrogate handling runs
//! strictly before table lookup; combined code points never appear as raw
//! `char_code` values in the translation table.

use crate::event::{KeyEventRecord, Modifiers};
use crate::keymap;

const HIGH_SURROGATE_FIRST: u32 = 0xD800;
const HIGH_SURROGATE_LAST: u32 = 0xDBFF;
const LOW_SURROGATE_FIRST: u32 = 0xDC00;
const LOW_SURROGATE_LAST: u32 = 0xDFFF;

/// Decoder memory across calls: at most one pending high surrogate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SurrogateState {
    /// No surrogate pending.
    #[default]
    Idle,
    /// A high surrogate waiting for its low half.
    HighSurrogate(u16),
}

/// Combine a surrogate pair into a scalar value.
#[must_use]
const fn combine_surrogates(high: u16, low: u32) -> u32 {
    0x10000 + (high as u32 - HIGH_SURROGATE_FIRST) * 0x400 + (low - LOW_SURROGATE_FIRST)
}

/// Decode one native key record into zero or more output bytes.
///
/// - A high surrogate is held in `state` and emits nothing; a newer high
///   surrogate replaces any held one.
/// - A low surrogate combines with the held high surrogate, or is dropped
///   when none is pending.
/// - Any other record discards a pending high surrogate.
/// - The (possibly combined) record is then checked against the translation
///   table; on a match the rule's bytes are emitted verbatim.
/// - A chord with no character payload produces nothing.
/// - Alt without Ctrl prepends ESC ("Meta sends ESC"), then the character
///   is emitted as UTF-8.
pub fn decode(record: &KeyEventRecord, state: &mut SurrogateState) -> Vec<u8> {
    let mut record = *record;
    match record.char_code {
        HIGH_SURROGATE_FIRST..=HIGH_SURROGATE_LAST => {
            *state = SurrogateState::HighSurrogate(record.char_code as u16);
            return Vec::new();
        }
        LOW_SURROGATE_FIRST..=LOW_SURROGATE_LAST => {
            let SurrogateState::HighSurrogate(high) = *state else {
                // Low surrogate with no pending high half; the console
                // routinely emits such partial events.
                return Vec::new();
            };
            *state = SurrogateState::Idle;
            record.char_code = combine_surrogates(high, record.char_code);
        }
        _ => {
            // An orphaned high surrogate is silently dropped.
            *state = SurrogateState::Idle;
        }
    }

    if let Some(bytes) = keymap::lookup(&record) {
        return bytes.to_vec();
    }

    let modifiers = record.modifiers();
    if record.char_code == 0 && !modifiers.is_empty() {
        // Pure modifier chord, no printable character.
        return Vec::new();
    }

    let Some(ch) = record.char() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(5);
    if modifiers.contains(Modifiers::ALT) && !modifiers.contains(Modifiers::CTRL) {
        // Meta sends ESC.
        out.push(0x1B);
    }
    let mut utf8 = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut utf8).as_bytes());
    out
}

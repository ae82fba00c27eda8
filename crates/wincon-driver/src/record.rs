#![forbid(unsafe_code)]

//! Raw input record parsing.
//!
//! The native console delivers fixed-layout 20-byte records. Parsing is a
//! single function over literal byte buffers, isolated from the polling
//! loop so it can be unit-tested without a live console.
//!
//! Little-endian layout of one record:
//!
//! | Offset | Width | Field                |
//! |--------|-------|----------------------|
//! | 0      | 2     | event type           |
//! | 4      | 4     | key down (bool)      |
//! | 8      | 2     | repeat count         |
//! | 10     | 2     | virtual key code     |
//! | 12     | 2     | virtual scan code    |
//! | 14     | 2     | UTF-16 code unit     |
//! | 16     | 4     | control key state    |
//!
//! Bytes 2..4 pad the event-type discriminant to the union alignment.

use wincon_core::event::KeyEventRecord;

/// Size of one raw input record in bytes.
pub const RECORD_LEN: usize = 20;

/// Event-type discriminant for keyboard records.
pub const KEY_EVENT: u16 = 0x0001;
/// Event-type discriminant for window resize records.
pub const WINDOW_BUFFER_SIZE_EVENT: u16 = 0x0004;

/// A keyboard record with its transition and repeat metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyInput {
    /// `true` for a key-down transition; key-up records are ignored by the
    /// pump.
    pub key_down: bool,
    /// Native auto-repeat count.
    pub repeat_count: u16,
    /// Hardware scan code.
    pub virtual_scan_code: u16,
    /// The fields the decoder consumes.
    pub record: KeyEventRecord,
}

/// One classified input record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputRecord {
    /// A keyboard record.
    Key(KeyInput),
    /// The console window was resized.
    WindowBufferSize,
    /// A record type the driver does not handle (mouse, focus, menu).
    Unknown(u16),
}

/// Parse one raw record from the front of `bytes`.
///
/// Returns `None` when fewer than [`RECORD_LEN`] bytes are available.
#[must_use]
pub fn parse_record(bytes: &[u8]) -> Option<InputRecord> {
    if bytes.len() < RECORD_LEN {
        return None;
    }

    let event_type = u16::from_le_bytes([bytes[0], bytes[1]]);
    match event_type {
        KEY_EVENT => {
            let key_down = i32::from_le_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) != 0;
            let repeat_count = u16::from_le_bytes([bytes[8], bytes[9]]);
            let virtual_key_code = u16::from_le_bytes([bytes[10], bytes[11]]);
            let virtual_scan_code = u16::from_le_bytes([bytes[12], bytes[13]]);
            let char_code = u16::from_le_bytes([bytes[14], bytes[15]]);
            let control_key_state =
                u32::from_le_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
            Some(InputRecord::Key(KeyInput {
                key_down,
                repeat_count,
                virtual_scan_code,
                record: KeyEventRecord::new(virtual_key_code, char_code as u32, control_key_state),
            }))
        }
        WINDOW_BUFFER_SIZE_EVENT => Some(InputRecord::WindowBufferSize),
        other => Some(InputRecord::Unknown(other)),
    }
}

/// Build a raw key record from its fields, for scripted-console tests.
#[cfg(any(test, feature = "test-helpers"))]
#[must_use]
pub fn encode_key_record(
    key_down: bool,
    virtual_key_code: u16,
    char_code: u16,
    control_key_state: u32,
) -> [u8; RECORD_LEN] {
    let mut bytes = [0u8; RECORD_LEN];
    bytes[0..2].copy_from_slice(&KEY_EVENT.to_le_bytes());
    bytes[4..8].copy_from_slice(&i32::from(key_down).to_le_bytes());
    bytes[8..10].copy_from_slice(&1u16.to_le_bytes());
    bytes[10..12].copy_from_slice(&virtual_key_code.to_le_bytes());
    bytes[14..16].copy_from_slice(&char_code.to_le_bytes());
    bytes[16..20].copy_from_slice(&control_key_state.to_le_bytes());
    bytes
}

/// Build a raw resize record, for scripted-console tests.
#[cfg(any(test, feature = "test-helpers"))]
#[must_use]
pub fn encode_resize_record() -> [u8; RECORD_LEN] {
    let mut bytes = [0u8; RECORD_LEN];
    bytes[0..2].copy_from_slice(&WINDOW_BUFFER_SIZE_EVENT.to_le_bytes());
    bytes
}

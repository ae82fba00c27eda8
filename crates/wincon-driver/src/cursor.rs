#![forbid(unsafe_code)]

//! Cursor-position discovery over the emulated byte stream.
//!
//! This console has no direct call for the cursor position, so the ANSI
//! convention is round-tripped through the driver itself: write `ESC[6n`,
//! then read bytes back until the `ESC [ <row> ; <col> R` report appears.
//! Bytes that do not belong to the report are pushed back so later ordinary
//! reads are unaffected.
//!
//! The response places row before column; the API returns `(col, row)`,
//! both zero-based.

use std::time::{Duration, Instant};

use wincon_core::trace;

use crate::console::Console;
use crate::driver::ConsoleDriver;

/// The ANSI cursor-position request, `ESC[6n`.
pub const CURSOR_POSITION_QUERY: &[u8] = b"\x1b[6n";

/// A cursor position report located inside a byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CursorReport {
    /// 1-based row from the report.
    pub row: u16,
    /// 1-based column from the report.
    pub col: u16,
    /// Start of the matched `ESC [ row ; col R` segment.
    pub start: usize,
    /// End of the matched segment (exclusive; equals the buffer length).
    pub end: usize,
}

/// Scan `buf` for a report whose final `R` is the last byte.
///
/// The response accumulates byte by byte, so anchoring the scan at the tail
/// finds the report the moment it completes while leaving unrelated leading
/// bytes untouched.
#[must_use]
pub fn match_cursor_report(buf: &[u8]) -> Option<CursorReport> {
    if buf.last() != Some(&b'R') {
        return None;
    }
    let end = buf.len();

    let col_end = end - 1;
    let col_start = digits_start(buf, col_end);
    if col_start == col_end || buf.get(col_start.checked_sub(1)?) != Some(&b';') {
        return None;
    }

    let row_end = col_start - 1;
    let row_start = digits_start(buf, row_end);
    if row_start == row_end || row_start < 2 {
        return None;
    }
    if buf[row_start - 2] != 0x1B || buf[row_start - 1] != b'[' {
        return None;
    }

    Some(CursorReport {
        row: parse_digits(&buf[row_start..row_end])?,
        col: parse_digits(&buf[col_start..col_end])?,
        start: row_start - 2,
        end,
    })
}

/// Index of the first byte of the digit run ending just before `end`.
fn digits_start(buf: &[u8], end: usize) -> usize {
    let mut start = end;
    while start > 0 && buf[start - 1].is_ascii_digit() {
        start -= 1;
    }
    start
}

fn parse_digits(digits: &[u8]) -> Option<u16> {
    std::str::from_utf8(digits).ok()?.parse().ok()
}

impl<C: Console> ConsoleDriver<C> {
    /// Discover the cursor position via the `ESC[6n` round trip.
    ///
    /// Returns zero-based `(col, row)`, or `None` when no report arrived
    /// before `timeout`, or when either channel is not an interactive
    /// terminal. The input channel is switched to raw mode for the duration
    /// of the round trip.
    pub fn cursor_position(&mut self, timeout: Duration) -> Option<(u16, u16)> {
        if !self.console.is_input_tty() || !self.console.is_output_tty() {
            return None;
        }
        let raw = self.console.set_raw_mode(true).is_ok();
        let position = self.cursor_position_round_trip(timeout);
        if raw {
            let _ = self.console.set_raw_mode(false);
        }
        position
    }

    /// Like [`cursor_position`](Self::cursor_position) with a half-second
    /// timeout, assuming the origin when the query fails.
    pub fn cursor_position_or_origin(&mut self) -> (u16, u16) {
        self.cursor_position(Duration::from_millis(500))
            .unwrap_or((0, 0))
    }

    fn cursor_position_round_trip(&mut self, timeout: Duration) -> Option<(u16, u16)> {
        self.console.write(CURSOR_POSITION_QUERY).ok()?;
        self.console.flush().ok()?;

        let deadline = Instant::now() + timeout;
        let mut buf: Vec<u8> = Vec::new();
        let mut report = None;
        loop {
            let now = Instant::now();
            if now >= deadline {
                trace!("cursor position query timed out");
                break;
            }
            let Some(byte) = self.read_byte(deadline - now) else {
                break;
            };
            buf.push(byte);
            if let Some(matched) = match_cursor_report(&buf) {
                // Keep the surrounding bytes, drop the report itself.
                buf.drain(matched.start..matched.end);
                report = Some(matched);
                break;
            }
        }

        // Push back in reverse order so a later read sees the original
        // sequence.
        for &byte in buf.iter().rev() {
            self.unread_byte(byte);
        }

        let matched = report?;
        Some((
            matched.col.saturating_sub(1),
            matched.row.saturating_sub(1),
        ))
    }
}

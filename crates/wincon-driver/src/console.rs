#![forbid(unsafe_code)]

//! The native console seam.
//!
//! [`Console`] abstracts the handful of native calls the driver needs:
//! waiting on the input handle, reading raw event records, mode and window
//! queries, and a byte-oriented output channel with a raw-mode toggle. The
//! production implementation wraps the platform's console API; tests use
//! [`ScriptedConsole`].
//!
//! Every method is assumed cheap and non-reentrant; the driver calls them
//! from a single thread.

use std::io;
use std::time::Duration;

// ── Console mode bits ────────────────────────────────────────────────────

/// Output wraps at end of line.
pub const ENABLE_WRAP_AT_EOL_OUTPUT: u32 = 0x0002;
/// The console interprets VT escape sequences itself.
pub const ENABLE_VIRTUAL_TERMINAL_PROCESSING: u32 = 0x0004;

/// Interface to the native console.
pub trait Console {
    /// Block on the input handle until data is ready or `timeout` elapses.
    /// Returns `true` when the handle was signaled.
    fn wait_for_input(&mut self, timeout: Duration) -> io::Result<bool>;

    /// Number of unread records in the console's event queue.
    fn queued_event_count(&mut self) -> io::Result<u32>;

    /// Read raw records into `buf` (a multiple of
    /// [`RECORD_LEN`](crate::record::RECORD_LEN) bytes long); returns the
    /// number of records read.
    fn read_events(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Current console mode bits.
    fn console_mode(&mut self) -> io::Result<u32>;

    /// Re-acquire the output handle. Handles can go stale after certain
    /// native console operations; the driver retries a failed mode query
    /// once after calling this.
    fn refresh_output_handle(&mut self) -> io::Result<()>;

    /// Window size as `(rows, cols)`.
    fn window_size(&mut self) -> io::Result<(u16, u16)>;

    /// Whether the input channel is an interactive terminal.
    fn is_input_tty(&self) -> bool;

    /// Whether the output channel is an interactive terminal.
    fn is_output_tty(&self) -> bool;

    /// Write bytes to the output channel.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Flush the output channel.
    fn flush(&mut self) -> io::Result<()>;

    /// Toggle raw (unbuffered, unechoed) delivery on the input channel.
    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()>;
}

// ── Scripted console for tests ───────────────────────────────────────────

/// In-memory [`Console`] driven by queued scripts.
///
/// Waits and mode queries pop scripted results; event reads drain queued
/// record batches. Output bytes and raw-mode toggles are recorded so tests
/// can assert on the exact wire traffic.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    waits: std::collections::VecDeque<bool>,
    batches: std::collections::VecDeque<Vec<u8>>,
    mode_results: std::collections::VecDeque<io::Result<u32>>,
    size: Option<(u16, u16)>,
    not_a_tty: bool,
    output_not_a_tty: bool,
    /// Bytes written to the output channel.
    pub written: Vec<u8>,
    /// Raw-mode toggles in call order.
    pub raw_mode_changes: Vec<bool>,
    /// Number of output-handle refreshes.
    pub refreshes: usize,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ScriptedConsole {
    /// A console that is a tty on both channels and has no pending input.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the result of the next `wait_for_input` call. Unscripted
    /// waits report `true` while record batches remain, `false` after.
    pub fn push_wait(&mut self, signaled: bool) {
        self.waits.push_back(signaled);
    }

    /// Queue a batch of raw record bytes for one `read_events` call.
    pub fn push_batch(&mut self, records: impl Into<Vec<u8>>) {
        self.batches.push_back(records.into());
    }

    /// Script the result of the next `console_mode` call. Unscripted calls
    /// report VT processing enabled.
    pub fn push_mode(&mut self, result: io::Result<u32>) {
        self.mode_results.push_back(result);
    }

    /// Set the reported window size; `None` makes the query fail.
    pub fn set_window_size(&mut self, size: Option<(u16, u16)>) {
        self.size = size;
    }

    /// Mark the input channel as not a terminal.
    pub fn set_input_not_tty(&mut self) {
        self.not_a_tty = true;
    }

    /// Mark the output channel as not a terminal.
    pub fn set_output_not_tty(&mut self) {
        self.output_not_a_tty = true;
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl Console for ScriptedConsole {
    fn wait_for_input(&mut self, _timeout: Duration) -> io::Result<bool> {
        match self.waits.pop_front() {
            Some(signaled) => Ok(signaled),
            None => Ok(!self.batches.is_empty()),
        }
    }

    fn queued_event_count(&mut self) -> io::Result<u32> {
        let records = self
            .batches
            .front()
            .map_or(0, |batch| batch.len() / crate::record::RECORD_LEN);
        Ok(records as u32)
    }

    fn read_events(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(mut batch) = self.batches.pop_front() else {
            return Ok(0);
        };
        let capacity = (buf.len() / crate::record::RECORD_LEN) * crate::record::RECORD_LEN;
        if batch.len() > capacity {
            // Leave what does not fit for the next read.
            let rest = batch.split_off(capacity);
            self.batches.push_front(rest);
        }
        buf[..batch.len()].copy_from_slice(&batch);
        Ok(batch.len() / crate::record::RECORD_LEN)
    }

    fn console_mode(&mut self) -> io::Result<u32> {
        self.mode_results
            .pop_front()
            .unwrap_or(Ok(ENABLE_WRAP_AT_EOL_OUTPUT | ENABLE_VIRTUAL_TERMINAL_PROCESSING))
    }

    fn refresh_output_handle(&mut self) -> io::Result<()> {
        self.refreshes += 1;
        Ok(())
    }

    fn window_size(&mut self) -> io::Result<(u16, u16)> {
        self.size
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotConnected, "no console window"))
    }

    fn is_input_tty(&self) -> bool {
        !self.not_a_tty
    }

    fn is_output_tty(&self) -> bool {
        !self.output_not_a_tty
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.written.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()> {
        self.raw_mode_changes.push(raw);
        Ok(())
    }
}

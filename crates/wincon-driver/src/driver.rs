#![forbid(unsafe_code)]

//! The event pump and the byte-level facade consumed by the line editor.
//!
//! [`ConsoleDriver`] owns the decoded-byte queue, the surrogate state, and
//! the registered callbacks. All polling, decoding, and queueing happen on
//! the calling thread; the registered yield hook runs once per bounded wait
//! slice so process-level signal handling stays responsive even while
//! blocked.
//!
//! Failure semantics inside the pump: a native call that fails or reports
//! no data is treated as an empty read for that tick, never surfaced. The
//! poll is best-effort within its timeout.

use std::io;
use std::time::{Duration, Instant};

use wincon_core::decode::{SurrogateState, decode};
use wincon_core::queue::InputQueue;
use wincon_core::trace;

use crate::console::{Console, ENABLE_VIRTUAL_TERMINAL_PROCESSING};
use crate::record::{InputRecord, RECORD_LEN, parse_record};

/// Bounded native wait per pump iteration, so the yield hook keeps running
/// while blocked.
const WAIT_SLICE: Duration = Duration::from_millis(100);

/// Records read per native read call.
const READ_BATCH: usize = 80;

/// Screen size reported when neither the OS nor the environment knows
/// better: `(rows, cols)`.
pub const DEFAULT_SCREEN_SIZE: (u16, u16) = (24, 80);

/// Callback invoked synchronously on a resize record.
pub type WinchHandler = Box<dyn FnMut()>;

/// Hook invoked once per wait slice to let external signal handling run.
pub type YieldHook = Box<dyn FnMut()>;

/// Console input driver: event pump, byte queue, and screen queries.
pub struct ConsoleDriver<C: Console> {
    pub(crate) console: C,
    pub(crate) queue: InputQueue,
    surrogate: SurrogateState,
    winch_handler: Option<WinchHandler>,
    yield_hook: Option<YieldHook>,
}

impl<C: Console> ConsoleDriver<C> {
    /// Create a driver over a native console.
    pub fn new(console: C) -> Self {
        Self {
            console,
            queue: InputQueue::new(),
            surrogate: SurrogateState::Idle,
            winch_handler: None,
            yield_hook: None,
        }
    }

    /// The underlying console.
    pub fn console(&self) -> &C {
        &self.console
    }

    /// The underlying console, mutably.
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Register the resize callback, replacing any previous one.
    pub fn register_winch_handler(&mut self, handler: impl FnMut() + 'static) {
        self.winch_handler = Some(Box::new(handler));
    }

    /// Register the cooperative yield hook, replacing any previous one.
    pub fn register_yield_hook(&mut self, hook: impl FnMut() + 'static) {
        self.yield_hook = Some(Box::new(hook));
    }

    // ── Event pump ───────────────────────────────────────────────────────

    /// Drain the console's event queue until at least one byte has been
    /// queued or `timeout` elapses.
    ///
    /// Resize records invoke the winch handler synchronously, in record
    /// order relative to key records of the same batch. Only key-down
    /// transitions are decoded; key-up transitions are ignored entirely.
    pub fn poll_input(&mut self, timeout: Duration) {
        let start = Instant::now();
        while self.queue.is_empty() {
            if let Some(hook) = self.yield_hook.as_mut() {
                hook();
            }
            match self.console.wait_for_input(WAIT_SLICE) {
                Ok(true) => {}
                Ok(false) | Err(_) => {
                    if start.elapsed() >= timeout {
                        return;
                    }
                    continue;
                }
            }
            match self.console.queued_event_count() {
                Ok(0) | Err(_) => continue,
                Ok(_) => {}
            }
            let mut buf = [0u8; RECORD_LEN * READ_BATCH];
            let read = match self.console.read_events(&mut buf) {
                Ok(read) => read,
                Err(_) => {
                    trace!("read_events failed; treating as an empty read");
                    continue;
                }
            };
            for chunk in buf.chunks_exact(RECORD_LEN).take(read) {
                match parse_record(chunk) {
                    Some(InputRecord::WindowBufferSize) => {
                        if let Some(handler) = self.winch_handler.as_mut() {
                            handler();
                        }
                    }
                    Some(InputRecord::Key(key)) if key.key_down => {
                        let bytes = decode(&key.record, &mut self.surrogate);
                        self.queue.extend(bytes);
                    }
                    _ => {}
                }
            }
        }
    }

    // ── Byte-level read primitives ───────────────────────────────────────

    /// Blocking byte read: polls when the queue is empty, then pops.
    ///
    /// Returns `None` when nothing became available within `timeout`.
    pub fn read_byte(&mut self, timeout: Duration) -> Option<u8> {
        if self.queue.is_empty() {
            self.poll_input(timeout);
        }
        self.queue.pop_front()
    }

    /// Return a previously read byte to the front of the queue.
    pub fn unread_byte(&mut self, byte: u8) {
        self.queue.push_front(byte);
    }

    /// Whether neither the queue nor the console holds pending input.
    pub fn buffer_is_empty(&mut self) -> bool {
        if !self.queue.is_empty() {
            return false;
        }
        matches!(self.console.queued_event_count(), Ok(0) | Err(_))
    }

    /// Heuristic paste detection: more input is already pending.
    pub fn in_pasting(&mut self) -> bool {
        !self.buffer_is_empty()
    }

    // ── Mode and geometry queries ────────────────────────────────────────

    /// Console mode bits, retrying once against a freshly re-acquired
    /// output handle when the first attempt fails.
    pub fn console_mode(&mut self) -> io::Result<u32> {
        match self.console.console_mode() {
            Ok(mode) => Ok(mode),
            Err(_) => {
                trace!("console mode query failed; refreshing output handle");
                self.console.refresh_output_handle()?;
                self.console.console_mode()
            }
        }
    }

    /// Whether the console interprets VT escape sequences itself.
    pub fn vt_enabled(&mut self) -> bool {
        self.console_mode()
            .map(|mode| mode & ENABLE_VIRTUAL_TERMINAL_PROCESSING != 0)
            .unwrap_or(false)
    }

    /// Whether this is a legacy console without VT processing.
    pub fn legacy_console(&mut self) -> bool {
        !self.vt_enabled()
    }

    /// Screen size as `(rows, cols)`.
    ///
    /// Falls back from the OS window query to the `LINES` / `COLUMNS`
    /// environment variables, then to [`DEFAULT_SCREEN_SIZE`]. OS errors
    /// fall through the same chain.
    pub fn screen_size(&mut self) -> (u16, u16) {
        match self.console.window_size() {
            Ok((rows, cols)) if rows > 0 && cols > 0 => (rows, cols),
            _ => fallback_screen_size(|name| std::env::var(name).ok()),
        }
    }

    /// Programmatic resizing is not supported on this console type.
    pub fn set_screen_size(&mut self, _rows: u16, _cols: u16) -> io::Result<()> {
        Err(io::Error::new(
            io::ErrorKind::Unsupported,
            "this console does not support programmatic resizing",
        ))
    }
}

/// Environment-variable screen size, or the hardcoded default.
///
/// Non-numeric and non-positive values count as unset.
fn fallback_screen_size(env: impl Fn(&str) -> Option<String>) -> (u16, u16) {
    let dimension = |name: &str| {
        env(name)?
            .trim()
            .parse::<i32>()
            .ok()
            .filter(|value| *value > 0)
            .map(|value| value as u16)
    };
    match (dimension("LINES"), dimension("COLUMNS")) {
        (Some(rows), Some(cols)) => (rows, cols),
        _ => DEFAULT_SCREEN_SIZE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    use wincon_core::event::{LEFT_ALT_PRESSED, VK_UP};

    use crate::console::ScriptedConsole;
    use crate::record::{encode_key_record, encode_resize_record};

    fn driver_with(console: ScriptedConsole) -> ConsoleDriver<ScriptedConsole> {
        ConsoleDriver::new(console)
    }

    fn drain(driver: &mut ConsoleDriver<ScriptedConsole>) -> Vec<u8> {
        let mut bytes = Vec::new();
        while let Some(byte) = driver.read_byte(Duration::ZERO) {
            bytes.push(byte);
        }
        bytes
    }

    #[test]
    fn key_down_records_produce_bytes_in_order() {
        let mut console = ScriptedConsole::new();
        let mut batch = Vec::new();
        batch.extend_from_slice(&encode_key_record(true, 0, b'h' as u16, 0));
        batch.extend_from_slice(&encode_key_record(true, 0, b'i' as u16, 0));
        console.push_batch(batch);

        let mut driver = driver_with(console);
        driver.poll_input(Duration::ZERO);
        assert_eq!(drain(&mut driver), b"hi");
    }

    #[test]
    fn key_up_records_are_ignored() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(false, 0, b'a' as u16, 0));
        let mut driver = driver_with(console);
        driver.poll_input(Duration::ZERO);
        assert!(driver.queue.is_empty());
    }

    #[test]
    fn resize_record_fires_winch_handler_once() {
        let mut console = ScriptedConsole::new();
        let mut batch = Vec::new();
        batch.extend_from_slice(&encode_key_record(true, 0, b'a' as u16, 0));
        batch.extend_from_slice(&encode_resize_record());
        batch.extend_from_slice(&encode_key_record(true, 0, b'b' as u16, 0));
        console.push_batch(batch);

        let mut driver = driver_with(console);
        let fired = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&fired);
        driver.register_winch_handler(move || counter.set(counter.get() + 1));

        driver.poll_input(Duration::ZERO);
        assert_eq!(fired.get(), 1);
        assert_eq!(drain(&mut driver), b"ab");
    }

    #[test]
    fn poll_returns_empty_on_timeout() {
        let mut driver = driver_with(ScriptedConsole::new());
        driver.poll_input(Duration::ZERO);
        assert!(driver.queue.is_empty());
    }

    #[test]
    fn yield_hook_runs_each_iteration() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, 0, b'a' as u16, 0));
        let mut driver = driver_with(console);

        let calls = Rc::new(Cell::new(0u32));
        let counter = Rc::clone(&calls);
        driver.register_yield_hook(move || counter.set(counter.get() + 1));

        driver.poll_input(Duration::ZERO);
        assert!(calls.get() >= 1);
    }

    #[test]
    fn signaled_wait_with_empty_queue_is_not_fatal() {
        let mut console = ScriptedConsole::new();
        // Signaled, but no records pending; the pump must fall back to the
        // timeout path instead of spinning.
        console.push_wait(true);
        let mut driver = driver_with(console);
        driver.poll_input(Duration::ZERO);
        assert!(driver.queue.is_empty());
    }

    #[test]
    fn surrogate_state_survives_across_polls() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, 0, 0xD83D, 0));
        console.push_batch(encode_key_record(true, 0, 0xDE00, 0));
        let mut driver = driver_with(console);
        // First poll holds the high surrogate and queues nothing by itself;
        // the loop continues into the second batch.
        driver.poll_input(Duration::ZERO);
        assert_eq!(drain(&mut driver), "\u{1F600}".as_bytes());
    }

    #[test]
    fn alt_key_produces_escape_prefixed_byte() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, 0x58, b'x' as u16, LEFT_ALT_PRESSED));
        let mut driver = driver_with(console);
        driver.poll_input(Duration::ZERO);
        assert_eq!(drain(&mut driver), b"\x1bx");
    }

    #[test]
    fn arrow_key_translates_through_table() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, VK_UP, 0, 0));
        let mut driver = driver_with(console);
        driver.poll_input(Duration::ZERO);
        assert_eq!(drain(&mut driver), [0, 72]);
    }

    #[test]
    fn read_byte_and_unread_byte_round_trip() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, 0, b'z' as u16, 0));
        let mut driver = driver_with(console);
        let byte = driver.read_byte(Duration::ZERO).unwrap();
        assert_eq!(byte, b'z');
        driver.unread_byte(byte);
        assert_eq!(driver.read_byte(Duration::ZERO), Some(b'z'));
        assert_eq!(driver.read_byte(Duration::ZERO), None);
    }

    #[test]
    fn buffer_is_empty_checks_queue_then_console() {
        let mut console = ScriptedConsole::new();
        console.push_batch(encode_key_record(true, 0, b'a' as u16, 0));
        let mut driver = driver_with(console);
        // Pending native input counts as non-empty before any poll.
        assert!(!driver.buffer_is_empty());
        assert!(driver.in_pasting());

        let _ = drain(&mut driver);
        assert!(driver.buffer_is_empty());
        assert!(!driver.in_pasting());
    }

    #[test]
    fn mode_query_retries_after_refreshing_handle() {
        let mut console = ScriptedConsole::new();
        console.push_mode(Err(io::Error::other("stale handle")));
        console.push_mode(Ok(ENABLE_VIRTUAL_TERMINAL_PROCESSING));
        let mut driver = driver_with(console);
        assert_eq!(
            driver.console_mode().unwrap(),
            ENABLE_VIRTUAL_TERMINAL_PROCESSING
        );
        assert_eq!(driver.console().refreshes, 1);
    }

    #[test]
    fn vt_detection_reads_the_mode_bit() {
        let mut console = ScriptedConsole::new();
        console.push_mode(Ok(0));
        let mut driver = driver_with(console);
        assert!(driver.legacy_console());

        driver.console_mut().push_mode(Ok(ENABLE_VIRTUAL_TERMINAL_PROCESSING));
        assert!(driver.vt_enabled());
    }

    #[test]
    fn screen_size_prefers_the_os_query() {
        let mut console = ScriptedConsole::new();
        console.set_window_size(Some((30, 90)));
        let mut driver = driver_with(console);
        assert_eq!(driver.screen_size(), (30, 90));
    }

    #[test]
    fn zero_os_size_falls_through_to_default() {
        let env = |_: &str| None;
        assert_eq!(fallback_screen_size(env), DEFAULT_SCREEN_SIZE);
    }

    #[test]
    fn env_variables_override_the_default() {
        let env = |name: &str| match name {
            "LINES" => Some("50".to_string()),
            "COLUMNS" => Some("132".to_string()),
            _ => None,
        };
        assert_eq!(fallback_screen_size(env), (50, 132));
    }

    #[test]
    fn non_positive_env_values_count_as_unset() {
        let env = |name: &str| match name {
            "LINES" => Some("0".to_string()),
            "COLUMNS" => Some("132".to_string()),
            _ => None,
        };
        assert_eq!(fallback_screen_size(env), DEFAULT_SCREEN_SIZE);

        let env = |name: &str| match name {
            "LINES" => Some("-3".to_string()),
            "COLUMNS" => Some("garbage".to_string()),
            _ => None,
        };
        assert_eq!(fallback_screen_size(env), DEFAULT_SCREEN_SIZE);
    }

    #[test]
    fn set_screen_size_is_unsupported() {
        let mut driver = driver_with(ScriptedConsole::new());
        let err = driver.set_screen_size(50, 120).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::Unsupported);
    }
}

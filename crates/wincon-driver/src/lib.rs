#![forbid(unsafe_code)]

//! Console input driver for event-record-based consoles.
//!
//! This crate presents a structured, non-ANSI console (one that delivers
//! discrete key-down/key-up/resize records instead of a raw escape-sequence
//! byte stream) as if it were a POSIX-style terminal, so a single line
//! editor can run on either kind of console.
//!
//! The pieces, leaf-first:
//!
//! - [`record`] — raw `INPUT_RECORD` layout and its single parsing function.
//! - [`console`] — the [`Console`] trait, the seam to the native layer.
//! - [`driver`] — the event pump and the byte-level facade the line editor
//!   consumes ([`ConsoleDriver`]).
//! - [`cursor`] — the `ESC[6n` cursor-position round trip.
//! - [`output`] — the ANSI cursor/screen output primitives.
//!
//! Everything runs on the calling thread: polling, decoding, and queueing
//! have no internal worker, and the only suspension points are the bounded
//! native wait inside the pump and the deadline loop of the cursor query.

pub mod console;
pub mod cursor;
pub mod driver;
pub mod output;
pub mod record;

pub use console::Console;
pub use driver::ConsoleDriver;

#![forbid(unsafe_code)]

//! Core: key event records, translation rules, and decoded-byte buffering.
//!
//! This crate is the pure half of the wincon console driver. It turns native
//! key event records (as delivered by a structured, non-ANSI console) into
//! the byte stream an ANSI-style line editor expects, without performing any
//! I/O itself. The I/O-facing event pump and queries live in `wincon-driver`.

pub mod decode;
pub mod event;
pub mod keymap;
pub mod logging;
pub mod queue;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{debug, trace, warn};

#![forbid(unsafe_code)]

//! ANSI output primitives.
//!
//! The handful of cursor/screen sequences the driver emits itself; the
//! line editor's renderer owns everything beyond these.

use std::io;

use crate::console::Console;
use crate::driver::ConsoleDriver;

const CURSOR_HIDE: &[u8] = b"\x1b[?25l";
const CURSOR_SHOW: &[u8] = b"\x1b[?25h";
const ERASE_AFTER_CURSOR: &[u8] = b"\x1b[K";
const CLEAR_SCREEN: &[u8] = b"\x1b[2J";
const CURSOR_HOME: &[u8] = b"\x1b[1;1H";

impl<C: Console> ConsoleDriver<C> {
    /// Move the cursor to `col` (0-based) on the current row.
    pub fn move_cursor_column(&mut self, col: u16) -> io::Result<()> {
        // CHA is 1-indexed.
        self.console
            .write(format!("\x1b[{}G", u32::from(col) + 1).as_bytes())
    }

    /// Move the cursor up `n` rows; negative values move down.
    pub fn move_cursor_up(&mut self, n: i16) -> io::Result<()> {
        if n > 0 {
            self.console.write(format!("\x1b[{n}A").as_bytes())
        } else if n < 0 {
            self.move_cursor_down(-n)
        } else {
            Ok(())
        }
    }

    /// Move the cursor down `n` rows; negative values move up.
    pub fn move_cursor_down(&mut self, n: i16) -> io::Result<()> {
        if n > 0 {
            self.console.write(format!("\x1b[{n}B").as_bytes())
        } else if n < 0 {
            self.move_cursor_up(-n)
        } else {
            Ok(())
        }
    }

    /// Hide the cursor.
    pub fn hide_cursor(&mut self) -> io::Result<()> {
        self.console.write(CURSOR_HIDE)
    }

    /// Show the cursor.
    pub fn show_cursor(&mut self) -> io::Result<()> {
        self.console.write(CURSOR_SHOW)
    }

    /// Erase from the cursor to the end of the line.
    pub fn erase_after_cursor(&mut self) -> io::Result<()> {
        self.console.write(ERASE_AFTER_CURSOR)
    }

    /// Scroll the view down `n` lines by emitting newlines.
    ///
    /// Only valid with the cursor at the bottom of the scroll range.
    pub fn scroll_down(&mut self, n: u16) -> io::Result<()> {
        if n == 0 {
            return Ok(());
        }
        self.console.write("\n".repeat(usize::from(n)).as_bytes())
    }

    /// Clear the screen and home the cursor.
    pub fn clear_screen(&mut self) -> io::Result<()> {
        self.console.write(CLEAR_SCREEN)?;
        self.console.write(CURSOR_HOME)
    }
}

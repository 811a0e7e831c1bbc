//! Tracks whether the alternate screen buffer is active and emits the
//! enter/leave sequences atomically through a shared writer.

use crate::output_writer::SharedWriter;
use core_cell::ansi;
use std::io::{self, Write};

/// At most one entry is active at a time; `enter`/`leave` are each
/// idempotent.
pub struct AlternateScreenBuffer {
    active: bool,
}

impl Default for AlternateScreenBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl AlternateScreenBuffer {
    pub fn new() -> Self {
        Self { active: false }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn enter<W: Write>(&mut self, writer: &SharedWriter<W>) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        writer.write_atomic(ansi::ALT_SCREEN_ENTER.as_bytes())?;
        writer.flush()?;
        self.active = true;
        Ok(())
    }

    pub fn leave<W: Write>(&mut self, writer: &SharedWriter<W>) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        writer.write_atomic(ansi::ALT_SCREEN_LEAVE.as_bytes())?;
        writer.flush()?;
        self.active = false;
        Ok(())
    }

    /// Fallback when the alternate screen isn't in use: clear the primary
    /// screen directly.
    pub fn clear_screen<W: Write>(&self, writer: &SharedWriter<W>) -> io::Result<()> {
        writer.write_atomic(ansi::CLEAR_SCREEN.as_bytes())?;
        writer.write_atomic(ansi::CURSOR_HOME.as_bytes())?;
        writer.flush()
    }
}

//! OS-level terminal queries: size detection (with the documented 80x24
//! fallback) and raw-mode control. Everything byte-level — cursor moves,
//! SGR, alternate screen — is owned by `core-cell`'s wire constants and the
//! crates that write through them; this crate only talks to the terminal
//! driver itself.

use anyhow::Result;

/// Default size assumed when the terminal size can't be determined (no
/// controlling TTY, as in a test harness or a redirected pipe).
pub const FALLBACK_COLS: u16 = 80;
pub const FALLBACK_ROWS: u16 = 24;

/// Query the terminal size `(cols, rows)`, falling back to 80x24 on any
/// error (no TTY attached, unsupported platform call, etc.) rather than
/// failing the caller.
pub fn terminal_size() -> (u16, u16) {
    crossterm::terminal::size().unwrap_or((FALLBACK_COLS, FALLBACK_ROWS))
}

/// RAII guard around `crossterm`'s raw mode: enables it on construction,
/// disables it on drop (including on an early return or panic unwind), so
/// callers don't have to remember to restore the terminal themselves.
pub struct RawModeGuard {
    active: bool,
}

impl RawModeGuard {
    pub fn enable() -> Result<Self> {
        crossterm::terminal::enable_raw_mode()?;
        Ok(Self { active: true })
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if self.active {
            let _ = crossterm::terminal::disable_raw_mode();
            self.active = false;
        }
    }
}

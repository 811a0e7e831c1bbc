//! Wire-level ANSI/VT control sequences emitted by the rendering core.
//!
//! Every byte sequence here is pinned to the exact form external interfaces
//! expect; changing one changes the bytes a consumer sees on the wire, so
//! these are kept in one place rather than inlined at call sites.

pub const ESC: &str = "\x1b";

pub const CURSOR_HIDE: &str = "\x1b[?25l";
pub const CURSOR_SHOW: &str = "\x1b[?25h";

pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CURSOR_HOME: &str = "\x1b[H";
pub const CLEAR_LINE: &str = "\x1b[2K";
pub const CURSOR_COLUMN_1: &str = "\x1b[G";

pub const SGR_RESET: &str = "\x1b[0m";

pub const AUTOWRAP_OFF: &str = "\x1b[?7l";
pub const AUTOWRAP_ON: &str = "\x1b[?7h";

pub const ALT_SCREEN_ENTER: &str = "\x1b[?1049h";
pub const ALT_SCREEN_LEAVE: &str = "\x1b[?1049l";

pub const FG_RESET: &str = "\x1b[39m";
pub const BG_RESET: &str = "\x1b[49m";

/// Move the cursor to a 1-based `(row, col)` position.
pub fn write_move_to(out: &mut String, row: u32, col: u32) {
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[{row};{col}H");
}

/// Move the cursor up `n` rows (no-op emitted for `n == 0`).
pub fn write_move_up(out: &mut String, n: u32) {
    if n == 0 {
        return;
    }
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[{n}A");
}

/// Move the cursor down `n` rows (no-op emitted for `n == 0`).
pub fn write_move_down(out: &mut String, n: u32) {
    if n == 0 {
        return;
    }
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[{n}B");
}

/// Scroll the screen contents up by `n` lines.
pub fn write_scroll_up(out: &mut String, n: u32) {
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[{n}S");
}

/// Scroll the screen contents down by `n` lines.
pub fn write_scroll_down(out: &mut String, n: u32) {
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[{n}T");
}

/// Foreground palette index, 256-color, or 24-bit truecolor sequence.
pub fn write_fg_indexed(out: &mut String, n: u8) {
    use std::fmt::Write;
    if n < 8 {
        let _ = write!(out, "{ESC}[3{n}m");
    } else if n < 16 {
        let _ = write!(out, "{ESC}[9{}m", n - 8);
    } else {
        let _ = write!(out, "{ESC}[38;5;{n}m");
    }
}

pub fn write_fg_rgb(out: &mut String, r: u8, g: u8, b: u8) {
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[38;2;{r};{g};{b}m");
}

pub fn write_bg_indexed(out: &mut String, n: u8) {
    use std::fmt::Write;
    if n < 8 {
        let _ = write!(out, "{ESC}[4{n}m");
    } else if n < 16 {
        let _ = write!(out, "{ESC}[10{}m", n - 8);
    } else {
        let _ = write!(out, "{ESC}[48;5;{n}m");
    }
}

pub fn write_bg_rgb(out: &mut String, r: u8, g: u8, b: u8) {
    use std::fmt::Write;
    let _ = write!(out, "{ESC}[48;2;{r};{g};{b}m");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_to_is_one_based() {
        let mut s = String::new();
        write_move_to(&mut s, 3, 1);
        assert_eq!(s, "\x1b[3;1H");
    }

    #[test]
    fn fg_indexed_branches() {
        let mut s = String::new();
        write_fg_indexed(&mut s, 3);
        assert_eq!(s, "\x1b[33m");
        s.clear();
        write_fg_indexed(&mut s, 11);
        assert_eq!(s, "\x1b[93m");
        s.clear();
        write_fg_indexed(&mut s, 200);
        assert_eq!(s, "\x1b[38;5;200m");
    }

    #[test]
    fn scroll_sequences() {
        let mut s = String::new();
        write_scroll_up(&mut s, 2);
        assert_eq!(s, "\x1b[2S");
        s.clear();
        write_scroll_down(&mut s, 1);
        assert_eq!(s, "\x1b[1T");
    }
}

//! Scroll-shift detection between two equal-sized grids.

use core_cell::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollDirection {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollShift {
    pub direction: ScrollDirection,
    pub n: usize,
}

/// Find the smallest shift `n` in `1..height` such that every surviving row
/// of `next` matches the corresponding row of `prev` shifted by `n`: an
/// up-shift by `n` means `next[r] == prev[r + n]` for `r` in `0..height-n`;
/// a down-shift means `next[r] == prev[r - n]` for `r` in `n..height`.
///
/// At a given `n`, an up-shift is preferred over a down-shift if both hold.
/// Returns `None` when the grids differ in size or no shift fits.
pub fn detect_scroll(prev: &Grid, next: &Grid) -> Option<ScrollShift> {
    if prev.width() != next.width() || prev.height() != next.height() {
        return None;
    }
    let h = prev.height() as usize;
    if h == 0 {
        return None;
    }
    for n in 1..h {
        if (0..h - n).all(|r| next.get_row(r) == prev.get_row(r + n)) {
            return Some(ScrollShift { direction: ScrollDirection::Up, n });
        }
        if (n..h).all(|r| next.get_row(r) == prev.get_row(r - n)) {
            return Some(ScrollShift { direction: ScrollDirection::Down, n });
        }
    }
    None
}

//! A convenience wrapper so callers can hand `FrameBuffer` either raw text
//! lines or an already-built `Grid`.

use core_cell::Grid;

pub struct Frame(Grid);

impl Frame {
    pub fn from_lines(lines: &[String], width: u16, height: u16) -> Self {
        Self(Grid::from_lines(lines, width, height))
    }

    pub fn from_grid(grid: Grid) -> Self {
        Self(grid)
    }

    pub fn into_grid(self) -> Grid {
        self.0
    }
}

impl From<Grid> for Frame {
    fn from(grid: Grid) -> Self {
        Self(grid)
    }
}

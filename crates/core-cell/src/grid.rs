//! A fixed-size row-major matrix of cells with per-row content hashing.

use crate::cell::{Attributes, Cell};
use ahash::AHasher;
use core_text::segment::normalize_and_segment;
use std::hash::{Hash, Hasher};

/// A rectangular region within a grid, in `(row, col)` + extent form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub row: usize,
    pub col: usize,
    pub width: usize,
    pub height: usize,
}

fn hash_row(row: &[Cell]) -> u64 {
    let mut hasher = AHasher::default();
    for cell in row {
        cell.hash(&mut hasher);
    }
    hasher.finish()
}

/// A fixed-size `(width, height)` matrix of cells, stored row-major, with a
/// maintained per-row hash for fast equality checks.
///
/// Invariant: `row_hashes[r]` always equals `hash_row(row r)`; every row has
/// exactly `width` cells; there are exactly `height` rows.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
    row_hashes: Vec<u64>,
}

impl Grid {
    pub fn new(width: u16, height: u16) -> Self {
        let cells = vec![Cell::blank(); width as usize * height as usize];
        let mut grid = Self {
            width,
            height,
            cells,
            row_hashes: vec![0; height as usize],
        };
        for r in 0..height as usize {
            grid.recompute_row_hash(r);
        }
        grid
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        if row >= self.height as usize || col >= self.width as usize {
            return None;
        }
        Some(row * self.width as usize + col)
    }

    fn recompute_row_hash(&mut self, row: usize) {
        let w = self.width as usize;
        let start = row * w;
        self.row_hashes[row] = hash_row(&self.cells[start..start + w]);
    }

    pub fn cell_at(&self, row: usize, col: usize) -> Option<&Cell> {
        self.index(row, col).map(|i| &self.cells[i])
    }

    /// No-op if out of bounds.
    pub fn set_cell(&mut self, row: usize, col: usize, cell: Cell) {
        if let Some(i) = self.index(row, col) {
            self.cells[i] = cell;
            self.recompute_row_hash(row);
        }
    }

    pub fn get_row(&self, row: usize) -> Option<&[Cell]> {
        if row >= self.height as usize {
            return None;
        }
        let w = self.width as usize;
        let start = row * w;
        Some(&self.cells[start..start + w])
    }

    pub fn row_hash(&self, row: usize) -> Option<u64> {
        self.row_hashes.get(row).copied()
    }

    /// Set a row from any cell sequence: pad with blanks if shorter than
    /// `width`, truncate if longer. No-op if `row` is out of bounds.
    pub fn set_row(&mut self, row: usize, cells: &[Cell]) {
        if row >= self.height as usize {
            return;
        }
        let w = self.width as usize;
        let start = row * w;
        for col in 0..w {
            self.cells[start + col] = cells.get(col).cloned().unwrap_or_default();
        }
        self.recompute_row_hash(row);
    }

    /// Fill a region with a cell, clamping the region to grid bounds.
    pub fn fill_region(&mut self, rect: Rect, cell: Cell) {
        let row_end = (rect.row + rect.height).min(self.height as usize);
        let col_end = (rect.col + rect.width).min(self.width as usize);
        for row in rect.row..row_end {
            for col in rect.col..col_end {
                if let Some(i) = self.index(row, col) {
                    self.cells[i] = cell.clone();
                }
            }
            self.recompute_row_hash(row);
        }
    }

    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Cell::blank();
        }
        for r in 0..self.height as usize {
            self.recompute_row_hash(r);
        }
    }

    /// Rows that differ between `self` and `other`.
    ///
    /// Equal dimensions: hash-based fast path, row `r` is changed iff its
    /// hashes differ. Unequal dimensions: compare up to `(min height, min
    /// width)`; any row index beyond the smaller grid's height counts as
    /// changed in both directions.
    pub fn changed_lines(&self, other: &Grid) -> Vec<usize> {
        let mut changed = Vec::new();
        if self.width == other.width && self.height == other.height {
            for r in 0..self.height as usize {
                if self.row_hashes[r] != other.row_hashes[r] {
                    changed.push(r);
                }
            }
            return changed;
        }
        let min_h = self.height.min(other.height) as usize;
        let min_w = self.width.min(other.width) as usize;
        for r in 0..min_h {
            let a = &self.cells[r * self.width as usize..r * self.width as usize + min_w];
            let b = &other.cells[r * other.width as usize..r * other.width as usize + min_w];
            if a != b {
                changed.push(r);
            }
        }
        let max_h = self.height.max(other.height) as usize;
        for r in min_h..max_h {
            changed.push(r);
        }
        changed
    }

    /// Dirty rectangles: for each changed row, the minimal column span
    /// covering the difference (leading/trailing common cells excluded).
    pub fn dirty_rectangles(&self, other: &Grid) -> Vec<Rect> {
        let changed = self.changed_lines(other);
        let mut rects = Vec::with_capacity(changed.len());
        for r in changed {
            let a = self.get_row(r);
            let b = other.get_row(r);
            let (a, b) = match (a, b) {
                (Some(a), Some(b)) => (a, b),
                _ => {
                    // row only exists in one grid: whole-width rect using this grid's width
                    rects.push(Rect { row: r, col: 0, width: self.width as usize, height: 1 });
                    continue;
                }
            };
            let len = a.len().min(b.len());
            let mut start = 0;
            while start < len && a[start] == b[start] {
                start += 1;
            }
            let mut end = len;
            while end > start && a[end - 1] == b[end - 1] {
                end -= 1;
            }
            let width = end.saturating_sub(start).max(1);
            rects.push(Rect { row: r, col: start, width, height: 1 });
        }
        rects
    }

    /// Build a grid from styled text lines: grapheme-by-grapheme, dropping
    /// any glyph that would cross the right edge. Short rows are padded
    /// with blanks; rows beyond `height` are truncated.
    pub fn from_lines(lines: &[String], width: u16, height: u16) -> Self {
        let mut grid = Self::new(width, height);
        for (r, line) in lines.iter().take(height as usize).enumerate() {
            let (_normalized, segments) = normalize_and_segment(line);
            let mut row = Vec::with_capacity(width as usize);
            let mut col = 0usize;
            for seg in segments {
                if col >= width as usize {
                    break;
                }
                if col as u16 + seg.width > width {
                    // would cross the right edge; drop rather than split the glyph
                    break;
                }
                row.push(Cell::new(seg.cluster, None, None, Attributes::empty()));
                col += seg.width as usize;
                if seg.width == 2 {
                    row.push(Cell::continuation());
                }
            }
            grid.set_row(r, &row);
        }
        grid
    }

    /// Reconstruct plain text lines by concatenating cell content per row
    /// (continuation cells contribute nothing).
    pub fn to_lines(&self) -> Vec<String> {
        (0..self.height as usize)
            .map(|r| {
                self.get_row(r)
                    .map(|row| row.iter().map(|c| c.content.as_str()).collect())
                    .unwrap_or_default()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_grid_is_blank_and_hashes_match() {
        let g = Grid::new(3, 2);
        assert_eq!(g.width(), 3);
        assert_eq!(g.height(), 2);
        for r in 0..2 {
            assert_eq!(g.row_hash(r), g.get_row(r).map(hash_row));
        }
    }

    #[test]
    fn changed_lines_equal_dims_is_hash_based() {
        let mut a = Grid::new(3, 2);
        let b = Grid::new(3, 2);
        assert!(a.changed_lines(&b).is_empty());
        a.set_cell(1, 1, Cell::new("x", None, None, Attributes::empty()));
        assert_eq!(a.changed_lines(&b), vec![1]);
    }

    #[test]
    fn changed_lines_matches_row_inequality_invariant() {
        let mut a = Grid::new(4, 3);
        let mut b = Grid::new(4, 3);
        a.set_cell(0, 0, Cell::new("x", None, None, Attributes::empty()));
        b.set_cell(2, 0, Cell::new("y", None, None, Attributes::empty()));
        let changed = a.changed_lines(&b);
        for r in 0..3 {
            let differs = a.get_row(r) != b.get_row(r);
            assert_eq!(changed.contains(&r), differs);
        }
    }

    #[test]
    fn changed_lines_unequal_dims_flags_extra_rows() {
        let a = Grid::new(3, 2);
        let b = Grid::new(3, 4);
        let changed = a.changed_lines(&b);
        assert!(changed.contains(&2));
        assert!(changed.contains(&3));
    }

    #[test]
    fn set_row_pads_and_truncates() {
        let mut g = Grid::new(3, 1);
        g.set_row(0, &[Cell::new("a", None, None, Attributes::empty())]);
        assert_eq!(g.get_row(0).unwrap()[1], Cell::blank());
        g.set_row(
            0,
            &[
                Cell::new("a", None, None, Attributes::empty()),
                Cell::new("b", None, None, Attributes::empty()),
                Cell::new("c", None, None, Attributes::empty()),
                Cell::new("d", None, None, Attributes::empty()),
            ],
        );
        assert_eq!(g.get_row(0).unwrap().len(), 3);
    }

    #[test]
    fn out_of_bounds_set_cell_is_noop() {
        let mut g = Grid::new(2, 2);
        g.set_cell(5, 5, Cell::new("z", None, None, Attributes::empty()));
        assert_eq!(g.cell_at(5, 5), None);
    }

    #[test]
    fn from_lines_drops_wide_glyph_crossing_right_edge() {
        let lines = vec!["a\u{754C}".to_string()]; // 'a' (1) + wide glyph (2) = 3 cols in a width-2 grid
        let g = Grid::from_lines(&lines, 2, 1);
        let row = g.get_row(0).unwrap();
        assert_eq!(row[0].content, "a");
        assert_eq!(row[1], Cell::blank());
    }

    #[test]
    fn round_trip_lines_identity_when_fits() {
        let lines = vec!["abc".to_string(), "de".to_string()];
        let g = Grid::from_lines(&lines, 3, 2);
        let out = g.to_lines();
        assert_eq!(out, vec!["abc".to_string(), "de".to_string()]);
    }

    #[test]
    fn fill_region_writes_only_the_requested_cells() {
        let mut g = Grid::new(4, 4);
        let fill = Cell::new("x", None, None, Attributes::empty());
        g.fill_region(Rect { row: 1, col: 1, width: 2, height: 2 }, fill.clone());
        for r in 0..4 {
            for c in 0..4 {
                let expect_fill = (1..3).contains(&r) && (1..3).contains(&c);
                let cell = g.cell_at(r, c).unwrap();
                if expect_fill {
                    assert_eq!(*cell, fill);
                } else {
                    assert_eq!(*cell, Cell::blank());
                }
            }
        }
    }

    #[test]
    fn fill_region_clamps_to_grid_bounds() {
        let mut g = Grid::new(3, 3);
        let fill = Cell::new("x", None, None, Attributes::empty());
        // Extends past both edges; must not panic and must only touch
        // cells that actually exist.
        g.fill_region(Rect { row: 2, col: 2, width: 10, height: 10 }, fill.clone());
        assert_eq!(*g.cell_at(2, 2).unwrap(), fill);
        assert_eq!(*g.cell_at(0, 0).unwrap(), Cell::blank());
    }

    #[test]
    fn dirty_rectangles_finds_minimal_span_per_changed_row() {
        let mut a = Grid::new(6, 1);
        a.set_row(0, &[
            Cell::new("a", None, None, Attributes::empty()),
            Cell::new("b", None, None, Attributes::empty()),
            Cell::new("c", None, None, Attributes::empty()),
            Cell::new("d", None, None, Attributes::empty()),
            Cell::new("e", None, None, Attributes::empty()),
            Cell::new("f", None, None, Attributes::empty()),
        ]);
        let mut b = a.clone();
        b.set_cell(2, 0, Cell::new("X", None, None, Attributes::empty()));
        let rects = a.dirty_rectangles(&b);
        assert_eq!(rects, vec![Rect { row: 0, col: 2, width: 1, height: 1 }]);
    }

    #[test]
    fn dirty_rectangles_whole_width_when_row_missing_on_one_side() {
        let a = Grid::new(3, 1);
        let b = Grid::new(3, 2);
        let rects = a.dirty_rectangles(&b);
        assert_eq!(rects, vec![Rect { row: 1, col: 0, width: 3, height: 1 }]);
    }

    proptest::proptest! {
        /// Building a grid from ASCII lines (each no wider than `width`,
        /// so nothing gets dropped or wide-glyph-split) and reading it back
        /// must reproduce the original text, space-padded to `width`.
        #[test]
        fn from_lines_to_lines_round_trips_ascii(
            width in 1u16..12,
            lines in proptest::collection::vec("[a-zA-Z0-9]{0,8}", 0..5),
        ) {
            let width = width.max(8); // strategy can emit up to 8 chars
            let w = width as usize;
            let height = lines.len() as u16;
            let g = Grid::from_lines(&lines, width, height);
            let out = g.to_lines();
            for (line, rendered) in lines.iter().zip(out.iter()) {
                let expected = format!("{:<w$}", line, w = w);
                assert_eq!(rendered, &expected);
            }
        }
    }
}

//! `TerminalRenderer`: turns a grid (plus an optional previous grid and a
//! chosen [`Strategy`]) into control sequences written through a [`Sink`],
//! tracking the believed SGR state and cursor/autowrap visibility across
//! calls.

use crate::scroll::{self, ScrollDirection};
use crate::strategy::{RenderStats, Strategy};
use core_cell::{ansi, render_row, Grid, Sink, TerminalState};
use std::time::Instant;

/// Emits control sequences for one grid against a sink, choosing among
/// full/delta/scroll strategies and maintaining the cursor/SGR state a
/// real terminal would believe it's in.
///
/// Owns the terminal state and the cursor-visibility flag exclusively, per
/// the ownership rule in the data model: no other component mutates them.
pub struct TerminalRenderer<S: Sink> {
    sink: S,
    state: TerminalState,
    cursor_hidden: bool,
    autowrap_disabled: bool,
    previous_line_count: u16,
    bytes_written: u64,
    pub hide_cursor_during_render: bool,
    pub disable_autowrap_during_render: bool,
}

impl<S: Sink> TerminalRenderer<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: TerminalState::reset(),
            cursor_hidden: false,
            autowrap_disabled: false,
            previous_line_count: 0,
            bytes_written: 0,
            hide_cursor_during_render: true,
            disable_autowrap_during_render: false,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn is_cursor_hidden(&self) -> bool {
        self.cursor_hidden
    }

    pub fn previous_line_count(&self) -> u16 {
        self.previous_line_count
    }

    fn write(&mut self, s: &str) {
        // Write failures are swallowed: a closed pipe in tests, or a dead
        // terminal mid-session, must not crash the render loop.
        let _ = self.sink.write(s.as_bytes());
        self.bytes_written += s.len() as u64;
    }

    pub fn hide_cursor(&mut self) {
        if !self.cursor_hidden {
            self.write(ansi::CURSOR_HIDE);
            self.cursor_hidden = true;
        }
    }

    pub fn show_cursor(&mut self) {
        if self.cursor_hidden {
            self.write(ansi::CURSOR_SHOW);
            self.cursor_hidden = false;
        }
    }

    /// Move the cursor to a 1-based `(row, col)`.
    pub fn move_cursor(&mut self, row: u32, col: u32) {
        let mut out = String::new();
        ansi::write_move_to(&mut out, row, col);
        self.write(&out);
    }

    /// Clear the screen and reset full-redraw bookkeeping, as if nothing
    /// had ever been rendered.
    pub fn clear(&mut self) {
        let mut out = String::new();
        out.push_str(ansi::CLEAR_SCREEN);
        out.push_str(ansi::CURSOR_HOME);
        self.write(&out);
        self.previous_line_count = 0;
        self.state = TerminalState::reset();
    }

    /// Restore cursor visibility and autowrap, then flush the sink.
    pub fn shutdown(&mut self) {
        self.show_cursor();
        if self.autowrap_disabled {
            self.write(ansi::AUTOWRAP_ON);
            self.autowrap_disabled = false;
        }
        let _ = self.sink.flush();
    }

    /// Render `grid` using `strategy`, falling back to a feasible strategy
    /// when the requested one can't apply (no previous grid, or — for
    /// scroll — no detectable shift). Cursor-hide and autowrap-disable, if
    /// configured, bracket the whole call including any internal fallback.
    pub fn render(&mut self, grid: &Grid, strategy: Strategy, previous: Option<&Grid>) -> RenderStats {
        let start = Instant::now();
        let mut out = String::new();

        let hide = self.hide_cursor_during_render;
        let autowrap_off = self.disable_autowrap_during_render;
        if hide && !self.cursor_hidden {
            out.push_str(ansi::CURSOR_HIDE);
            self.cursor_hidden = true;
        }
        if autowrap_off && !self.autowrap_disabled {
            out.push_str(ansi::AUTOWRAP_OFF);
            self.autowrap_disabled = true;
        }

        let (effective, lines_changed) = match strategy {
            Strategy::FullRedraw => {
                self.emit_full(grid, &mut out);
                (Strategy::FullRedraw, grid.height() as usize)
            }
            Strategy::DeltaUpdate => match previous {
                Some(prev) => {
                    let n = self.emit_delta(grid, prev, &mut out);
                    (Strategy::DeltaUpdate, n)
                }
                None => {
                    self.emit_full(grid, &mut out);
                    (Strategy::FullRedraw, grid.height() as usize)
                }
            },
            Strategy::ScrollOptimized => match previous {
                Some(prev) => match scroll::detect_scroll(prev, grid) {
                    Some(shift) => {
                        let n = self.emit_scroll(grid, shift.direction, shift.n, &mut out);
                        (Strategy::ScrollOptimized, n)
                    }
                    None => {
                        let n = self.emit_delta(grid, prev, &mut out);
                        (Strategy::DeltaUpdate, n)
                    }
                },
                None => {
                    self.emit_full(grid, &mut out);
                    (Strategy::FullRedraw, grid.height() as usize)
                }
            },
        };

        if autowrap_off && self.autowrap_disabled {
            out.push_str(ansi::AUTOWRAP_ON);
            self.autowrap_disabled = false;
        }
        if hide && self.cursor_hidden {
            out.push_str(ansi::CURSOR_SHOW);
            self.cursor_hidden = false;
        }

        self.previous_line_count = grid.height();
        let bytes_written = out.len();
        self.write(&out);

        let stats = RenderStats {
            strategy: effective,
            lines_changed,
            bytes_written,
            duration: start.elapsed(),
            total_lines: grid.height() as usize,
        };
        tracing::debug!(
            strategy = ?stats.strategy,
            lines_changed = stats.lines_changed,
            bytes_written = stats.bytes_written,
            total_lines = stats.total_lines,
            "render"
        );
        stats
    }

    fn emit_row_at(&mut self, out: &mut String, row_idx: usize, grid: &Grid) {
        ansi::write_move_to(out, (row_idx + 1) as u32, 1);
        out.push_str(ansi::CLEAR_LINE);
        out.push_str(ansi::CURSOR_COLUMN_1);
        if let Some(row) = grid.get_row(row_idx) {
            render_row(&mut self.state, row, out);
        }
        out.push_str(ansi::SGR_RESET);
        self.state = TerminalState::reset();
    }

    fn emit_full(&mut self, grid: &Grid, out: &mut String) {
        if self.previous_line_count == 0 {
            out.push_str(ansi::CLEAR_SCREEN);
            out.push_str(ansi::CURSOR_HOME);
        } else {
            let n = self.previous_line_count as u32;
            ansi::write_move_up(out, n.saturating_sub(1));
            for _ in 0..n {
                out.push_str(ansi::CLEAR_LINE);
                ansi::write_move_down(out, 1);
            }
            out.push_str(ansi::CURSOR_HOME);
        }
        out.push_str(ansi::SGR_RESET);
        self.state = TerminalState::reset();
        for r in 0..grid.height() as usize {
            self.emit_row_at(out, r, grid);
        }
        ansi::write_move_to(out, grid.height() as u32 + 1, 1);
    }

    /// Renders `changed := prev.changed_lines(grid)` rows; rows beyond
    /// `grid.height()` (present only because `prev` was taller) are
    /// cleared with no content, covering the "grid shrank" case.
    fn emit_delta(&mut self, grid: &Grid, prev: &Grid, out: &mut String) -> usize {
        let changed = prev.changed_lines(grid);
        for &r in &changed {
            if r < grid.height() as usize {
                self.emit_row_at(out, r, grid);
            } else {
                ansi::write_move_to(out, (r + 1) as u32, 1);
                out.push_str(ansi::CLEAR_LINE);
            }
        }
        ansi::write_move_to(out, grid.height() as u32 + 1, 1);
        changed.len()
    }

    fn emit_scroll(&mut self, grid: &Grid, direction: ScrollDirection, n: usize, out: &mut String) -> usize {
        tracing::trace!(?direction, n, "scroll shift");
        let h = grid.height() as usize;
        match direction {
            ScrollDirection::Up => {
                ansi::write_scroll_up(out, n as u32);
                for r in (h - n)..h {
                    self.emit_row_at(out, r, grid);
                }
            }
            ScrollDirection::Down => {
                ansi::write_scroll_down(out, n as u32);
                for r in 0..n {
                    self.emit_row_at(out, r, grid);
                }
            }
        }
        ansi::write_move_to(out, grid.height() as u32 + 1, 1);
        n
    }
}

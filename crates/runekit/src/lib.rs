//! `FrameBuffer`: the public front door of the rendering core.
//!
//! Owns the reconciler, the alternate-screen tracker, console capture, and
//! the shared output writer, and composes them on every render call: enter
//! the alternate screen and start capture on first use if configured, stack
//! any buffered log lines above the live grid, then forward the chosen grid
//! to the reconciler. Nothing here talks to the wire directly — that's
//! `core_render::TerminalRenderer`'s job, reached through the reconciler.

pub mod alternate_screen;
pub mod frame;
pub mod output_writer;

pub use alternate_screen::AlternateScreenBuffer;
pub use frame::Frame;
pub use output_writer::{OutputWriter, SharedWriter};

use core_capture::{format_rows, ConsoleCapture, LogLaneConfig};
use core_cell::Grid;
use core_config::RenderConfig;
use core_reconcile::{HybridReconciler, PerformanceSnapshot, ReconcilerConfig};
use std::io::Write;
use std::sync::Mutex;

/// Everything `FrameBuffer` needs beyond `RenderConfig`'s knobs: the log
/// lane's own formatting options and the console capture buffer cap (kept
/// distinct from `RenderConfig::max_lines_for_diff`, which bounds diffing,
/// not log retention — see `spec.md` §4.6's default of 1000).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameBufferConfig {
    pub render: RenderConfig,
    pub log_lane: LogLaneConfig,
    pub capture_buffer_size: usize,
}

impl Default for FrameBufferConfig {
    fn default() -> Self {
        Self { render: RenderConfig::default(), log_lane: LogLaneConfig::default(), capture_buffer_size: 1000 }
    }
}

impl From<RenderConfig> for FrameBufferConfig {
    fn from(render: RenderConfig) -> Self {
        Self { render, ..Default::default() }
    }
}

fn reconciler_config(render: &RenderConfig) -> ReconcilerConfig {
    ReconcilerConfig {
        mode: render.optimization_mode,
        max_frame_rate: render.max_frame_rate,
        max_lines_for_diff: render.max_lines_for_diff,
        hide_cursor_during_render: render.hide_cursor_during_render,
        disable_autowrap_during_render: render.disable_autowrap_during_render,
    }
}

/// Owns every collaborator exclusively, per the data model's ownership
/// summary: `HybridReconciler`, `AlternateScreenBuffer`, `ConsoleCapture`,
/// and the `OutputWriter` behind `SharedWriter`.
pub struct FrameBuffer<W: Write + Send + 'static> {
    reconciler: HybridReconciler<SharedWriter<W>>,
    writer: SharedWriter<W>,
    alt_screen: Mutex<AlternateScreenBuffer>,
    capture: ConsoleCapture,
    config: FrameBufferConfig,
}

impl FrameBuffer<std::io::Stdout> {
    /// Build a `FrameBuffer` writing to the process's real standard output.
    pub fn new(config: impl Into<FrameBufferConfig>) -> Self {
        Self::with_writer(std::io::stdout(), config)
    }
}

impl<W: Write + Send + 'static> FrameBuffer<W> {
    /// Build a `FrameBuffer` writing to an arbitrary sink — production code
    /// uses `FrameBuffer::new` (stdout); tests hand in a `Vec<u8>`.
    pub fn with_writer(inner: W, config: impl Into<FrameBufferConfig>) -> Self {
        let config = config.into();
        let writer = SharedWriter::new(inner, config.render.write_buffer_size.max(1));
        let reconciler = HybridReconciler::new(writer.clone(), reconciler_config(&config.render));
        Self {
            reconciler,
            writer,
            alt_screen: Mutex::new(AlternateScreenBuffer::new()),
            capture: ConsoleCapture::new(config.capture_buffer_size),
            config,
        }
    }

    /// Ensure the alternate screen and console capture are in the state the
    /// configuration calls for, then return the grid that should actually be
    /// rendered: the live grid alone, or a combined grid with buffered log
    /// lines stacked above it when capture is active and has something to
    /// show. Mirrors `FrameBuffer::render_frame`'s responsibilities in
    /// `spec.md` §4.4, steps 1-3.
    fn prepare(&self, grid: Grid) -> Grid {
        if self.config.render.use_alternate_screen {
            let mut alt = self.alt_screen.lock().expect("alternate screen mutex poisoned");
            if !alt.is_active() {
                if let Err(e) = alt.enter(&self.writer) {
                    tracing::debug!(error = %e, "failed to enter alternate screen");
                }
            }
        }
        if self.config.render.enable_console_capture && !self.capture.is_active() {
            if let Err(e) = self.capture.start_capture() {
                tracing::debug!(error = %e, "failed to start console capture");
            }
        }

        if !self.capture.is_active() {
            return grid;
        }
        let logs = self.capture.snapshot();
        if logs.is_empty() {
            return grid;
        }

        let (cols, _rows) = core_terminal::terminal_size();
        let combined_width = cols.max(grid.width());
        let log_rows = format_rows(&logs, &self.config.log_lane, combined_width);
        let mut combined = Grid::new(combined_width, log_rows.len() as u16 + grid.height());
        for (i, row) in log_rows.iter().enumerate() {
            combined.set_row(i, row);
        }
        for r in 0..grid.height() as usize {
            if let Some(row) = grid.get_row(r) {
                combined.set_row(log_rows.len() + r, row);
            }
        }
        combined
    }

    /// Render a `Frame` (text lines or a pre-built grid), subject to
    /// coalescing and backpressure.
    pub fn render_frame(&self, frame: Frame) {
        let grid = self.prepare(frame.into_grid());
        self.reconciler.render(grid);
    }

    /// Render a `Grid` directly, subject to coalescing and backpressure.
    pub fn render_grid(&self, grid: Grid) {
        let grid = self.prepare(grid);
        self.reconciler.render(grid);
    }

    /// Render a `Frame` immediately, bypassing coalescing and backpressure.
    pub fn render_frame_immediate(&self, frame: Frame) {
        let grid = self.prepare(frame.into_grid());
        self.reconciler.render_immediate(grid);
    }

    /// Stop capture, leave the alternate screen, then clear the reconciler's
    /// render state, keeping `self` alive for further renders.
    pub fn clear(&self) {
        if let Err(e) = self.capture.stop_capture() {
            tracing::debug!(error = %e, "failed to stop console capture during clear");
        }
        let mut alt = self.alt_screen.lock().expect("alternate screen mutex poisoned");
        if let Err(e) = alt.leave(&self.writer) {
            tracing::debug!(error = %e, "failed to leave alternate screen during clear");
        }
        drop(alt);
        self.reconciler.clear();
    }

    /// Stop capture, leave the alternate screen, and shut down the
    /// reconciler for good.
    pub fn shutdown(&self) {
        if let Err(e) = self.capture.stop_capture() {
            tracing::debug!(error = %e, "failed to stop console capture during shutdown");
        }
        let mut alt = self.alt_screen.lock().expect("alternate screen mutex poisoned");
        if let Err(e) = alt.leave(&self.writer) {
            tracing::debug!(error = %e, "failed to leave alternate screen during shutdown");
        }
        drop(alt);
        self.reconciler.shutdown();
    }

    pub fn wait_for_pending_updates(&self) {
        self.reconciler.wait_for_pending_updates();
    }

    /// Make the cursor visible again on whatever frame is currently on
    /// screen — typically called right before the process exits.
    pub fn restore_cursor(&self) {
        self.reconciler.restore_cursor();
    }

    pub fn get_performance_metrics(&self) -> PerformanceSnapshot {
        self.reconciler.get_performance_metrics()
    }

    pub fn get_current_frame(&self) -> Option<Grid> {
        self.reconciler.get_current_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::RenderConfig;
    use core_reconcile::OptimizationMode;

    fn config_with(f: impl FnOnce(&mut RenderConfig)) -> FrameBufferConfig {
        let mut render = RenderConfig::default();
        render.max_frame_rate = 1000.0;
        f(&mut render);
        FrameBufferConfig::from(render)
    }

    #[test]
    fn first_render_goes_through_and_is_visible_as_current_frame() {
        let fb = FrameBuffer::with_writer(Vec::new(), config_with(|_| {}));
        fb.render_frame_immediate(Frame::from_lines(&["hello".to_string()], 5, 1));
        let frame = fb.get_current_frame().expect("a frame should have rendered");
        assert_eq!(frame.to_lines(), vec!["hello".to_string()]);
    }

    #[test]
    fn no_logs_means_combined_grid_equals_live_grid() {
        let fb = FrameBuffer::with_writer(Vec::new(), config_with(|r| r.enable_console_capture = true));
        fb.render_frame_immediate(Frame::from_lines(&["hi".to_string()], 2, 1));
        let frame = fb.get_current_frame().expect("a frame should have rendered");
        assert_eq!(frame.height(), 1);
        fb.shutdown();
    }

    #[test]
    fn clear_leaves_frame_buffer_usable_for_further_renders() {
        let fb = FrameBuffer::with_writer(Vec::new(), config_with(|_| {}));
        fb.render_frame_immediate(Frame::from_lines(&["a".to_string()], 1, 1));
        fb.clear();
        fb.render_frame_immediate(Frame::from_lines(&["b".to_string()], 1, 1));
        let frame = fb.get_current_frame().expect("a frame should have rendered");
        assert_eq!(frame.to_lines(), vec!["b".to_string()]);
    }

    #[test]
    fn shutdown_stops_further_rendering() {
        let fb = FrameBuffer::with_writer(Vec::new(), config_with(|_| {}));
        fb.render_frame_immediate(Frame::from_lines(&["a".to_string()], 1, 1));
        fb.shutdown();
        fb.render_grid(Grid::new(1, 1));
        assert!(fb.get_current_frame().is_none());
    }

    #[test]
    fn automatic_mode_selects_delta_on_small_change() {
        let fb = FrameBuffer::with_writer(Vec::new(), config_with(|r| r.optimization_mode = OptimizationMode::Automatic));
        fb.render_frame_immediate(Frame::from_lines(&["a".to_string(), "b".to_string()], 1, 2));
        fb.render_frame_immediate(Frame::from_lines(&["a".to_string(), "c".to_string()], 1, 2));
        let stats = fb.get_performance_metrics().last_render.unwrap();
        // A single-row change in a tall-enough grid should prefer a delta
        // over a full redraw once the adaptive threshold has room.
        assert!(stats.lines_changed <= 2);
    }
}

//! The three render strategies and the stats each render call produces.

use std::time::Duration;

/// Which of the three update strategies a render call used.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    FullRedraw,
    DeltaUpdate,
    ScrollOptimized,
}

/// Measurements from a single render call, used by callers to judge how
/// well a strategy performed and by the reconciler to adapt thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderStats {
    pub strategy: Strategy,
    pub lines_changed: usize,
    pub bytes_written: usize,
    pub duration: Duration,
    pub total_lines: usize,
}

impl RenderStats {
    /// Fraction of lines that didn't need to change. When `total_lines` is
    /// zero there's nothing to divide by, so fall back to a strategy-typed
    /// heuristic: a full redraw touched everything (0.0), while a delta or
    /// scroll update implies there was nothing to do (1.0).
    pub fn efficiency(&self) -> f64 {
        if self.total_lines > 0 {
            1.0 - (self.lines_changed as f64 / self.total_lines as f64)
        } else {
            match self.strategy {
                Strategy::FullRedraw => 0.0,
                Strategy::DeltaUpdate | Strategy::ScrollOptimized => 1.0,
            }
        }
    }
}

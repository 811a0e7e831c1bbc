//! `HybridReconciler`: chooses a render strategy per frame, coalesces
//! rapid submissions, applies backpressure, and forces periodic full
//! redraws as a safety valve.

use crate::policy::{AdaptiveQualityController, AdaptiveThresholds, FullRedrawPolicy, MetricsRecorder, OptimizationMode, StrategyDeterminer};
use core_cell::{Grid, Sink};
use core_render::{RenderStats, Strategy, TerminalRenderer};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const MAX_QUEUE_DEPTH: usize = 5;

/// A read-only snapshot of the reconciler's adaptive state, safe to hand
/// to a caller without holding any lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceSnapshot {
    pub last_render: Option<RenderStats>,
    pub dropped_frames: u64,
    pub adaptive_quality: f64,
    pub delta_threshold: f64,
    pub queue_depth: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct ReconcilerConfig {
    pub mode: OptimizationMode,
    pub max_frame_rate: f64,
    /// Grids taller than this force a full redraw rather than a diff, per
    /// `spec.md` §6's `maxLinesForDiff` knob: past this height the line-by-
    /// line comparison stops being the cheaper option.
    pub max_lines_for_diff: usize,
    pub hide_cursor_during_render: bool,
    pub disable_autowrap_during_render: bool,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            mode: OptimizationMode::LineDiff,
            max_frame_rate: 60.0,
            max_lines_for_diff: 1000,
            hide_cursor_during_render: true,
            disable_autowrap_during_render: false,
        }
    }
}

impl ReconcilerConfig {
    /// Invalid frame rates (`<= 0`) clamp to a minimum of 1 fps rather than
    /// failing, per `spec.md` §7.
    fn clamped_fps(&self) -> f64 {
        if self.max_frame_rate > 0.0 {
            self.max_frame_rate
        } else {
            1.0
        }
    }

    fn max_update_rate(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.clamped_fps())
    }

    fn coalescing_window(&self) -> Duration {
        Duration::from_secs_f64(0.5 / self.clamped_fps())
    }
}

struct Inner<S: Sink> {
    renderer: TerminalRenderer<S>,
    current_grid: Option<Grid>,
    pending_update: Option<Grid>,
    queue_depth: usize,
    dropped_frames: u64,
    quality: AdaptiveQualityController,
    thresholds: AdaptiveThresholds,
    redraw_policy: FullRedrawPolicy,
    history: MetricsRecorder,
    mode: OptimizationMode,
    max_lines_for_diff: usize,
    max_update_rate: Duration,
    coalescing_window: Duration,
    last_update_time: Option<Instant>,
    timer_generation: u64,
    shut_down: bool,
    last_stats: Option<RenderStats>,
}

impl<S: Sink> Inner<S> {
    /// Perform one render with strategy selection, the periodic safety
    /// valve, and threshold adaptation all applied. Returns the stats so
    /// the caller (immediate path or timer) can log/trace as appropriate.
    fn perform_render(&mut self, grid: Grid, now: Instant) -> RenderStats {
        let forced = self.redraw_policy.should_force(now)
            || self.quality.quality() < 0.7
            || grid.height() as usize > self.max_lines_for_diff;
        let strategy = StrategyDeterminer::determine(self.current_grid.as_ref(), &grid, self.mode, &self.thresholds, forced);
        let stats = self.renderer.render(&grid, strategy, self.current_grid.as_ref());
        self.redraw_policy.record(stats.strategy, now);
        self.history.record(stats);
        self.history.adapt(&mut self.thresholds);
        self.current_grid = Some(grid);
        self.last_update_time = Some(now);
        self.last_stats = Some(stats);
        stats
    }
}

/// Owns the renderer, the current grid, the policy objects, and the
/// pending-update coalescing slot. All public operations serialize through
/// one mutex, matching the "exclusive access boundary" ownership rule.
pub struct HybridReconciler<S: Sink + Send + 'static> {
    inner: Arc<Mutex<Inner<S>>>,
    max_queue_depth: usize,
}

impl<S: Sink + Send + 'static> HybridReconciler<S> {
    pub fn new(sink: S, config: ReconcilerConfig) -> Self {
        let mut renderer = TerminalRenderer::new(sink);
        renderer.hide_cursor_during_render = config.hide_cursor_during_render;
        renderer.disable_autowrap_during_render = config.disable_autowrap_during_render;
        let inner = Inner {
            renderer,
            current_grid: None,
            pending_update: None,
            queue_depth: 0,
            dropped_frames: 0,
            quality: AdaptiveQualityController::default(),
            thresholds: AdaptiveThresholds::default(),
            redraw_policy: FullRedrawPolicy::default(),
            history: MetricsRecorder::default(),
            mode: config.mode,
            max_lines_for_diff: config.max_lines_for_diff,
            max_update_rate: config.max_update_rate(),
            coalescing_window: config.coalescing_window(),
            last_update_time: None,
            timer_generation: 0,
            shut_down: false,
            last_stats: None,
        };
        Self { inner: Arc::new(Mutex::new(inner)), max_queue_depth: MAX_QUEUE_DEPTH }
    }

    /// Submit a grid for rendering. May render immediately, coalesce with
    /// an already-pending grid, or drop the frame under backpressure.
    pub fn render(&self, grid: Grid) {
        let now = Instant::now();
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        if inner.shut_down {
            return;
        }
        inner.queue_depth += 1;
        if inner.queue_depth > self.max_queue_depth {
            inner.queue_depth -= 1;
            inner.dropped_frames += 1;
            inner.quality.degrade();
            tracing::debug!(dropped_frames = inner.dropped_frames, "frame dropped under backpressure");
            return;
        }

        let rate_ok = match inner.last_update_time {
            None => true,
            Some(t) => now.duration_since(t) >= inner.max_update_rate,
        };

        if inner.pending_update.is_none() && rate_ok {
            inner.perform_render(grid, now);
            inner.queue_depth -= 1;
            return;
        }

        inner.pending_update = Some(grid);
        inner.timer_generation += 1;
        let generation = inner.timer_generation;
        let window = inner.coalescing_window;
        drop(inner);

        let weak = Arc::downgrade(&self.inner);
        std::thread::spawn(move || {
            std::thread::sleep(window);
            let Some(inner) = weak.upgrade() else { return };
            let mut inner = inner.lock().expect("reconciler mutex poisoned");
            if inner.shut_down || inner.timer_generation != generation {
                return;
            }
            if let Some(grid) = inner.pending_update.take() {
                let now = Instant::now();
                inner.perform_render(grid, now);
                inner.queue_depth = inner.queue_depth.saturating_sub(1);
            }
        });
    }

    /// Render immediately, bypassing coalescing and backpressure — used by
    /// callers that must guarantee the grid in hand is the one that lands
    /// on screen (e.g. a final frame before shutdown).
    pub fn render_immediate(&self, grid: Grid) {
        let now = Instant::now();
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        if inner.shut_down {
            return;
        }
        inner.timer_generation += 1; // invalidate any in-flight coalescing timer
        inner.pending_update = None;
        inner.perform_render(grid, now);
    }

    /// Force the next render to be a full redraw regardless of strategy
    /// selection.
    pub fn force_full_redraw(&self) {
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.redraw_policy.force_next();
    }

    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.renderer.clear();
        inner.current_grid = None;
        inner.pending_update = None;
    }

    /// Make the cursor visible again, regardless of `hide_cursor_during_render`
    /// — used on a caller's cleanup path where the frame being left on screen
    /// should show a cursor even though renders themselves hide it.
    pub fn restore_cursor(&self) {
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.renderer.show_cursor();
    }

    /// Drop diffing history without touching the renderer's cursor/screen
    /// state — the next render will be evaluated against no previous grid.
    pub fn reset_diff_state(&self) {
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.current_grid = None;
    }

    pub fn shutdown(&self) {
        let mut inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.timer_generation += 1;
        inner.pending_update = None;
        inner.shut_down = true;
        inner.renderer.shutdown();
        inner.current_grid = None;
    }

    pub fn get_performance_metrics(&self) -> PerformanceSnapshot {
        let inner = self.inner.lock().expect("reconciler mutex poisoned");
        PerformanceSnapshot {
            last_render: inner.last_stats,
            dropped_frames: inner.dropped_frames,
            adaptive_quality: inner.quality.quality(),
            delta_threshold: inner.thresholds.delta_threshold,
            queue_depth: inner.queue_depth,
        }
    }

    pub fn get_current_frame(&self) -> Option<Grid> {
        let inner = self.inner.lock().expect("reconciler mutex poisoned");
        inner.current_grid.clone()
    }

    /// Blocks until any in-flight coalescing timer has fired and drained
    /// its pending update. Polls rather than joining the timer thread
    /// directly, since the thread is fire-and-forget by design.
    pub fn wait_for_pending_updates(&self) {
        loop {
            let pending = {
                let inner = self.inner.lock().expect("reconciler mutex poisoned");
                inner.pending_update.is_some()
            };
            if !pending {
                return;
            }
            std::thread::sleep(Duration::from_millis(1));
        }
    }
}

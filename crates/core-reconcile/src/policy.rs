//! Policy objects the reconciler consults: strategy selection, the
//! periodic-full-redraw safety valve, adaptive quality degradation under
//! backpressure, and threshold adaptation from recent render efficiency.

use core_cell::Grid;
pub use core_cell::OptimizationMode;
use core_render::{detect_scroll, RenderStats, Strategy};
use std::time::{Duration, Instant};

/// The two knobs `Automatic` mode adapts: how much byte-savings a delta
/// must show before it's worth it over a full redraw, and the change
/// fraction above which a full redraw is chosen outright.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveThresholds {
    pub delta_threshold: f64,
    pub max_change_percentage: f64,
}

impl Default for AdaptiveThresholds {
    fn default() -> Self {
        Self {
            delta_threshold: 0.3,
            max_change_percentage: 0.5,
        }
    }
}

const DELTA_THRESHOLD_MIN: f64 = 0.2;
const DELTA_THRESHOLD_MAX: f64 = 0.6;

impl AdaptiveThresholds {
    fn clamp_delta(&mut self) {
        self.delta_threshold = self.delta_threshold.clamp(DELTA_THRESHOLD_MIN, DELTA_THRESHOLD_MAX);
    }
}

/// Chooses a [`Strategy`] for one render call.
///
/// `forced` covers both "the caller asked for a full redraw" and the
/// periodic safety valve; both collapse to the same unconditional choice.
pub struct StrategyDeterminer;

impl StrategyDeterminer {
    pub fn determine(
        current: Option<&Grid>,
        next: &Grid,
        mode: OptimizationMode,
        thresholds: &AdaptiveThresholds,
        forced: bool,
    ) -> Strategy {
        let Some(current) = (if forced { None } else { current }) else {
            return Strategy::FullRedraw;
        };
        match mode {
            OptimizationMode::FullRedraw => Strategy::FullRedraw,
            OptimizationMode::LineDiff => Strategy::DeltaUpdate,
            OptimizationMode::Automatic => {
                if current.width() != next.width() || current.height() != next.height() {
                    return Strategy::FullRedraw;
                }
                let h = next.height().max(1) as f64;
                let w = next.width() as f64;
                let changed = current.changed_lines(next);
                let change_pct = changed.len() as f64 / h;
                if change_pct > 0.7 {
                    return Strategy::FullRedraw;
                }
                let full_bytes = 2.0 * w * h;
                let delta_bytes = 10.0 * changed.len() as f64 + 2.0 * w * changed.len() as f64;
                let bytes_saved = if full_bytes > 0.0 {
                    (full_bytes - delta_bytes) / full_bytes
                } else {
                    0.0
                };
                if bytes_saved < thresholds.delta_threshold {
                    return Strategy::FullRedraw;
                }
                if detect_scroll(current, next).is_some() {
                    return Strategy::ScrollOptimized;
                }
                Strategy::DeltaUpdate
            }
        }
    }
}

/// The periodic full-redraw safety valve: forces a full redraw after too
/// many non-full renders, or after too long an interval, regardless of
/// what strategy selection would otherwise pick.
#[derive(Debug, Clone)]
pub struct FullRedrawPolicy {
    frames_since: u32,
    last_full_at: Option<Instant>,
    pub max_frames: u32,
    pub max_interval: Duration,
}

impl Default for FullRedrawPolicy {
    fn default() -> Self {
        Self {
            frames_since: 0,
            last_full_at: None,
            max_frames: 100,
            max_interval: Duration::from_secs(30),
        }
    }
}

impl FullRedrawPolicy {
    pub fn should_force(&self, now: Instant) -> bool {
        if self.frames_since >= self.max_frames {
            return true;
        }
        match self.last_full_at {
            None => false,
            Some(t) => now.duration_since(t) >= self.max_interval,
        }
    }

    /// Force the next `should_force` check to return true, regardless of
    /// elapsed frames or time.
    pub fn force_next(&mut self) {
        self.frames_since = self.max_frames;
    }

    /// Record the strategy actually used for a render, resetting the
    /// safety-valve counters on a full redraw.
    pub fn record(&mut self, strategy: Strategy, now: Instant) {
        if strategy == Strategy::FullRedraw {
            self.frames_since = 0;
            self.last_full_at = Some(now);
        } else {
            self.frames_since += 1;
        }
    }
}

/// Degrades under backpressure, floored at 0.3; never recovers on its own
/// (a fresh reconciler starts back at 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdaptiveQualityController {
    quality: f64,
}

impl Default for AdaptiveQualityController {
    fn default() -> Self {
        Self { quality: 1.0 }
    }
}

impl AdaptiveQualityController {
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// Multiply quality by 0.9, floored at 0.3. Called once per dropped
    /// frame.
    pub fn degrade(&mut self) {
        self.quality = (self.quality * 0.9).max(0.3);
    }

    /// Whether a grid should pass through unchanged rather than be
    /// downsampled. The default policy is always pass-through (downsampling
    /// is a reserved hook, per `spec.md` §4.3 / §9 open question 2); this
    /// still reports the condition under which a future implementation
    /// would kick in.
    pub fn would_downsample(&self, height: u16) -> bool {
        self.quality < 0.9 && height > 10
    }
}

/// Ring buffer of the last 10 render performances, used to adapt
/// `delta_threshold` toward whatever recently made delta updates worthwhile.
#[derive(Debug, Clone, Default)]
pub struct MetricsRecorder {
    history: std::collections::VecDeque<RenderStats>,
}

const HISTORY_CAP: usize = 10;
const ADAPT_WINDOW: usize = 5;

impl MetricsRecorder {
    pub fn record(&mut self, stats: RenderStats) {
        self.history.push_back(stats);
        while self.history.len() > HISTORY_CAP {
            self.history.pop_front();
        }
    }

    fn mean_recent_efficiency(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        let take = self.history.len().min(ADAPT_WINDOW);
        let sum: f64 = self.history.iter().rev().take(take).map(|s| s.efficiency()).sum();
        Some(sum / take as f64)
    }

    /// Adjust `thresholds.delta_threshold` based on the mean efficiency of
    /// the last 5 renders: raise it (favor full redraws) when delta updates
    /// have been inefficient, lower it when they've been paying off.
    pub fn adapt(&self, thresholds: &mut AdaptiveThresholds) {
        let Some(mean) = self.mean_recent_efficiency() else {
            return;
        };
        if mean < 0.3 {
            thresholds.delta_threshold += 0.05;
        } else if mean > 0.7 {
            thresholds.delta_threshold -= 0.05;
        }
        thresholds.clamp_delta();
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }
}

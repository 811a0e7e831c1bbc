//! The rendering-strategy family a caller asks for, per `spec.md` §6's
//! `optimizationMode` configuration knob.
//!
//! Lives here rather than in `core-reconcile` so that `core-config` (a
//! leaf consumed only by `runekit`) can parse and store it without
//! depending upward into the reconciler.

/// Which strategy family the reconciler should choose from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizationMode {
    FullRedraw,
    LineDiff,
    Automatic,
}

//! The rendering strategies: full redraw, line delta, and scroll-optimized,
//! plus the [`TerminalRenderer`] that emits them and the stats each render
//! call produces.

pub mod renderer;
pub mod scroll;
pub mod strategy;

pub use renderer::TerminalRenderer;
pub use scroll::{detect_scroll, ScrollDirection, ScrollShift};
pub use strategy::{RenderStats, Strategy};

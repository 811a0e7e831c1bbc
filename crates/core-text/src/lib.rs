//! Grapheme segmentation and display-width utilities shared by the cell,
//! render, and capture crates.
//!
//! Every component that slices terminal text into cells goes through
//! [`segment::normalize_and_segment`] for cluster boundaries and
//! [`width::egc_width`] for display width, so wide glyphs, ZWJ sequences,
//! and combining marks are measured identically everywhere.

pub mod segment;
pub mod width;

pub use width::{egc_width, egc_width_str};

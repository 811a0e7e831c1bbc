//! A single terminal grid position.

use bitflags::bitflags;
use core_text::egc_width;

bitflags! {
    /// Style attributes a cell may carry. Matches the SGR attribute set the
    /// renderer knows how to transition between.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Attributes: u8 {
        const BOLD          = 0b0000_0001;
        const DIM           = 0b0000_0010;
        const ITALIC        = 0b0000_0100;
        const UNDERLINE     = 0b0000_1000;
        const BLINK         = 0b0001_0000;
        const REVERSE       = 0b0010_0000;
        const STRIKETHROUGH = 0b0100_0000;
    }
}

/// A cell color: an 8-bit palette index or a 24-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Indexed(u8),
    Rgb(u8, u8, u8),
}

/// A single grid position: content, style, and derived display width.
///
/// Invariant: `width` is always `displayWidth(content)`, enforced by the
/// constructors below rather than left to callers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cell {
    /// A grapheme cluster. Empty for the continuation half of a wide glyph.
    pub content: String,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attributes,
    /// Display width in columns: 0, 1, or 2.
    pub width: u8,
}

impl Cell {
    /// Build a cell from a grapheme cluster, computing its display width.
    pub fn new(content: impl Into<String>, fg: Option<Color>, bg: Option<Color>, attrs: Attributes) -> Self {
        let content = content.into();
        let width = egc_width(&content).min(2) as u8;
        Self { content, fg, bg, attrs, width }
    }

    /// A blank cell: a single space, unstyled, width 1. Used to pad short
    /// rows and fill cleared regions.
    pub fn blank() -> Self {
        Self {
            content: " ".to_string(),
            fg: None,
            bg: None,
            attrs: Attributes::empty(),
            width: 1,
        }
    }

    /// The zero-width continuation half of a wide glyph occupying the
    /// previous column.
    pub fn continuation() -> Self {
        Self {
            content: String::new(),
            fg: None,
            bg: None,
            attrs: Attributes::empty(),
            width: 0,
        }
    }

    pub fn is_continuation(&self) -> bool {
        self.width == 0 && self.content.is_empty()
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::blank()
    }
}

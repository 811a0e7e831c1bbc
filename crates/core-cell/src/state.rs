//! SGR state tracking and style-transition-optimized row rendering.

use crate::ansi;
use crate::cell::{Attributes, Cell, Color};

/// The terminal's believed SGR state: the style that would be in effect if
/// the last cell written were repeated. Owned exclusively by whatever
/// component is currently writing (the renderer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalState {
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attrs: Attributes,
}

impl TerminalState {
    pub fn reset() -> Self {
        Self::default()
    }
}

fn emit_attrs(out: &mut String, attrs: Attributes) {
    if attrs.contains(Attributes::BOLD) {
        out.push_str("\x1b[1m");
    }
    if attrs.contains(Attributes::DIM) {
        out.push_str("\x1b[2m");
    }
    if attrs.contains(Attributes::ITALIC) {
        out.push_str("\x1b[3m");
    }
    if attrs.contains(Attributes::UNDERLINE) {
        out.push_str("\x1b[4m");
    }
    if attrs.contains(Attributes::BLINK) {
        out.push_str("\x1b[5m");
    }
    if attrs.contains(Attributes::REVERSE) {
        out.push_str("\x1b[7m");
    }
    if attrs.contains(Attributes::STRIKETHROUGH) {
        out.push_str("\x1b[9m");
    }
}

fn emit_fg(out: &mut String, fg: Option<Color>) {
    match fg {
        None => out.push_str(ansi::FG_RESET),
        Some(Color::Indexed(n)) => ansi::write_fg_indexed(out, n),
        Some(Color::Rgb(r, g, b)) => ansi::write_fg_rgb(out, r, g, b),
    }
}

fn emit_bg(out: &mut String, bg: Option<Color>) {
    match bg {
        None => out.push_str(ansi::BG_RESET),
        Some(Color::Indexed(n)) => ansi::write_bg_indexed(out, n),
        Some(Color::Rgb(r, g, b)) => ansi::write_bg_rgb(out, r, g, b),
    }
}

/// Transition `state` to the style `(fg, bg, attrs)`, appending only the
/// minimal control sequences needed, and update `state` in place.
///
/// - If any attribute is being removed, a full SGR reset is emitted and all
///   currently-required attributes are re-enabled (a reset also clears
///   color, so `state`'s fg/bg are forced to `None` before the fg/bg
///   comparison below, guaranteeing they get re-emitted if still set).
/// - Otherwise only the codes for newly-added attributes are emitted.
/// - Foreground/background are each emitted only when they differ from the
///   tracked state.
pub fn transition_to(state: &mut TerminalState, fg: Option<Color>, bg: Option<Color>, attrs: Attributes, out: &mut String) {
    let removing = state.attrs.difference(attrs);
    if !removing.is_empty() {
        out.push_str(ansi::SGR_RESET);
        state.attrs = Attributes::empty();
        state.fg = None;
        state.bg = None;
        emit_attrs(out, attrs);
        state.attrs = attrs;
    } else {
        let adding = attrs.difference(state.attrs);
        if !adding.is_empty() {
            emit_attrs(out, adding);
            state.attrs = attrs;
        }
    }
    if fg != state.fg {
        emit_fg(out, fg);
        state.fg = fg;
    }
    if bg != state.bg {
        emit_bg(out, bg);
        state.bg = bg;
    }
}

/// Render a full row, starting from `state`, appending the minimal control
/// sequences to transition through each cell's style followed by its
/// content. `state` is mutated to reflect the style after the last cell.
pub fn render_row(state: &mut TerminalState, row: &[Cell], out: &mut String) {
    for cell in row {
        transition_to(state, cell.fg, cell.bg, cell.attrs, out);
        out.push_str(&cell.content);
    }
}

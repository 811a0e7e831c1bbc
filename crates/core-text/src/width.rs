//! Grapheme cluster display width classification.
//!
//! A single authoritative function, [`egc_width`], returns the terminal
//! column width (0, 1, or 2) for a grapheme cluster. All cell content in
//! the rendering core must flow through this function rather than calling
//! `unicode_width` directly, so a single place owns the emoji/ZWJ/combining
//! heuristics.
//!
//! Width precedence:
//! 1. Classifier (semantic kind -> width mapping).
//! 2. Conservative widen fallback: if a pictographic or regional-indicator
//!    signal is present but the classifier landed on width 1, widen to 2
//!    to avoid visual drift rather than truncating a glyph.

/// Semantic classification of a single grapheme cluster (EGC).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EgcKind {
    Ascii,
    Narrow,
    Wide,
    EmojiSimple,     // single pictographic (with optional VS16), no modifiers
    EmojiModifier,   // emoji + skin tone modifier
    EmojiKeycap,     // keycap sequence (base + optional VS16 + U+20E3)
    EmojiFlag,       // regional indicator pair
    EmojiZwj,        // ZWJ sequence combining >=2 pictographic bases
    Combining(bool), // base + combining mark(s); true => base is wide/emoji
}

const ZWJ: char = '\u{200D}';
const VS16: char = '\u{FE0F}';
const KEYCAP_COMBINING: char = '\u{20E3}';

fn is_regional_indicator(c: char) -> bool {
    ('\u{1F1E6}'..='\u{1F1FF}').contains(&c)
}

fn is_skin_tone_modifier(c: char) -> bool {
    ('\u{1F3FB}'..='\u{1F3FF}').contains(&c)
}

fn is_extended_pictographic(c: char) -> bool {
    ('\u{1F300}'..='\u{1FAFF}').contains(&c) || ('\u{2600}'..='\u{27BF}').contains(&c)
}

fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036F}').contains(&c)
        || ('\u{1AB0}'..='\u{1AFF}').contains(&c)
        || ('\u{1DC0}'..='\u{1DFF}').contains(&c)
        || ('\u{20D0}'..='\u{20FF}').contains(&c)
        || ('\u{FE20}'..='\u{FE2F}').contains(&c)
}

fn classify(egc: &str) -> EgcKind {
    let mut chars = egc.chars().peekable();
    let Some(&first) = chars.peek() else {
        return EgcKind::Narrow;
    };
    let single = egc.chars().count() == 1;

    if single {
        if first.is_ascii() {
            return EgcKind::Ascii;
        }
        let uwidth = unicode_width::UnicodeWidthChar::width(first).unwrap_or(1);
        if is_extended_pictographic(first) {
            return EgcKind::EmojiSimple;
        }
        if uwidth == 2 {
            return EgcKind::Wide;
        }
        return EgcKind::Narrow;
    }

    let mut count_ep = 0usize;
    let mut count_ri = 0usize;
    let mut has_zwj = false;
    let mut has_skin = false;
    let mut has_combining = false;
    let mut keycap_base = false;
    let mut ends_with_keycap = false;
    let mut any_wide = false;
    let mut base_wide_or_emoji = false;
    let mut saw_non_mark_base = false;
    let count = egc.chars().count();

    for (i, c) in egc.chars().enumerate() {
        if is_extended_pictographic(c) {
            count_ep += 1;
        }
        if is_regional_indicator(c) {
            count_ri += 1;
        }
        if c == ZWJ {
            has_zwj = true;
        }
        let _ = VS16; // presentation hint only; folded into pictographic detection
        if is_skin_tone_modifier(c) {
            has_skin = true;
        }
        if is_combining_mark(c) {
            has_combining = true;
        }
        if c == KEYCAP_COMBINING && i == count - 1 {
            ends_with_keycap = true;
        }
        if !keycap_base && (c.is_ascii_digit() || c == '#' || c == '*') {
            keycap_base = true;
        }
        if unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) == 2 {
            any_wide = true;
        }
        if !saw_non_mark_base && !is_combining_mark(c) {
            saw_non_mark_base = true;
            if is_extended_pictographic(c)
                || unicode_width::UnicodeWidthChar::width(c).unwrap_or(1) == 2
            {
                base_wide_or_emoji = true;
            }
        }
    }

    if ends_with_keycap && keycap_base {
        return EgcKind::EmojiKeycap;
    }
    if count_ri == 2 && count == 2 {
        return EgcKind::EmojiFlag;
    }
    if has_zwj && count_ep >= 2 {
        return EgcKind::EmojiZwj;
    }
    if count_ep >= 1 && has_skin {
        return EgcKind::EmojiModifier;
    }
    if count_ep == 1 && !has_zwj {
        return EgcKind::EmojiSimple;
    }
    if has_combining {
        return EgcKind::Combining(base_wide_or_emoji);
    }
    if any_wide {
        return EgcKind::Wide;
    }
    if count_ep > 0 {
        return EgcKind::EmojiSimple;
    }
    EgcKind::Narrow
}

#[inline]
fn width_for_kind(kind: EgcKind) -> u16 {
    match kind {
        EgcKind::Ascii | EgcKind::Narrow => 1,
        EgcKind::Wide
        | EgcKind::EmojiSimple
        | EgcKind::EmojiModifier
        | EgcKind::EmojiKeycap
        | EgcKind::EmojiFlag
        | EgcKind::EmojiZwj => 2,
        EgcKind::Combining(base_wide) => {
            if base_wide {
                2
            } else {
                1
            }
        }
    }
}

/// Display column width (0, 1, or 2) of a single grapheme cluster.
///
/// Precondition: `egc` must be a single grapheme cluster (callers already
/// segment text before calling this).
#[inline]
pub fn egc_width(egc: &str) -> u16 {
    if egc.is_empty() {
        return 0;
    }
    let kind = classify(egc);
    let mut width = width_for_kind(kind);
    if width == 1 {
        let has_signal = egc
            .chars()
            .any(|c| is_extended_pictographic(c) || is_regional_indicator(c));
        if has_signal {
            width = 2;
        }
    }
    width
}

/// Convenience alias for a string already known to hold exactly one EGC.
#[inline]
pub fn egc_width_str(s: &str) -> u16 {
    egc_width(s)
}

//! `LogLane`: a pure formatter turning buffered log lines into styled
//! rows ready to stack above the live render region.

use crate::capture::{LogLine, Source};
use core_cell::{Attributes, Cell, Color};
use core_text::segment::normalize_and_segment;
use std::time::SystemTime;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogLaneConfig {
    pub max_display_lines: usize,
    pub show_timestamp: bool,
    pub show_source: bool,
    pub colors_enabled: bool,
    pub separator_char: char,
}

impl Default for LogLaneConfig {
    fn default() -> Self {
        Self {
            max_display_lines: 10,
            show_timestamp: true,
            show_source: true,
            colors_enabled: true,
            separator_char: '─',
        }
    }
}

fn format_timestamp(ts: SystemTime) -> String {
    let secs = ts.duration_since(SystemTime::UNIX_EPOCH).map(|d| d.as_secs()).unwrap_or(0);
    let day_secs = secs % 86_400;
    format!("{:02}:{:02}:{:02}", day_secs / 3600, (day_secs % 3600) / 60, day_secs % 60)
}

fn source_label(source: Source) -> &'static str {
    match source {
        Source::Stdout => "out",
        Source::Stderr => "err",
    }
}

fn source_color(source: Source) -> Color {
    match source {
        Source::Stdout => Color::Indexed(8), // dim gray
        Source::Stderr => Color::Indexed(1), // red
    }
}

fn display_width(s: &str) -> u16 {
    normalize_and_segment(s).1.iter().map(|seg| seg.width).sum()
}

fn pad_row(mut row: Vec<Cell>, width: u16) -> Vec<Cell> {
    while (row.len() as u16) < width {
        row.push(Cell::blank());
    }
    row.truncate(width as usize);
    row
}

/// Format one log line into one or more rows, wrapping by display column
/// (not byte length) and indenting continuation rows under the prefix.
fn format_one(line: &LogLine, config: &LogLaneConfig, width: u16) -> Vec<Vec<Cell>> {
    let width = width.max(1);
    let mut prefix = String::new();
    if config.show_timestamp {
        prefix.push('[');
        prefix.push_str(&format_timestamp(line.timestamp));
        prefix.push_str("] ");
    }
    if config.show_source {
        prefix.push_str(source_label(line.source));
        prefix.push(' ');
    }

    let prefix_width = display_width(&prefix).min(width.saturating_sub(1));
    let color = if config.colors_enabled { Some(source_color(line.source)) } else { None };

    let (_, prefix_segments) = normalize_and_segment(&prefix);
    let (_, content_segments) = normalize_and_segment(&line.content);

    let mut rows = Vec::new();
    let mut current: Vec<Cell> = Vec::new();
    let mut current_width: u16 = 0;

    for seg in &prefix_segments {
        current.push(Cell::new(seg.cluster.clone(), None, None, Attributes::DIM));
        if seg.width == 2 {
            current.push(Cell::continuation());
        }
        current_width += seg.width;
    }

    for seg in &content_segments {
        if current_width + seg.width > width && !current.is_empty() {
            rows.push(pad_row(std::mem::take(&mut current), width));
            current_width = 0;
            for _ in 0..prefix_width {
                current.push(Cell::blank());
                current_width += 1;
            }
        }
        current.push(Cell::new(seg.cluster.clone(), color, None, Attributes::empty()));
        if seg.width == 2 {
            current.push(Cell::continuation());
        }
        current_width += seg.width;
    }
    rows.push(pad_row(current, width));
    rows
}

fn separator_row(config: &LogLaneConfig, width: u16) -> Vec<Cell> {
    (0..width.max(1)).map(|_| Cell::new(config.separator_char.to_string(), None, None, Attributes::DIM)).collect()
}

/// Take the last `max_display_lines` entries, format and wrap each to
/// `width`, cap the total (discarding oldest overflow after wrapping), and
/// append a separator row. Pure: no I/O, no mutation of `lines`.
pub fn format_rows(lines: &[LogLine], config: &LogLaneConfig, width: u16) -> Vec<Vec<Cell>> {
    let recent: &[LogLine] = if lines.len() > config.max_display_lines {
        &lines[lines.len() - config.max_display_lines..]
    } else {
        lines
    };

    let mut rows = Vec::new();
    for line in recent {
        rows.extend(format_one(line, config, width));
    }
    if rows.len() > config.max_display_lines {
        let excess = rows.len() - config.max_display_lines;
        rows.drain(0..excess);
    }
    rows.push(separator_row(config, width));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(content: &str, source: Source) -> LogLine {
        LogLine { content: content.to_string(), timestamp: SystemTime::UNIX_EPOCH, source }
    }

    #[test]
    fn takes_only_last_max_display_lines() {
        let lines: Vec<LogLine> = (0..20).map(|i| line(&i.to_string(), Source::Stdout)).collect();
        let config = LogLaneConfig { max_display_lines: 3, show_timestamp: false, show_source: false, ..Default::default() };
        let rows = format_rows(&lines, &config, 40);
        // 3 content rows + 1 separator.
        assert_eq!(rows.len(), 4);
    }

    #[test]
    fn wraps_long_lines_by_display_width_and_indents_continuation() {
        let lines = vec![line("abcdefghij", Source::Stdout)];
        let config = LogLaneConfig { show_timestamp: false, show_source: false, colors_enabled: false, ..Default::default() };
        let rows = format_rows(&lines, &config, 4);
        // "abcd" / "efgh" / "ij  " + separator.
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0].iter().map(|c| c.content.as_str()).collect::<String>(), "abcd");
        assert_eq!(rows[1].iter().map(|c| c.content.as_str()).collect::<String>(), "efgh");
    }

    #[test]
    fn continuation_rows_are_indented_under_the_prefix() {
        let lines = vec![line("abcdefgh", Source::Stdout)];
        let config = LogLaneConfig { show_timestamp: false, show_source: true, colors_enabled: false, ..Default::default() };
        let rows = format_rows(&lines, &config, 8);
        let text = |row: &[Cell]| row.iter().map(|c| c.content.as_str()).collect::<String>();
        assert_eq!(text(&rows[0]), "out abcd");
        assert_eq!(text(&rows[1]), "    efgh");
    }

    #[test]
    fn separator_row_fills_width() {
        let config = LogLaneConfig::default();
        let row = separator_row(&config, 5);
        assert_eq!(row.len(), 5);
        assert!(row.iter().all(|c| c.content == "─"));
    }

    #[test]
    fn no_lines_still_emits_separator() {
        let config = LogLaneConfig::default();
        let rows = format_rows(&[], &config, 10);
        assert_eq!(rows.len(), 1);
    }
}

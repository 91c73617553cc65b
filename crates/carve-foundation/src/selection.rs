//! Selection normalization.
//!
//! Users select sloppily: a statement plus the indentation before it, the line
//! break after it, or the trailing semicolon. The normalizer trims the raw
//! selection so its coordinates coincide with the range the parser records for
//! the intended node(s), and converts them to parser space.

use crate::error::{ExtractError, ExtractResult};
use crate::position::{HostPosition, ParserPosition};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// The user's raw selection: host positions plus the exact selected text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionSpan {
    pub start: HostPosition,
    pub end: HostPosition,
    pub text: String,
}

impl SelectionSpan {
    pub fn new(start: HostPosition, end: HostPosition, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}

/// Trimmed selection in parser coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NormalizedRange {
    pub start: ParserPosition,
    pub end: ParserPosition,
}

/// Map a raw selection onto parser-space coordinates.
///
/// Fails with [`ExtractError::SpanMismatch`] when the selection holds nothing
/// but whitespace.
pub fn normalize_selection(selection: &SelectionSpan) -> ExtractResult<NormalizedRange> {
    let text = selection.text.as_str();
    let without_leading = text.trim_start();
    let trimmed = without_leading.trim_end();
    if trimmed.is_empty() {
        return Err(ExtractError::SpanMismatch);
    }

    let leading = &text[..text.len() - without_leading.len()];
    let trailing = &without_leading[trimmed.len()..];

    let mut start_line = selection.start.line + 1;
    let mut start_column = selection.start.character;
    let leading_breaks = line_breaks(leading);
    if leading_breaks == 0 {
        start_column += char_count(leading);
    } else {
        start_line += leading_breaks;
        start_column = width_after_last_break(leading);
    }

    let trailing_breaks = line_breaks(trailing);
    let end_line = (selection.end.line + 1).saturating_sub(trailing_breaks);
    let shrunk = i64::from(selection.end.character) - i64::from(char_count(trailing));
    let mut end_column = if trailing_breaks > 0 || shrunk <= 0 {
        recompute_end_column(trimmed, start_column)
    } else {
        shrunk as u32
    };

    if trimmed.ends_with(';') {
        end_column = end_column.saturating_sub(1);
    }

    let range = NormalizedRange {
        start: ParserPosition::new(start_line, start_column),
        end: ParserPosition::new(end_line, end_column),
    };
    trace!(start = ?selection.start, end = ?selection.end, ?range, "Normalized selection");
    Ok(range)
}

fn char_count(text: &str) -> u32 {
    text.chars().count() as u32
}

fn line_breaks(text: &str) -> u32 {
    text.matches('\n').count() as u32
}

fn width_after_last_break(text: &str) -> u32 {
    text.rsplit('\n').next().map(char_count).unwrap_or(0)
}

fn recompute_end_column(trimmed: &str, start_column: u32) -> u32 {
    match trimmed.rsplit_once('\n') {
        Some((_, last_line)) => char_count(last_line),
        None => start_column + char_count(trimmed),
    }
}

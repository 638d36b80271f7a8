//! Paragraph detection around a line.

use super::{Document, Position, Range};

/// Range of the contiguous non-blank lines around `line`.
///
/// Spans column 0 of the first line to the end of the last. A blank `line`
/// yields just that line. Indices past the end are clamped to the last line.
pub fn paragraph_range(document: &Document, line: usize) -> Range {
    let line = line.min(document.line_count() - 1);

    let mut start = line;
    while start > 0 && !document.is_blank(start - 1) {
        start -= 1;
    }

    let mut end = line;
    while end + 1 < document.line_count() && !document.is_blank(end + 1) {
        end += 1;
    }

    Range::new(Position::new(start, 0), document.line_end(end))
}

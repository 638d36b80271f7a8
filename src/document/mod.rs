//! Document model: lines, positions, ranges and selections.
//!
//! Columns and offsets count `char`s, not bytes. Line terminators are stripped
//! from the stored lines and re-applied when text is extracted, so offsets
//! include them (one char for `\n`, two for `\r\n`).

pub mod paragraph;

pub use paragraph::paragraph_range;

/// A (line, column) location in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

/// Half-open span between two positions. Always normalized so `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(a: Position, b: Position) -> Self {
        if a <= b {
            Self { start: a, end: b }
        } else {
            Self { start: b, end: a }
        }
    }

    /// Zero-width range at `pos`.
    pub fn empty(pos: Position) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Inclusive on both ends: a caret sitting right after the span is inside.
    pub fn contains(&self, pos: Position) -> bool {
        self.start <= pos && pos <= self.end
    }
}

/// Editor selection. `active` is where the caret is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Selection {
    pub anchor: Position,
    pub active: Position,
}

impl Selection {
    pub fn new(anchor: Position, active: Position) -> Self {
        Self { anchor, active }
    }

    /// Collapsed selection (a bare caret).
    pub fn caret(pos: Position) -> Self {
        Self {
            anchor: pos,
            active: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.active
    }

    pub fn range(&self) -> Range {
        Range::new(self.anchor, self.active)
    }
}

/// One replacement in a document: `old` is the range that was replaced, `new`
/// the range the inserted text occupies afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextChange {
    pub old: Range,
    pub new: Range,
}

impl TextChange {
    /// Where `pos` ends up after the change.
    ///
    /// Positions up to the start of the replaced range stay put, positions at
    /// or past its end move with the text that follows, and positions inside
    /// it collapse to the start of the new text.
    pub fn map(&self, pos: Position) -> Position {
        if pos <= self.old.start {
            pos
        } else if pos >= self.old.end {
            self.shift(pos)
        } else {
            self.new.start
        }
    }

    /// Move a position at or after the end of the replaced range.
    pub fn shift(&self, pos: Position) -> Position {
        if pos.line == self.old.end.line {
            Position::new(
                self.new.end.line,
                self.new.end.column + pos.column.saturating_sub(self.old.end.column),
            )
        } else {
            Position::new(
                self.new.end.line + pos.line.saturating_sub(self.old.end.line),
                pos.column,
            )
        }
    }
}

/// Line-based text buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    eol: &'static str,
}

impl Default for Document {
    fn default() -> Self {
        Self::new("")
    }
}

impl Document {
    /// Build a document from raw text. `\r\n` is detected and preserved.
    pub fn new(text: &str) -> Self {
        let eol = if text.contains("\r\n") { "\r\n" } else { "\n" };
        Self {
            lines: split_lines(text),
            eol,
        }
    }

    /// Line terminator used when joining lines.
    pub fn eol(&self) -> &str {
        self.eol
    }

    /// Full text, lines joined with the document's terminator.
    pub fn text(&self) -> String {
        self.lines.join(self.eol)
    }

    /// Number of lines. Never zero.
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Text of a line without its terminator. Out-of-range lines are empty.
    pub fn line(&self, index: usize) -> &str {
        self.lines.get(index).map(String::as_str).unwrap_or("")
    }

    /// Empty or whitespace-only.
    pub fn is_blank(&self, index: usize) -> bool {
        self.line(index).trim().is_empty()
    }

    /// Line length in chars.
    pub fn line_len(&self, index: usize) -> usize {
        self.line(index).chars().count()
    }

    pub fn line_end(&self, index: usize) -> Position {
        Position::new(index, self.line_len(index))
    }

    /// Position after the last char of the document.
    pub fn end(&self) -> Position {
        self.line_end(self.lines.len() - 1)
    }

    /// Snap a position onto the document.
    pub fn clamp(&self, pos: Position) -> Position {
        if pos.line >= self.lines.len() {
            return self.end();
        }
        Position::new(pos.line, pos.column.min(self.line_len(pos.line)))
    }

    /// Char offset of a position from the start of the document.
    pub fn offset_at(&self, pos: Position) -> usize {
        let pos = self.clamp(pos);
        let eol_len = self.eol.chars().count();
        let before: usize = self.lines[..pos.line]
            .iter()
            .map(|l| l.chars().count() + eol_len)
            .sum();
        before + pos.column
    }

    /// Inverse of [`offset_at`](Self::offset_at). Offsets inside a `\r\n`
    /// snap to the end of that line; offsets past the end snap to [`end`](Self::end).
    pub fn position_at(&self, offset: usize) -> Position {
        let eol_len = self.eol.chars().count();
        let mut remaining = offset;
        for (index, line) in self.lines.iter().enumerate() {
            let len = line.chars().count();
            if remaining <= len {
                return Position::new(index, remaining);
            }
            if remaining < len + eol_len {
                return Position::new(index, len);
            }
            remaining -= len + eol_len;
        }
        self.end()
    }

    /// Text covered by a range, joined with the document's terminator.
    pub fn text_in(&self, range: Range) -> String {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);
        if start.line == end.line {
            let line = self.line(start.line);
            return line[byte_index(line, start.column)..byte_index(line, end.column)].to_string();
        }

        let first = self.line(start.line);
        let mut out = first[byte_index(first, start.column)..].to_string();
        for line in &self.lines[start.line + 1..end.line] {
            out.push_str(self.eol);
            out.push_str(line);
        }
        let last = self.line(end.line);
        out.push_str(self.eol);
        out.push_str(&last[..byte_index(last, end.column)]);
        out
    }

    /// Rewrite line terminators in `text` to this document's style.
    pub fn normalize_eol(&self, text: &str) -> String {
        split_lines(text).join(self.eol)
    }

    /// Replace `range` with `text`. Returns the range the new text occupies.
    pub fn replace(&mut self, range: Range, text: &str) -> Range {
        let start = self.clamp(range.start);
        let end = self.clamp(range.end);

        let first = self.line(start.line);
        let head = first[..byte_index(first, start.column)].to_string();
        let last = self.line(end.line);
        let tail = last[byte_index(last, end.column)..].to_string();

        let mut inserted = split_lines(text);
        let count = inserted.len();
        let last_len = inserted[count - 1].chars().count();
        let new_end = if count == 1 {
            Position::new(start.line, start.column + last_len)
        } else {
            Position::new(start.line + count - 1, last_len)
        };

        inserted[0].insert_str(0, &head);
        inserted[count - 1].push_str(&tail);
        self.lines.splice(start.line..=end.line, inserted);

        Range::new(start, new_end)
    }
}

/// Split on `\n`, dropping a trailing `\r` from each piece. Always returns at least one line.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
        .collect()
}

/// Byte index of the `column`-th char, or the string length past the end.
fn byte_index(s: &str, column: usize) -> usize {
    s.char_indices().nth(column).map(|(i, _)| i).unwrap_or(s.len())
}

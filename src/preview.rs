//! Paint a document and its decorations for a terminal.
//!
//! Two looks: ANSI styling via crossterm, or plain word-diff markers
//! (`[-removed-]{+added+}`, ghost text as `{~text~}`) for pipes and tests.

use std::fmt::Write as _;

use crossterm::style::Stylize;

use crate::document::{Document, Position};
use crate::editor::{Decoration, DecorationKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintStyle {
    Ansi,
    Plain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Run {
    Normal,
    Removed,
    Ghost,
}

/// Render the lines in `lines` (inclusive) with their decorations.
pub fn paint<'a>(
    document: &Document,
    decorations: impl IntoIterator<Item = &'a Decoration>,
    lines: std::ops::RangeInclusive<usize>,
    style: PaintStyle,
) -> String {
    let decorations: Vec<&Decoration> = decorations.into_iter().collect();
    let mut out = Vec::new();
    for line in lines.filter(|&l| l < document.line_count()) {
        out.push(paint_line(document, &decorations, line, style));
    }
    out.join("\n")
}

fn paint_line(document: &Document, decorations: &[&Decoration], line: usize, style: PaintStyle) -> String {
    let chars: Vec<char> = document.line(line).chars().collect();
    let mut out = String::new();
    let mut run = String::new();
    let mut kind = Run::Normal;

    for column in 0..=chars.len() {
        let pos = Position::new(line, column);

        // Annotations anchored here go before the char at `pos`.
        let annotations: Vec<&str> = decorations
            .iter()
            .filter_map(|d| match &d.kind {
                DecorationKind::Replacement(text) if d.range.end == pos => Some(text.as_str()),
                DecorationKind::Insertion(text) if d.range.start == pos => Some(text.as_str()),
                _ => None,
            })
            .collect();
        if !annotations.is_empty() {
            flush(&mut out, &mut run, kind, style);
            for text in annotations {
                push_added(&mut out, text, style);
            }
        }

        let Some(&c) = chars.get(column) else { break };
        let next = run_kind(decorations, pos);
        if next != kind {
            flush(&mut out, &mut run, kind, style);
            kind = next;
        }
        run.push(c);
    }
    flush(&mut out, &mut run, kind, style);
    out
}

/// Style of the char starting at `pos`.
fn run_kind(decorations: &[&Decoration], pos: Position) -> Run {
    let covering = |d: &&&Decoration| d.range.start <= pos && pos < d.range.end;
    if decorations
        .iter()
        .filter(covering)
        .any(|d| d.kind == DecorationKind::Removed)
    {
        Run::Removed
    } else if decorations
        .iter()
        .filter(covering)
        .any(|d| d.kind == DecorationKind::Ghost)
    {
        Run::Ghost
    } else {
        Run::Normal
    }
}

fn flush(out: &mut String, run: &mut String, kind: Run, style: PaintStyle) {
    if run.is_empty() {
        return;
    }
    let text = std::mem::take(run);
    let _ = match (kind, style) {
        (Run::Normal, _) => write!(out, "{text}"),
        (Run::Removed, PaintStyle::Ansi) => write!(out, "{}", text.as_str().red().crossed_out()),
        (Run::Removed, PaintStyle::Plain) => write!(out, "[-{text}-]"),
        (Run::Ghost, PaintStyle::Ansi) => write!(out, "{}", text.as_str().dark_grey().italic()),
        (Run::Ghost, PaintStyle::Plain) => write!(out, "{{~{text}~}}"),
    };
}

fn push_added(out: &mut String, text: &str, style: PaintStyle) {
    let _ = match style {
        PaintStyle::Ansi => write!(out, "{}", text.green().bold()),
        PaintStyle::Plain => write!(out, "{{+{text}+}}"),
    };
}

//! Target text resolution: what a command operates on.

use tracing::debug;

use crate::document::{paragraph_range, Document, Position, Range, Selection};
use crate::editor::{EditorHost, Notice};

/// Minimum trimmed length, in chars, of text worth sending.
pub const MIN_TARGET_CHARS: usize = 10;

/// Text picked for a command and where it lives in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub text: String,
    pub range: Range,
}

/// Why no target could be picked. Shown to the user as information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
    #[error("No text found.")]
    NoText,
    #[error("Text must be at least 10 characters long.")]
    TooShort,
}

/// The selection if there is one, otherwise the paragraph under the caret.
pub fn resolve_target(document: &Document, selection: Selection) -> Result<Target, Rejection> {
    let range = if selection.is_empty() {
        paragraph_range(document, selection.active.line)
    } else {
        selection.range()
    };
    validate(Target {
        text: document.text_in(range),
        range,
    })
}

/// Everything from the start of the document up to the caret.
pub fn resolve_prefix(document: &Document, caret: Position) -> Result<Target, Rejection> {
    let range = Range::new(Position::default(), document.clamp(caret));
    validate(Target {
        text: document.text_in(range),
        range,
    })
}

fn validate(target: Target) -> Result<Target, Rejection> {
    debug!("Captured text length: {}", target.text.chars().count());
    let trimmed = target.text.trim();
    if trimmed.is_empty() {
        return Err(Rejection::NoText);
    }
    if trimmed.chars().count() < MIN_TARGET_CHARS {
        return Err(Rejection::TooShort);
    }
    Ok(target)
}

/// [`resolve_target`] against the host, reporting rejections as notices.
pub fn resolve(host: &mut dyn EditorHost) -> Option<Target> {
    let result = resolve_target(host.document(), host.selection());
    report(host, result)
}

/// [`resolve_prefix`] at the host's caret, reporting rejections as notices.
pub fn resolve_before_caret(host: &mut dyn EditorHost) -> Option<Target> {
    let caret = host.selection().active;
    let result = resolve_prefix(host.document(), caret);
    report(host, result)
}

fn report(host: &mut dyn EditorHost, result: Result<Target, Rejection>) -> Option<Target> {
    match result {
        Ok(target) => Some(target),
        Err(rejection) => {
            host.notify(Notice::info(rejection.to_string()));
            None
        }
    }
}

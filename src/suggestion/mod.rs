//! Suggestion state machine: the single pending proposal.
//!
//! Empty → PendingCompletion | PendingCorrection → Empty (accept or invalidate).
//!
//! A completion is inserted into the document right away and tracked as ghost
//! text; accepting keeps it, invalidating takes it out again. A correction is
//! only painted as a diff until accepted.
//!
//! Edits made here are counted by a reentrancy guard. Hosts report every edit
//! as [`EditorEvent::DocumentEdited`]; one count is consumed per event, so the
//! state's own edits never read as outside interference. An outside edit
//! before pending ghost text moves its span first, so invalidation still finds
//! and removes it.

use tracing::debug;

use crate::diff::render;
use crate::document::{Position, Range, Selection, TextChange};
use crate::editor::{Decoration, DecorationSet, EditorEvent, EditorHost};
use crate::target::Target;

/// Coarse state, for callers and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    PendingCompletion,
    PendingCorrection,
}

#[derive(Debug, Default)]
enum Pending {
    #[default]
    Empty,
    Completion {
        span: Range,
        text: String,
        decorations: DecorationSet,
    },
    Correction {
        range: Range,
        original: String,
        replacement: String,
        decorations: DecorationSet,
    },
}

/// Self edits not yet seen as `DocumentEdited` events.
#[derive(Debug, Default)]
struct EditGuard {
    outstanding: usize,
}

impl EditGuard {
    fn enter(&mut self) {
        self.outstanding += 1;
    }

    /// True when the edit being reported was one of ours.
    fn consume(&mut self) -> bool {
        if self.outstanding > 0 {
            self.outstanding -= 1;
            true
        } else {
            false
        }
    }
}

#[derive(Debug, Default)]
pub struct SuggestionState {
    pending: Pending,
    guard: EditGuard,
}

impl SuggestionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match self.pending {
            Pending::Empty => Phase::Empty,
            Pending::Completion { .. } => Phase::PendingCompletion,
            Pending::Correction { .. } => Phase::PendingCorrection,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.pending, Pending::Empty)
    }

    /// Span the pending suggestion is bound to.
    pub fn anchor(&self) -> Option<Range> {
        match &self.pending {
            Pending::Empty => None,
            Pending::Completion { span, .. } => Some(*span),
            Pending::Correction { range, .. } => Some(*range),
        }
    }

    /// Number of live decorations owned by the suggestion.
    pub fn decoration_count(&self) -> usize {
        match &self.pending {
            Pending::Empty => 0,
            Pending::Completion { decorations, .. } | Pending::Correction { decorations, .. } => {
                decorations.len()
            }
        }
    }

    fn self_edit(&mut self, host: &mut dyn EditorHost, range: Range, text: &str) -> Range {
        self.guard.enter();
        host.edit(range, text)
    }

    /// Paint `replacement` as a diff over `target`.
    ///
    /// Identical text changes nothing and returns `false`.
    pub fn propose_correction(&mut self, host: &mut dyn EditorHost, target: Target, replacement: String) -> bool {
        self.invalidate(host);
        if replacement == target.text {
            return false;
        }

        let decorations = render::render(host, &target.text, &replacement, target.range.start);
        debug!(decorations = decorations.len(), "correction pending");
        self.pending = Pending::Correction {
            range: target.range,
            original: target.text,
            replacement,
            decorations,
        };
        true
    }

    /// Insert `text` at `at` as ghost text. Empty text changes nothing.
    pub fn propose_completion(&mut self, host: &mut dyn EditorHost, at: Position, text: String) -> bool {
        self.invalidate(host);
        if text.is_empty() {
            return false;
        }

        let span = self.self_edit(host, Range::empty(at), &text);
        let mut decorations = DecorationSet::new();
        decorations.push(host.decorate(Decoration::ghost(span)));
        host.set_selection(Selection::caret(span.start));
        debug!(chars = text.chars().count(), "completion pending");
        self.pending = Pending::Completion {
            span,
            text,
            decorations,
        };
        true
    }

    /// Commit the pending suggestion. Returns `false` if nothing was pending.
    pub fn accept(&mut self, host: &mut dyn EditorHost) -> bool {
        match std::mem::take(&mut self.pending) {
            Pending::Empty => false,
            Pending::Completion {
                span,
                mut decorations,
                ..
            } => {
                decorations.dispose(host);
                host.set_selection(Selection::caret(span.end));
                debug!("completion accepted");
                true
            }
            Pending::Correction {
                range,
                replacement,
                mut decorations,
                ..
            } => {
                decorations.dispose(host);
                let new_range = self.self_edit(host, range, &replacement);
                host.set_selection(Selection::caret(new_range.end));
                debug!("correction accepted");
                true
            }
        }
    }

    /// Drop the pending suggestion without applying it.
    ///
    /// Ghost text is taken back out, provided the span still holds exactly it.
    pub fn invalidate(&mut self, host: &mut dyn EditorHost) {
        match std::mem::take(&mut self.pending) {
            Pending::Empty => {}
            Pending::Completion {
                span,
                text,
                mut decorations,
            } => {
                decorations.dispose(host);
                if host.document().text_in(span) == text {
                    let caret_inside = span.contains(host.selection().active);
                    self.self_edit(host, span, "");
                    if caret_inside {
                        host.set_selection(Selection::caret(span.start));
                    }
                }
                debug!("completion discarded");
            }
            Pending::Correction {
                mut decorations, ..
            } => {
                decorations.dispose(host);
                debug!("correction discarded");
            }
        }
    }

    /// React to an editor event. Returns `true` if it invalidated the suggestion.
    pub fn handle(&mut self, host: &mut dyn EditorHost, event: EditorEvent) -> bool {
        let outside = match event {
            EditorEvent::DocumentEdited(change) => {
                if self.guard.consume() {
                    false
                } else {
                    self.follow(change);
                    true
                }
            }
            EditorEvent::SelectionMoved(selection) => self
                .anchor()
                .is_some_and(|anchor| !anchor.contains(selection.anchor) || !anchor.contains(selection.active)),
        };

        if outside && !self.is_empty() {
            debug!(?event, "suggestion invalidated");
            self.invalidate(host);
            return true;
        }
        false
    }

    /// Keep ghost text tracked through an edit made before it. Edits touching
    /// the span leave it where it was.
    fn follow(&mut self, change: TextChange) {
        if let Pending::Completion { span, .. } = &mut self.pending {
            if change.old.end <= span.start {
                *span = Range::new(change.shift(span.start), change.shift(span.end));
            }
        }
    }

    /// Original text of a pending correction.
    pub fn original_text(&self) -> Option<&str> {
        match &self.pending {
            Pending::Correction { original, .. } => Some(original),
            _ => None,
        }
    }
}

//! In-memory editor host.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use super::{Decoration, DecorationId, EditorEvent, EditorHost, Notice};
use crate::document::{Document, Position, Range, Selection, TextChange};

/// Editor state held entirely in memory.
///
/// Every edit and every selection change is queued as an [`EditorEvent`];
/// notices are kept for the caller to display.
#[derive(Debug, Default)]
pub struct MemoryEditor {
    document: Document,
    selection: Selection,
    decorations: BTreeMap<DecorationId, Decoration>,
    next_id: u64,
    notices: Vec<Notice>,
    events: VecDeque<EditorEvent>,
}

impl MemoryEditor {
    /// Editor over `text` with the caret at the start.
    pub fn new(text: &str) -> Self {
        Self {
            document: Document::new(text),
            ..Self::default()
        }
    }

    /// Same as [`new`](Self::new) but with an initial selection (clamped).
    pub fn with_selection(text: &str, selection: Selection) -> Self {
        let mut editor = Self::new(text);
        editor.selection = Selection::new(
            editor.document.clamp(selection.anchor),
            editor.document.clamp(selection.active),
        );
        editor
    }

    /// Move the caret, as a user would.
    pub fn move_caret(&mut self, pos: Position) {
        self.set_selection(Selection::caret(pos));
    }

    pub fn decorations(&self) -> impl Iterator<Item = &Decoration> {
        self.decorations.values()
    }

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    /// Hand over the collected notices.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn text(&self) -> String {
        self.document.text()
    }
}

impl EditorHost for MemoryEditor {
    fn document(&self) -> &Document {
        &self.document
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn set_selection(&mut self, selection: Selection) {
        let selection = Selection::new(
            self.document.clamp(selection.anchor),
            self.document.clamp(selection.active),
        );
        if selection != self.selection {
            self.selection = selection;
            self.events.push_back(EditorEvent::SelectionMoved(selection));
        }
    }

    fn edit(&mut self, range: Range, text: &str) -> Range {
        let old = Range::new(self.document.clamp(range.start), self.document.clamp(range.end));
        let change = TextChange {
            old,
            new: self.document.replace(old, text),
        };
        debug!(?range, inserted = text.chars().count(), "document edited");
        self.events.push_back(EditorEvent::DocumentEdited(change));

        // Selection ends past the edit move with the text that follows it.
        let moved = Selection::new(
            self.document.clamp(change.map(self.selection.anchor)),
            self.document.clamp(change.map(self.selection.active)),
        );
        if moved != self.selection {
            self.selection = moved;
            self.events.push_back(EditorEvent::SelectionMoved(moved));
        }
        change.new
    }

    fn decorate(&mut self, decoration: Decoration) -> DecorationId {
        self.next_id += 1;
        let id = DecorationId(self.next_id);
        self.decorations.insert(id, decoration);
        id
    }

    fn undecorate(&mut self, id: DecorationId) {
        self.decorations.remove(&id);
    }

    fn notify(&mut self, notice: Notice) {
        debug!(level = ?notice.level, message = %notice.message, "notice");
        self.notices.push(notice);
    }

    fn poll_event(&mut self) -> Option<EditorEvent> {
        self.events.pop_front()
    }
}

//! Host editor abstraction.
//!
//! The pipeline talks to the editor only through [`EditorHost`]: read the
//! document and selection, make edits, attach and remove decorations, show
//! notices, and report what happened since the last poll. [`MemoryEditor`] is
//! the in-process implementation used by the CLI and the tests.

pub mod memory;

pub use memory::MemoryEditor;

use crate::document::{Document, Range, Selection, TextChange};

/// Handle for a decoration attached to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DecorationId(pub u64);

/// How a decorated span is drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecorationKind {
    /// Struck-through text the suggestion removes.
    Removed,
    /// Annotation shown right after the struck span.
    Replacement(String),
    /// Zero-width annotation for text the suggestion adds.
    Insertion(String),
    /// Not-yet-accepted completion text.
    Ghost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range,
    pub kind: DecorationKind,
}

impl Decoration {
    pub fn removed(range: Range) -> Self {
        Self {
            range,
            kind: DecorationKind::Removed,
        }
    }

    pub fn replacement(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            kind: DecorationKind::Replacement(text.into()),
        }
    }

    pub fn insertion(range: Range, text: impl Into<String>) -> Self {
        Self {
            range,
            kind: DecorationKind::Insertion(text.into()),
        }
    }

    pub fn ghost(range: Range) -> Self {
        Self {
            range,
            kind: DecorationKind::Ghost,
        }
    }
}

/// Decorations owned by one suggestion. Disposed together.
#[derive(Debug, Default)]
pub struct DecorationSet {
    ids: Vec<DecorationId>,
}

impl DecorationSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: DecorationId) {
        self.ids.push(id);
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Remove every decoration from the host. The set is empty afterwards.
    pub fn dispose(&mut self, host: &mut dyn EditorHost) {
        for id in self.ids.drain(..) {
            host.undecorate(id);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// User-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Something that happened in the editor since the last poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorEvent {
    SelectionMoved(Selection),
    /// The document changed. Hosts report every edit, including the ones the
    /// pipeline made itself.
    DocumentEdited(TextChange),
}

/// The editor surface the pipeline drives.
pub trait EditorHost {
    fn document(&self) -> &Document;

    fn selection(&self) -> Selection;

    fn set_selection(&mut self, selection: Selection);

    /// Replace `range` with `text`; returns the range of the new text.
    fn edit(&mut self, range: Range, text: &str) -> Range;

    fn decorate(&mut self, decoration: Decoration) -> DecorationId;

    fn undecorate(&mut self, id: DecorationId);

    fn notify(&mut self, notice: Notice);

    /// Next pending event, oldest first.
    fn poll_event(&mut self) -> Option<EditorEvent>;
}

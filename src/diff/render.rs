//! Map diff segments onto editor decorations.

use super::{diff_words, Segment};
use crate::document::{Document, Position, Range};
use crate::editor::{Decoration, DecorationSet, EditorHost};

/// Decorations showing how `original` (which starts at `anchor` in the
/// document) turns into `replacement`.
///
/// The running offset tracks the original text only, so `Added` segments
/// never advance it.
pub fn plan(document: &Document, original: &str, replacement: &str, anchor: Position) -> Vec<Decoration> {
    let segments = diff_words(original, replacement);
    let base = document.offset_at(anchor);
    let at = |offset: usize| document.position_at(base + offset);

    let mut decorations = Vec::new();
    let mut offset = 0;
    let mut i = 0;
    while i < segments.len() {
        match &segments[i] {
            Segment::Removed(text) => {
                let len = text.chars().count();
                let range = Range::new(at(offset), at(offset + len));
                decorations.push(Decoration::removed(range));
                if let Some(Segment::Added(added)) = segments.get(i + 1) {
                    decorations.push(Decoration::replacement(range, added.clone()));
                    i += 1;
                }
                offset += len;
            }
            Segment::Added(text) => {
                decorations.push(Decoration::insertion(Range::empty(at(offset)), text.clone()));
            }
            Segment::Unchanged(text) => {
                offset += text.chars().count();
            }
        }
        i += 1;
    }

    decorations
}

/// Paint the diff on the host. The returned set must be disposed before the
/// next render.
pub fn render(
    host: &mut dyn EditorHost,
    original: &str,
    replacement: &str,
    anchor: Position,
) -> DecorationSet {
    let planned = plan(host.document(), original, replacement, anchor);
    let mut set = DecorationSet::new();
    for decoration in planned {
        set.push(host.decorate(decoration));
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{DecorationKind, MemoryEditor};

    fn pos(line: usize, column: usize) -> Position {
        Position::new(line, column)
    }

    #[test]
    fn identical_text_plans_nothing() {
        let doc = Document::new("Nothing to fix here.");
        assert!(plan(&doc, doc.line(0), doc.line(0), pos(0, 0)).is_empty());
    }

    #[test]
    fn typo_fixes_are_two_replacements() {
        let doc = Document::new("Teh cat sat on teh mat.");
        let planned = plan(&doc, "Teh cat sat on teh mat.", "The cat sat on the mat.", pos(0, 0));

        assert_eq!(
            planned,
            vec![
                Decoration::removed(Range::new(pos(0, 0), pos(0, 3))),
                Decoration::replacement(Range::new(pos(0, 0), pos(0, 3)), "The"),
                Decoration::removed(Range::new(pos(0, 15), pos(0, 18))),
                Decoration::replacement(Range::new(pos(0, 15), pos(0, 18)), "the"),
            ]
        );
        assert!(!planned
            .iter()
            .any(|d| matches!(d.kind, DecorationKind::Insertion(_))));
    }

    #[test]
    fn positions_are_relative_to_anchor() {
        let doc = Document::new("Header\n\nI has a apple.");
        let planned = plan(&doc, "I has a apple.", "I have an apple.", pos(2, 0));
        let removed: Vec<_> = planned
            .iter()
            .filter(|d| d.kind == DecorationKind::Removed)
            .map(|d| doc.text_in(d.range))
            .collect();
        assert_eq!(removed, vec!["has", "a"]);
        assert!(planned.iter().all(|d| d.range.start.line == 2));
    }

    #[test]
    fn insertion_is_zero_width_at_original_offset() {
        let doc = Document::new("a big dog");
        let planned = plan(&doc, "a big dog", "a big brown dog", pos(0, 0));
        assert_eq!(planned.len(), 1);
        let d = &planned[0];
        assert!(d.range.is_empty());
        assert!(matches!(&d.kind, DecorationKind::Insertion(t) if t.trim() == "brown"));
        assert!(d.range.start.column == 5 || d.range.start.column == 6);
    }

    #[test]
    fn deletion_has_no_annotation() {
        let doc = Document::new("a very big dog");
        let planned = plan(&doc, "a very big dog", "a big dog", pos(0, 0));
        assert_eq!(planned.len(), 1);
        assert_eq!(planned[0].kind, DecorationKind::Removed);
        assert_eq!(doc.text_in(planned[0].range).trim(), "very");
    }

    #[test]
    fn spans_across_lines() {
        let doc = Document::new("first line\nsecond lien");
        let original = doc.text();
        let planned = plan(&doc, &original, "first line\nsecond line", pos(0, 0));
        assert_eq!(
            planned[0],
            Decoration::removed(Range::new(pos(1, 7), pos(1, 11)))
        );
    }

    #[test]
    fn render_returns_a_handle_per_decoration() {
        let mut host = MemoryEditor::new("Teh cat sat on teh mat.");
        let mut set = render(&mut host, "Teh cat sat on teh mat.", "The cat sat on the mat.", pos(0, 0));
        assert_eq!(set.len(), 4);
        assert_eq!(host.decorations().count(), 4);

        set.dispose(&mut host);
        assert_eq!(host.decorations().count(), 0);
    }
}

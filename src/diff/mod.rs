//! Word-level diff between an original text and a suggested replacement.
//!
//! Tokens are words and whitespace runs (`similar`'s word tokenizer). Each
//! change block comes out as its removed text followed by its added text, and
//! neighbouring tokens with the same tag are merged into one segment.

pub mod render;

use similar::{ChangeTag, TextDiff};

/// One run of the diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Unchanged(String),
    Removed(String),
    Added(String),
}

impl Segment {
    pub fn text(&self) -> &str {
        match self {
            Segment::Unchanged(s) | Segment::Removed(s) | Segment::Added(s) => s,
        }
    }
}

/// Diff two strings word by word.
pub fn diff_words(original: &str, replacement: &str) -> Vec<Segment> {
    let diff = TextDiff::from_words(original, replacement);
    let mut segments = Vec::new();
    let mut removed = String::new();
    let mut added = String::new();

    for change in diff.iter_all_changes() {
        match change.tag() {
            ChangeTag::Equal => {
                flush_block(&mut segments, &mut removed, &mut added);
                match segments.last_mut() {
                    Some(Segment::Unchanged(text)) => text.push_str(change.value()),
                    _ => segments.push(Segment::Unchanged(change.value().to_string())),
                }
            }
            ChangeTag::Delete => removed.push_str(change.value()),
            ChangeTag::Insert => added.push_str(change.value()),
        }
    }
    flush_block(&mut segments, &mut removed, &mut added);

    segments
}

fn flush_block(segments: &mut Vec<Segment>, removed: &mut String, added: &mut String) {
    if !removed.is_empty() {
        segments.push(Segment::Removed(std::mem::take(removed)));
    }
    if !added.is_empty() {
        segments.push(Segment::Added(std::mem::take(added)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_text_is_one_unchanged_segment() {
        let segments = diff_words("The cat sat.", "The cat sat.");
        assert_eq!(segments, vec![Segment::Unchanged("The cat sat.".into())]);
    }

    #[test]
    fn typo_fixes_become_removed_added_pairs() {
        let segments = diff_words("Teh cat sat on teh mat.", "The cat sat on the mat.");
        assert_eq!(
            segments,
            vec![
                Segment::Removed("Teh".into()),
                Segment::Added("The".into()),
                Segment::Unchanged(" cat sat on ".into()),
                Segment::Removed("teh".into()),
                Segment::Added("the".into()),
                Segment::Unchanged(" mat.".into()),
            ]
        );
    }

    #[test]
    fn pure_insertion() {
        let segments = diff_words("a big dog", "a big brown dog");
        assert!(segments.iter().all(|s| !matches!(s, Segment::Removed(_))));
        let added: String = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Added(t) => Some(t.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(added.trim(), "brown");
    }

    #[test]
    fn pure_deletion() {
        let segments = diff_words("a very big dog", "a big dog");
        assert!(segments.iter().all(|s| !matches!(s, Segment::Added(_))));
        assert!(segments.iter().any(|s| matches!(s, Segment::Removed(_))));
    }

    #[test]
    fn segments_rebuild_both_sides() {
        let original = "One two three.\nFour five.";
        let replacement = "One 2 three!\nFour, five and six.";
        let segments = diff_words(original, replacement);

        let old: String = segments
            .iter()
            .filter(|s| !matches!(s, Segment::Added(_)))
            .map(Segment::text)
            .collect();
        let new: String = segments
            .iter()
            .filter(|s| !matches!(s, Segment::Removed(_)))
            .map(Segment::text)
            .collect();
        assert_eq!(old, original);
        assert_eq!(new, replacement);
    }

    #[test]
    fn empty_inputs() {
        assert!(diff_words("", "").is_empty());
        assert_eq!(diff_words("", "new"), vec![Segment::Added("new".into())]);
        assert_eq!(diff_words("old", ""), vec![Segment::Removed("old".into())]);
    }
}

//! Blame maps: which commit authored which part of the document.
//!
//! A blame map is a list of spans sorted by `from`, never overlapping, and
//! never holding two touching spans of the same commit (those are merged).
//!
//! Maintaining the map across an edit is two passes:
//!
//! 1. Every existing span is carried through the edit's mapping. The start
//!    maps with `Bias::Right` and the end with `Bias::Left`, so content
//!    inserted exactly at a span boundary is not absorbed by that span.
//!    Spans that shrink to nothing are dropped.
//! 2. The content each step inserted is attributed to the editing commit.
//!
//! Boundary convention: text inserted at the edge of another commit's span
//! starts a new span; text inserted at the edge of a span of the same
//! commit extends it.

use serde::{Deserialize, Serialize};
use transform::{Bias, Mappable, Mapping};

use crate::id::CommitId;

/// A half-open range of the document attributed to a commit.
///
/// `commit` is `None` for content with no known author.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub from: usize,
    pub to: usize,
    pub commit: Option<CommitId>,
}

impl Span {
    /// Create a new span.
    pub fn new(from: usize, to: usize, commit: Option<CommitId>) -> Span {
        return Span { from, to, commit };
    }

    /// The number of characters covered.
    pub fn len(&self) -> usize {
        return self.to - self.from;
    }

    /// Return true if the span covers nothing.
    pub fn is_empty(&self) -> bool {
        return self.from == self.to;
    }

    fn is_by(&self, commit: &CommitId) -> bool {
        return self.commit.as_ref() == Some(commit);
    }
}

/// Attribute `from..to` to `commit` in an already valid blame map.
///
/// Same-commit spans that overlap or touch the range are merged into it.
/// Spans of other commits lose whatever part the range covers, which may
/// split one span in two. Zero-width ranges are ignored.
pub fn insert_into_blame_map(map: &mut Vec<Span>, from: usize, to: usize, commit: &CommitId) {
    if from >= to {
        return;
    }
    let mut from = from;
    let mut to = to;

    // Find the first span that could interact with the range
    let mut pos = 0;
    while pos < map.len() {
        let next = &map[pos];
        if next.is_by(commit) && next.to >= from {
            break;
        }
        if next.to > from {
            if next.from < from {
                // Sticks out to the left; the loop below trims the right side
                let left = Span::new(next.from, from, next.commit);
                if next.to > to {
                    map.insert(pos, left);
                } else {
                    map[pos] = left;
                }
                pos += 1;
            }
            break;
        }
        pos += 1;
    }

    // Absorb or trim everything the range reaches
    while pos < map.len() {
        let next = &map[pos];
        if next.is_by(commit) {
            if next.from > to {
                break;
            }
            from = from.min(next.from);
            to = to.max(next.to);
            map.remove(pos);
        } else if next.from >= to {
            break;
        } else if next.to > to {
            map[pos] = Span::new(to, next.to, next.commit);
            break;
        } else {
            map.remove(pos);
        }
    }

    map.insert(pos, Span::new(from, to, Some(*commit)));
}

/// Carry a blame map through `mapping`, attributing inserted content to
/// `commit`.
pub fn update_blame(blame: &[Span], mapping: &Mapping, commit: &CommitId) -> Vec<Span> {
    let mut result = Vec::with_capacity(blame.len() + mapping.len());

    for span in blame {
        let from = mapping.map(span.from, Bias::Right);
        let to = mapping.map(span.to, Bias::Left);
        if from < to {
            result.push(Span::new(from, to, span.commit));
        }
    }

    for (i, map) in mapping.maps().iter().enumerate() {
        let after = mapping.slice(i + 1);
        for change in map.changes() {
            let from = after.map(change.new_start, Bias::Right);
            let to = after.map(change.new_end, Bias::Left);
            insert_into_blame_map(&mut result, from, to, commit);
        }
    }

    return result;
}

/// The commit that authored the content at `pos`, if any.
///
/// Spans are inclusive at both ends here, so a position on the boundary of
/// two spans resolves to the earlier one.
pub fn find_in_blame(blame: &[Span], pos: usize) -> Option<CommitId> {
    return blame
        .iter()
        .filter(|span| span.from <= pos && pos <= span.to)
        .find_map(|span| span.commit);
}

/// Check the ordering invariant: sorted, non-overlapping, non-inverted.
pub fn is_well_formed(blame: &[Span]) -> bool {
    let mut last_to = 0;
    for span in blame {
        if span.from > span.to || span.from < last_to {
            return false;
        }
        last_to = span.to;
    }
    return true;
}

/// A display annotation for one attributed span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Decoration {
    pub from: usize,
    pub to: usize,
    pub commit: CommitId,
    pub label: Option<String>,
}

impl Decoration {
    /// A point marker rather than a range.
    pub fn is_point(&self) -> bool {
        return self.from == self.to;
    }

    /// The presentation class, e.g. `blame-focused` or `blame-point`.
    pub fn class(&self, prefix: &str) -> String {
        let mut parts = vec![prefix];
        if let Some(label) = &self.label {
            parts.push(label);
        }
        if self.is_point() {
            parts.push("point");
        }
        return parts.join("-");
    }
}

/// Project the attributed spans of a blame map into decorations, labelled
/// by the caller.
pub fn decorate_blame<'a, F>(blame: &[Span], labelling: F) -> Vec<Decoration>
where
    F: Fn(&CommitId) -> Option<&'a str>,
{
    return blame
        .iter()
        .filter_map(|span| {
            let commit = span.commit?;
            return Some(Decoration {
                from: span.from,
                to: span.to,
                commit,
                label: labelling(&commit).map(str::to_string),
            });
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;
    use transform::{Doc, Transform};

    fn spans(map: &[Span]) -> Vec<(usize, usize)> {
        return map.iter().map(|s| (s.from, s.to)).collect();
    }

    #[test]
    fn insert_into_empty_map() {
        let c = CommitId::generate();
        let mut map = Vec::new();
        insert_into_blame_map(&mut map, 3, 5, &c);
        assert_eq!(map, vec![Span::new(3, 5, Some(c))]);
    }

    #[test]
    fn zero_width_insert_is_ignored() {
        let c = CommitId::generate();
        let mut map = Vec::new();
        insert_into_blame_map(&mut map, 3, 3, &c);
        assert!(map.is_empty());
    }

    #[test]
    fn touching_same_commit_spans_merge() {
        let c = CommitId::generate();
        let mut map = Vec::new();
        insert_into_blame_map(&mut map, 3, 5, &c);
        insert_into_blame_map(&mut map, 5, 8, &c);
        insert_into_blame_map(&mut map, 1, 3, &c);
        assert_eq!(map, vec![Span::new(1, 8, Some(c))]);
    }

    #[test]
    fn separated_same_commit_spans_stay_apart() {
        let c = CommitId::generate();
        let mut map = Vec::new();
        insert_into_blame_map(&mut map, 3, 5, &c);
        insert_into_blame_map(&mut map, 10, 12, &c);
        assert_eq!(spans(&map), vec![(3, 5), (10, 12)]);
    }

    #[test]
    fn other_commit_span_is_split() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let mut map = vec![Span::new(0, 10, Some(a))];
        insert_into_blame_map(&mut map, 4, 6, &b);
        assert_eq!(
            map,
            vec![
                Span::new(0, 4, Some(a)),
                Span::new(4, 6, Some(b)),
                Span::new(6, 10, Some(a)),
            ]
        );
    }

    #[test]
    fn other_commit_spans_are_trimmed_and_removed() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let c = CommitId::generate();
        let mut map = vec![
            Span::new(0, 5, Some(a)),
            Span::new(5, 7, Some(b)),
            Span::new(7, 12, Some(a)),
        ];
        insert_into_blame_map(&mut map, 3, 9, &c);
        assert_eq!(
            map,
            vec![
                Span::new(0, 3, Some(a)),
                Span::new(3, 9, Some(c)),
                Span::new(9, 12, Some(a)),
            ]
        );
    }

    #[test]
    fn merge_reaches_across_overwritten_spans() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let mut map = vec![
            Span::new(0, 2, Some(a)),
            Span::new(2, 4, Some(b)),
            Span::new(4, 6, Some(a)),
        ];
        insert_into_blame_map(&mut map, 2, 4, &a);
        assert_eq!(map, vec![Span::new(0, 6, Some(a))]);
    }

    #[test]
    fn unattributed_spans_are_overwritten() {
        let c = CommitId::generate();
        let mut map = vec![Span::new(0, 20, None)];
        insert_into_blame_map(&mut map, 5, 6, &c);
        assert_eq!(
            map,
            vec![Span::new(0, 5, None), Span::new(5, 6, Some(c)), Span::new(6, 20, None)]
        );
    }

    #[test]
    fn update_blame_attributes_insertions() {
        let c = CommitId::generate();
        let mut tr = Transform::new(Doc::new("0123456789"));
        tr.insert(3, "ab").unwrap();
        tr.insert(5, "c").unwrap();
        let blame = update_blame(&[], tr.mapping(), &c);
        assert_eq!(blame, vec![Span::new(3, 6, Some(c))]);
    }

    #[test]
    fn update_blame_does_not_absorb_neighbors() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let blame = vec![Span::new(2, 4, Some(a))];
        let mut tr = Transform::new(Doc::new("0123456789"));
        tr.insert(4, "x").unwrap();
        tr.insert(2, "y").unwrap();
        let updated = update_blame(&blame, tr.mapping(), &b);
        assert_eq!(
            updated,
            vec![
                Span::new(2, 3, Some(b)),
                Span::new(3, 5, Some(a)),
                Span::new(5, 6, Some(b)),
            ]
        );
    }

    #[test]
    fn update_blame_drops_deleted_spans() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let blame = vec![Span::new(2, 4, Some(a)), Span::new(6, 8, Some(a))];
        let mut tr = Transform::new(Doc::new("0123456789"));
        tr.delete(1, 5).unwrap();
        let updated = update_blame(&blame, tr.mapping(), &b);
        assert_eq!(updated, vec![Span::new(2, 4, Some(a))]);
    }

    #[test]
    fn update_blame_shrinks_partially_deleted_spans() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let blame = vec![Span::new(2, 8, Some(a))];
        let mut tr = Transform::new(Doc::new("0123456789"));
        tr.replace(6, 9, "z").unwrap();
        let updated = update_blame(&blame, tr.mapping(), &b);
        assert_eq!(updated, vec![Span::new(2, 6, Some(a)), Span::new(6, 7, Some(b))]);
    }

    #[test]
    fn find_prefers_earlier_span_on_boundary() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let blame = vec![Span::new(0, 3, Some(a)), Span::new(3, 6, Some(b))];
        assert_eq!(find_in_blame(&blame, 1), Some(a));
        assert_eq!(find_in_blame(&blame, 3), Some(a));
        assert_eq!(find_in_blame(&blame, 4), Some(b));
        assert_eq!(find_in_blame(&blame, 7), None);
    }

    #[test]
    fn find_skips_unattributed_spans() {
        let a = CommitId::generate();
        let blame = vec![Span::new(0, 3, None), Span::new(3, 6, Some(a))];
        assert_eq!(find_in_blame(&blame, 1), None);
        assert_eq!(find_in_blame(&blame, 3), Some(a));
    }

    #[test]
    fn well_formed_check() {
        let a = CommitId::generate();
        assert!(is_well_formed(&[Span::new(0, 2, Some(a)), Span::new(2, 4, None)]));
        assert!(!is_well_formed(&[Span::new(0, 3, Some(a)), Span::new(2, 4, None)]));
        assert!(!is_well_formed(&[Span::new(3, 2, Some(a))]));
    }

    #[test]
    fn decorations_skip_unattributed_and_label() {
        let a = CommitId::generate();
        let b = CommitId::generate();
        let blame = vec![
            Span::new(0, 2, None),
            Span::new(2, 4, Some(a)),
            Span::new(6, 6, Some(b)),
        ];
        let decorations = decorate_blame(&blame, |id| if *id == a { Some("focused") } else { None });
        assert_eq!(decorations.len(), 2);
        assert_eq!(decorations[0].class("blame"), "blame-focused");
        assert!(!decorations[0].is_point());
        assert_eq!(decorations[1].class("blame"), "blame-point");
        assert!(decorations[1].is_point());
    }
}

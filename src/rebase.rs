//! Rewriting history.
//!
//! Both rewrites here rebuild a chain commit by commit, root first, while
//! threading a `Mapping` from "where the original commit's steps were
//! authored" to "where the rewritten chain currently is".
//!
//! - `rewind_and_playback` drops chosen commits. A dropped commit adds no
//!   commit to the result; its inverted steps are prepended to the mapping
//!   so everything after it is re-expressed without it.
//! - `cherry_pick` replays one chain on top of another.
//!
//! Mapping composition always inverts the older steps first and then
//! appends newer maps forward. Each rebased step is recorded as the mirror
//! of the inverted original, which lets later steps recover positions
//! inside content the original created.
//!
//! Every surviving commit gets a fresh id; identity is not preserved.

use std::sync::Arc;

use rustc_hash::FxHashSet;
use transform::{Mapping, Step};

use crate::blame::update_blame;
use crate::commit::Commit;
use crate::id::CommitId;

/// The result of a rewrite: the new head (if any commit survived) and the
/// mapping from the original head's document to the new one.
#[derive(Debug)]
pub struct Rebased {
    pub commit: Option<Arc<Commit>>,
    pub mapping: Mapping,
}

/// A mapping undoing `steps`, newest first.
fn reverse_mapping(steps: &[Step]) -> Mapping {
    return Mapping::from_maps(steps.iter().rev().map(|step| step.get_map().invert()));
}

/// Re-express `pick`'s steps on top of `onto`.
///
/// `inner` maps from the document `pick`'s parent produced to the document
/// `onto` produces.
fn rebase(pick: &Commit, onto: Option<Arc<Commit>>, inner: &Mapping) -> (Arc<Commit>, Mapping) {
    let count = pick.steps().len();
    let mut mapping = reverse_mapping(pick.steps());
    mapping.append_mapping(inner);

    let mut steps = Vec::with_capacity(count);
    for (i, step) in pick.steps().iter().enumerate() {
        // Index of this step's inverse in the mapping. Map through everything
        // after it: the inverses of earlier steps, the inner mapping, and the
        // steps rebased so far.
        let inverse = count - 1 - i;
        match step.map(&mapping.slice(inverse + 1)) {
            Some(rebased) => {
                mapping.append_map(rebased.get_map(), Some(inverse));
                steps.push(rebased);
            }
            None => {
                tracing::debug!(commit = %pick.id(), step = i, "dropping step that no longer applies");
            }
        }
    }

    let id = CommitId::generate();
    let step_mapping = Mapping::from_maps(steps.iter().map(Step::get_map));
    let blame = match &onto {
        Some(parent) => update_blame(parent.blame(), &step_mapping, &id),
        None => update_blame(&[], &step_mapping, &id),
    };
    tracing::trace!(from = %pick.id(), to = %id, steps = steps.len(), "rebased commit");

    let commit = Arc::new(Commit::new(id, steps, blame, onto));
    return (commit, mapping);
}

/// Rebuild the chain ending at `commit` without the commits in `excluded`.
///
/// Replaying the result's steps on the base document gives the original
/// document minus the direct contributions of the excluded commits. Steps
/// that only made sense on top of excluded content are dropped.
pub fn rewind_and_playback(commit: &Commit, excluded: &[CommitId]) -> Rebased {
    let excluded: FxHashSet<CommitId> = excluded.iter().copied().collect();

    let mut head: Option<Arc<Commit>> = None;
    let mut mapping = Mapping::new();
    for current in commit.chain() {
        if excluded.contains(&current.id()) {
            let mut rewound = reverse_mapping(current.steps());
            rewound.append_mapping(&mapping);
            mapping = rewound;
            continue;
        }
        let (rebased, next) = rebase(current, head.take(), &mapping);
        head = Some(rebased);
        mapping = next;
    }

    tracing::debug!(
        head = %commit.id(),
        excluded = excluded.len(),
        commits = head.as_ref().map(|c| c.len()).unwrap_or(0),
        "rewound history"
    );
    return Rebased { commit: head, mapping };
}

fn same_commit(a: &Commit, b: &Commit) -> bool {
    return std::ptr::eq(a, b) || (a.id() == b.id() && a.steps() == b.steps());
}

/// Replay `pick`'s chain on top of `onto`.
///
/// Commits shared by both chains are common ancestry and are not replayed.
/// Two commits are shared if they are the same allocation, or if they carry
/// the same id and the same steps (as after loading both chains from disk).
/// The rest of `pick` is re-expressed as if it had been authored starting
/// from `onto`'s document.
///
/// This does not rewind `onto` and replay only `pick`'s head commit: every
/// unshared commit of `pick` is replayed, starting from the forward mapping
/// of `onto`'s commits after the fork, so a pick with no parent still lands
/// in `onto`'s coordinates.
pub fn cherry_pick(pick: &Commit, onto: &Arc<Commit>) -> Rebased {
    let pick_chain = pick.chain();
    let onto_chain = onto.chain();

    // Length of the shared prefix
    let shared = pick_chain
        .iter()
        .zip(onto_chain.iter())
        .take_while(|(a, b)| same_commit(a, b))
        .count();

    let mut mapping = Mapping::from_maps(
        onto_chain[shared..]
            .iter()
            .flat_map(|c| c.steps().iter().map(Step::get_map)),
    );
    let mut head = onto.clone();
    for current in &pick_chain[shared..] {
        let (rebased, next) = rebase(current, Some(head), &mapping);
        head = rebased;
        mapping = next;
    }

    tracing::debug!(
        pick = %pick.id(),
        onto = %onto.id(),
        shared,
        replayed = pick_chain.len() - shared,
        "cherry-picked history"
    );
    return Rebased { commit: Some(head), mapping };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blame::Span;
    use crate::commit::initial_commit;
    use transform::{Doc, Transform};

    const BASE: &str = "This is the initial state of the document before any edits have been made.";

    fn replay(steps: &[Step]) -> Doc {
        let mut tr = Transform::new(Doc::new(BASE));
        for step in steps {
            tr.step(step.clone()).unwrap();
        }
        return tr.into_doc();
    }

    fn edit(commit: &Arc<Commit>, f: impl FnOnce(&mut Transform)) -> Arc<Commit> {
        let mut tr = Transform::new(replay(&commit.all_steps()));
        f(&mut tr);
        return commit.apply_transform(&tr);
    }

    fn ranges(blame: &[Span]) -> Vec<(usize, usize)> {
        return blame
            .iter()
            .filter(|s| s.commit.is_some())
            .map(|s| (s.from, s.to))
            .collect();
    }

    #[test]
    fn replays_all_steps() {
        let next = edit(&initial_commit(), |tr| {
            tr.insert(53, "B").unwrap();
            tr.insert(60, "A").unwrap();
        });
        let rebased = rewind_and_playback(&next, &[]).commit.unwrap();
        assert_ne!(rebased.id(), next.id());
        assert_eq!(ranges(rebased.blame()), ranges(next.blame()));
        assert_eq!(replay(rebased.steps()), replay(next.steps()));
    }

    #[test]
    fn remaps_out_of_order_steps() {
        let next = edit(&initial_commit(), |tr| {
            tr.insert(60, "A").unwrap();
            tr.insert(53, "B").unwrap();
        });
        let rebased = rewind_and_playback(&next, &[]).commit.unwrap();
        assert_eq!(ranges(rebased.blame()), ranges(next.blame()));
        assert_eq!(replay(rebased.steps()), replay(next.steps()));
    }

    #[test]
    fn remaps_deletions() {
        let next = edit(&initial_commit(), |tr| {
            tr.delete(53, 60).unwrap();
        });
        let rebased = rewind_and_playback(&next, &[]).commit.unwrap();
        assert_eq!(ranges(rebased.blame()), ranges(next.blame()));
        assert_eq!(replay(rebased.steps()), replay(next.steps()));
    }

    #[test]
    fn remaps_edits_inside_earlier_commits() {
        let first = edit(&initial_commit(), |tr| {
            tr.insert(10, "hello").unwrap();
        });
        let second = edit(&first.freeze(), |tr| {
            tr.delete(11, 13).unwrap();
            tr.insert(12, "y").unwrap();
        });
        let rebased = rewind_and_playback(&second, &[]).commit.unwrap();
        assert_eq!(rebased.len(), 2);
        assert_eq!(replay(&rebased.all_steps()), replay(&second.all_steps()));
        assert_eq!(ranges(rebased.blame()), ranges(second.blame()));
    }

    #[test]
    fn excluding_a_commit_removes_its_span() {
        let first = edit(&initial_commit(), |tr| {
            tr.insert(60, "A").unwrap();
        });
        let second = edit(&first.freeze(), |tr| {
            tr.insert(53, "B").unwrap();
        });

        let rebased = rewind_and_playback(&second, &[first.id()]).commit.unwrap();
        assert_eq!(second.blame().len(), 2);
        assert_eq!(rebased.blame().len(), 1);
        assert_eq!(rebased.blame()[0].from, second.blame()[0].from);
        assert_eq!(rebased.blame()[0].to, second.blame()[0].to);
        assert_eq!(rebased.len(), 1);

        let expected = Doc::new(BASE).replace(53, 53, "B").unwrap();
        assert_eq!(replay(&rebased.all_steps()), expected);
    }

    #[test]
    fn steps_inside_excluded_content_are_dropped() {
        let first = edit(&initial_commit(), |tr| {
            tr.insert(10, "hello").unwrap();
        });
        let second = edit(&first.freeze(), |tr| {
            tr.insert(12, "x").unwrap();
            tr.insert(0, ">").unwrap();
        });

        let rebased = rewind_and_playback(&second, &[first.id()]).commit.unwrap();
        assert_eq!(rebased.steps(), &[Step::insert(0, ">")]);
    }

    #[test]
    fn excluding_everything_leaves_nothing() {
        let first = edit(&initial_commit(), |tr| {
            tr.insert(10, "hello").unwrap();
        });
        let result = rewind_and_playback(&first, &[first.id()]);
        assert!(result.commit.is_none());
        assert_eq!(result.mapping.len(), 1);
    }

    #[test]
    fn cherry_pick_is_symmetric_for_disjoint_edits() {
        let a = edit(&initial_commit(), |tr| {
            tr.insert(60, "A").unwrap();
        });
        let b = edit(&initial_commit(), |tr| {
            tr.insert(53, "B").unwrap();
        });

        let ab = cherry_pick(&a, &b).commit.unwrap();
        let ba = cherry_pick(&b, &a).commit.unwrap();
        assert_eq!(ab.len(), 2);
        assert_eq!(replay(&ab.all_steps()), replay(&ba.all_steps()));
        assert_eq!(ranges(ab.blame()), ranges(ba.blame()));
    }

    #[test]
    fn cherry_pick_skips_shared_history() {
        let base = edit(&initial_commit(), |tr| {
            tr.insert(0, ">> ").unwrap();
        })
        .freeze();
        let a = edit(&base, |tr| {
            tr.insert(20, "[a]").unwrap();
        });
        let b = edit(&base, |tr| {
            tr.insert(5, "[b]").unwrap();
        });

        let picked = cherry_pick(&a, &b).commit.unwrap();
        assert_eq!(picked.len(), b.len() + 1);

        let text = replay(&picked.all_steps());
        assert_eq!(text.text().matches(">> ").count(), 1);
        assert!(text.text().contains("[a]"));
        assert!(text.text().contains("[b]"));
    }

    #[test]
    fn cherry_pick_of_root_commit_follows_onto() {
        let onto = edit(&initial_commit(), |tr| {
            tr.insert(0, "Note: ").unwrap();
        })
        .freeze();
        let pick = edit(&initial_commit(), |tr| {
            tr.insert(60, "X").unwrap();
        });

        let picked = cherry_pick(&pick, &onto).commit.unwrap();
        let expected = Doc::new(BASE)
            .replace(60, 60, "X")
            .unwrap()
            .replace(0, 0, "Note: ")
            .unwrap();
        assert_eq!(replay(&picked.all_steps()), expected);
        assert_eq!(ranges(picked.blame()), vec![(0, 6), (66, 67)]);
        assert_eq!(picked.blame_at(66), Some(picked.id()));
    }
}

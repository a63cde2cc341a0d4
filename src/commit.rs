//! Commits: immutable snapshots forming a singly-linked history.
//!
//! A commit holds the steps applied since its parent and the full blame
//! map as of itself. The newest commit of a chain is the open "head": it
//! keeps receiving edits (each one producing a new `Commit` value with the
//! same id) until it is frozen, at which point it becomes permanent history
//! and a fresh empty head is opened on top of it.
//!
//! Commits are shared through `Arc`, so every new head structurally shares
//! its whole ancestry with the previous one.

use std::sync::Arc;

use transform::{Step, Transform};

use crate::blame::{find_in_blame, update_blame, Span};
use crate::id::CommitId;

/// An immutable history node.
pub struct Commit {
    id: CommitId,
    steps: Vec<Step>,
    blame: Arc<[Span]>,
    parent: Option<Arc<Commit>>,
}

/// A fresh, empty root commit.
pub fn initial_commit() -> Arc<Commit> {
    return Arc::new(Commit::new(CommitId::generate(), Vec::new(), Vec::new(), None));
}

impl Commit {
    /// Assemble a commit from its parts.
    pub fn new(id: CommitId, steps: Vec<Step>, blame: Vec<Span>, parent: Option<Arc<Commit>>) -> Commit {
        return Commit {
            id,
            steps,
            blame: Arc::from(blame),
            parent,
        };
    }

    /// The commit id.
    pub fn id(&self) -> CommitId {
        return self.id;
    }

    /// Steps applied since the parent commit.
    pub fn steps(&self) -> &[Step] {
        return &self.steps;
    }

    /// The blame map as of this commit.
    pub fn blame(&self) -> &[Span] {
        return &self.blame;
    }

    /// The preceding commit, if any.
    pub fn parent(&self) -> Option<&Arc<Commit>> {
        return self.parent.as_ref();
    }

    /// Return true if this commit has no parent.
    pub fn is_root(&self) -> bool {
        return self.parent.is_none();
    }

    /// Return true if this commit carries no steps of its own.
    pub fn is_empty(&self) -> bool {
        return self.steps.is_empty();
    }

    /// Number of commits in the chain ending here.
    pub fn len(&self) -> usize {
        return self.ancestors().count();
    }

    /// Record a transform in this (open) commit.
    ///
    /// Inserted content is attributed to this commit's own id, and the
    /// transform's steps are appended to this commit's steps.
    pub fn apply_transform(&self, tr: &Transform) -> Arc<Commit> {
        let blame = update_blame(&self.blame, tr.mapping(), &self.id);
        let mut steps = Vec::with_capacity(self.steps.len() + tr.steps().len());
        steps.extend_from_slice(&self.steps);
        steps.extend_from_slice(tr.steps());
        return Arc::new(Commit {
            id: self.id,
            steps,
            blame: Arc::from(blame),
            parent: self.parent.clone(),
        });
    }

    /// Close this commit into history and open an empty one on top.
    ///
    /// The new commit has a fresh id, no steps, and shares this commit's
    /// blame map.
    pub fn freeze(self: &Arc<Self>) -> Arc<Commit> {
        return Arc::new(Commit {
            id: CommitId::generate(),
            steps: Vec::new(),
            blame: self.blame.clone(),
            parent: Some(self.clone()),
        });
    }

    /// Walk from this commit back to the root.
    pub fn ancestors(&self) -> Ancestors<'_> {
        return Ancestors { next: Some(self) };
    }

    /// The chain ending here, root first.
    pub fn chain(&self) -> Vec<&Commit> {
        let mut chain: Vec<&Commit> = self.ancestors().collect();
        chain.reverse();
        return chain;
    }

    /// Flatten the chain root-first, collecting what `selector` picks from
    /// each commit.
    ///
    /// The selector returns anything iterable, so a single value can be
    /// picked with `[value]` or `Some(value)` and a list spliced in with
    /// `commit.steps().iter().cloned()`.
    pub fn smoosh<'a, T, I, F>(&'a self, mut selector: F) -> Vec<T>
    where
        F: FnMut(&'a Commit) -> I,
        I: IntoIterator<Item = T>,
    {
        let mut result = Vec::new();
        for commit in self.chain() {
            result.extend(selector(commit));
        }
        return result;
    }

    /// Every step of the chain, in application order.
    pub fn all_steps(&self) -> Vec<Step> {
        return self.smoosh(|c| c.steps.iter().cloned());
    }

    /// Every commit id of the chain, root first.
    pub fn ids(&self) -> Vec<CommitId> {
        return self.smoosh(|c| [c.id]);
    }

    /// Find a commit in this chain by id.
    pub fn find(&self, id: &CommitId) -> Option<&Commit> {
        return self.ancestors().find(|c| c.id == *id);
    }

    /// The commit that authored the content at `pos`.
    pub fn blame_at(&self, pos: usize) -> Option<CommitId> {
        return find_in_blame(&self.blame, pos);
    }
}

impl Drop for Commit {
    fn drop(&mut self) {
        // Unlink the chain one commit at a time so dropping a long history
        // does not recurse once per ancestor.
        let mut parent = self.parent.take();
        while let Some(commit) = parent {
            match Arc::try_unwrap(commit) {
                Ok(mut inner) => parent = inner.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl std::fmt::Debug for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f
            .debug_struct("Commit")
            .field("id", &self.id)
            .field("steps", &self.steps)
            .field("blame", &self.blame)
            .field("parent", &self.parent.as_ref().map(|p| p.id))
            .finish();
    }
}

/// Iterator from a commit back to the root.
pub struct Ancestors<'a> {
    next: Option<&'a Commit>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = &'a Commit;

    fn next(&mut self) -> Option<&'a Commit> {
        let commit = self.next?;
        self.next = commit.parent.as_deref();
        return Some(commit);
    }
}

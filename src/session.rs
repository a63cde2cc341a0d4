//! Tracking state for one document.
//!
//! A `Session` is a plain value the caller owns and threads through its
//! own update cycle: the base document, the current document, and the head
//! commit. Every method that changes history replaces these wholesale, and
//! older `Arc<Commit>` handles stay valid.

use std::sync::Arc;

use transform::{Doc, StepError, Transform};

use crate::blame::{decorate_blame, find_in_blame, Decoration};
use crate::checkout::checkout_with;
use crate::commit::{initial_commit, Commit};
use crate::config::TrackConfig;
use crate::error::TrackError;
use crate::id::CommitId;
use crate::io::commit_to_json;
use crate::rebase::{cherry_pick, rewind_and_playback};

/// Label for spans of the commit the user is looking at.
pub const LABEL_FOCUSED: &str = "focused";

/// Label for spans of closed commits.
pub const LABEL_COMMITTED: &str = "committed";

/// Label for spans of the open head commit.
pub const LABEL_UNCOMMITTED: &str = "uncommitted";

/// A document under history tracking.
#[derive(Clone, Debug)]
pub struct Session {
    base: Doc,
    doc: Doc,
    head: Arc<Commit>,
    config: TrackConfig,
}

impl Session {
    /// Start tracking `base` with a fresh root commit.
    pub fn new(base: Doc) -> Session {
        return Session::with_config(base, TrackConfig::default());
    }

    /// Start tracking `base` with the given configuration.
    pub fn with_config(base: Doc, config: TrackConfig) -> Session {
        return Session {
            doc: base.clone(),
            base,
            head: initial_commit(),
            config,
        };
    }

    pub(crate) fn from_parts(base: Doc, doc: Doc, head: Arc<Commit>, config: TrackConfig) -> Session {
        return Session { base, doc, head, config };
    }

    /// The document history starts from.
    pub fn base(&self) -> &Doc {
        return &self.base;
    }

    /// The current document.
    pub fn doc(&self) -> &Doc {
        return &self.doc;
    }

    /// The open head commit.
    pub fn head(&self) -> &Arc<Commit> {
        return &self.head;
    }

    /// The active configuration.
    pub fn config(&self) -> &TrackConfig {
        return &self.config;
    }

    /// A transform starting at the current document.
    pub fn transform(&self) -> Transform {
        return Transform::new(self.doc.clone());
    }

    /// Record a transform built with `transform()`.
    pub fn apply(&mut self, tr: &Transform) -> Result<(), TrackError> {
        if tr.before() != &self.doc {
            return Err(TrackError::StaleTransform);
        }
        if !tr.doc_changed() {
            return Ok(());
        }
        self.head = self.head.apply_transform(tr);
        self.doc = tr.doc().clone();
        return Ok(());
    }

    /// Build and record a transform in one go. Nothing is recorded if the
    /// closure fails.
    pub fn edit<F>(&mut self, f: F) -> Result<(), TrackError>
    where
        F: FnOnce(&mut Transform) -> Result<(), StepError>,
    {
        let mut tr = self.transform();
        f(&mut tr)?;
        return self.apply(&tr);
    }

    /// Return true if the head commit has steps that are not yet frozen.
    pub fn has_uncommitted(&self) -> bool {
        return !self.head.is_empty();
    }

    /// Freeze the head commit into history. Returns false, changing
    /// nothing, when there is nothing to commit and empty commits are
    /// skipped.
    pub fn commit(&mut self) -> bool {
        if !self.has_uncommitted() && self.config.skip_empty_commits {
            return false;
        }
        self.head = self.head.freeze();
        return true;
    }

    /// Rewrite history without the given commits and check out the result.
    pub fn revert(&mut self, excluded: &[CommitId]) -> Result<(), TrackError> {
        if self.has_uncommitted() {
            return Err(TrackError::UncommittedChanges);
        }
        let result = rewind_and_playback(&self.head, excluded);
        *self = match result.commit {
            Some(head) => checkout_with(&self.base, &head, self.config.clone()),
            None => Session::with_config(self.base.clone(), self.config.clone()),
        };
        return Ok(());
    }

    /// Replay another chain on top of this one and check out the result.
    pub fn cherry_pick(&mut self, pick: &Commit) -> Result<(), TrackError> {
        if self.has_uncommitted() {
            return Err(TrackError::UncommittedChanges);
        }
        let result = cherry_pick(pick, &self.head);
        if let Some(head) = result.commit {
            *self = checkout_with(&self.base, &head, self.config.clone());
        }
        return Ok(());
    }

    /// The commit that authored the content at `pos`.
    pub fn blame_at(&self, pos: usize) -> Option<CommitId> {
        return find_in_blame(self.head.blame(), pos);
    }

    /// Every commit id in history, root first.
    pub fn commit_ids(&self) -> Vec<CommitId> {
        return self.head.ids();
    }

    /// Decorations for the current blame map. Spans of `focused` are
    /// labelled focused, spans of the open head uncommitted, and the rest
    /// committed.
    pub fn decorations(&self, focused: Option<CommitId>) -> Vec<Decoration> {
        let head = self.head.id();
        return decorate_blame(self.head.blame(), |id| {
            if Some(*id) == focused {
                return Some(LABEL_FOCUSED);
            }
            if *id == head {
                return Some(LABEL_UNCOMMITTED);
            }
            return Some(LABEL_COMMITTED);
        });
    }

    /// Decoration classes for the current blame map, using the configured
    /// prefix.
    pub fn decoration_classes(&self, focused: Option<CommitId>) -> Vec<(usize, usize, String)> {
        return self
            .decorations(focused)
            .into_iter()
            .map(|d| (d.from, d.to, d.class(&self.config.class_prefix)))
            .collect();
    }

    /// Serialize the tracked history.
    pub fn to_json(&self) -> Result<String, TrackError> {
        return commit_to_json(&self.head);
    }
}

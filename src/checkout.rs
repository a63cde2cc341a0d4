//! Reconstructing document state from a commit chain.

use std::sync::Arc;

use transform::Doc;

use crate::commit::Commit;
use crate::config::TrackConfig;
use crate::session::Session;

/// Apply every step of the chain ending at `commit` to `base`.
///
/// Application is best-effort: a step that does not fit the document is
/// skipped rather than aborting the replay.
pub fn replay(base: &Doc, commit: &Commit) -> Doc {
    let mut doc = base.clone();
    let mut skipped = 0;
    for step in commit.all_steps() {
        match step.apply(&doc) {
            Ok(next) => doc = next,
            Err(err) => {
                skipped += 1;
                tracing::debug!(%err, ?step, "skipping step during replay");
            }
        }
    }
    if skipped > 0 {
        tracing::debug!(head = %commit.id(), skipped, "replay skipped steps");
    }
    return doc;
}

/// Check out `commit` over `base` with the default configuration.
pub fn checkout(base: &Doc, commit: &Arc<Commit>) -> Session {
    return checkout_with(base, commit, TrackConfig::default());
}

/// Check out `commit` over `base`.
///
/// A commit with open steps is frozen first, so the session starts with
/// closed history and subsequent edits go to a new head.
pub fn checkout_with(base: &Doc, commit: &Arc<Commit>, config: TrackConfig) -> Session {
    let head = if commit.is_empty() {
        commit.clone()
    } else {
        commit.freeze()
    };
    let doc = replay(base, &head);
    return Session::from_parts(base.clone(), doc, head, config);
}

//! JSON persistence for commit chains.
//!
//! A chain is written flat, root first, so arbitrarily long histories never
//! nest. The payload carries a blake3 digest chained over the commit records
//! and is rejected on load if the digest, the version, or any blame map does
//! not check out.

use std::borrow::Cow;
use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use transform::Step;

use crate::blame::{is_well_formed, Span};
use crate::commit::Commit;
use crate::error::TrackError;
use crate::id::CommitId;

/// Version written by `commit_to_json`.
pub const FORMAT_VERSION: u32 = 1;

/// Type constant for commit record hashes.
const TYPE_COMMIT: u8 = 0x10;

/// Type constant for the final history digest.
const TYPE_HISTORY: u8 = 0x11;

#[derive(Serialize, Deserialize)]
struct CommitRecord<'a> {
    id: CommitId,
    steps: Cow<'a, [Step]>,
    blame: Cow<'a, [Span]>,
}

#[derive(Serialize, Deserialize)]
struct HistoryRecord<'a> {
    version: u32,
    digest: String,
    commits: Vec<CommitRecord<'a>>,
}

/// Hash one commit record, chained onto the digest of the records before it.
fn hash_record(prev: &blake3::Hash, data: &[u8]) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[TYPE_COMMIT]);
    hasher.update(prev.as_bytes());
    hasher.update(&(data.len() as u64).to_le_bytes());
    hasher.update(data);
    return hasher.finalize();
}

fn digest(commits: &[CommitRecord<'_>]) -> Result<blake3::Hash, TrackError> {
    let mut chained = blake3::Hash::from_bytes([0; 32]);
    for record in commits {
        chained = hash_record(&chained, &serde_json::to_vec(record)?);
    }
    let mut hasher = blake3::Hasher::new();
    hasher.update(&[TYPE_HISTORY]);
    hasher.update(&(commits.len() as u64).to_le_bytes());
    hasher.update(chained.as_bytes());
    return Ok(hasher.finalize());
}

/// Serialize the chain ending at `commit`.
pub fn commit_to_json(commit: &Commit) -> Result<String, TrackError> {
    let commits: Vec<CommitRecord<'_>> = commit
        .chain()
        .into_iter()
        .map(|c| CommitRecord {
            id: c.id(),
            steps: Cow::Borrowed(c.steps()),
            blame: Cow::Borrowed(c.blame()),
        })
        .collect();
    let history = HistoryRecord {
        version: FORMAT_VERSION,
        digest: digest(&commits)?.to_hex().to_string(),
        commits,
    };
    return Ok(serde_json::to_string(&history)?);
}

/// Rebuild a chain written by `commit_to_json`, returning its head.
pub fn commit_from_json(json: &str) -> Result<Arc<Commit>, TrackError> {
    let history: HistoryRecord<'static> = serde_json::from_str(json)?;
    if history.version != FORMAT_VERSION {
        tracing::warn!(version = history.version, "rejecting history with unknown version");
        return Err(TrackError::UnsupportedVersion(history.version));
    }
    if history.commits.is_empty() {
        return Err(TrackError::Malformed("history has no commits".to_string()));
    }
    if digest(&history.commits)?.to_hex().as_str() != history.digest {
        tracing::warn!(commits = history.commits.len(), "rejecting history with bad digest");
        return Err(TrackError::DigestMismatch);
    }

    let mut seen = FxHashSet::default();
    let mut head: Option<Arc<Commit>> = None;
    for record in history.commits {
        if !seen.insert(record.id) {
            return Err(TrackError::Malformed(format!("duplicate commit {}", record.id)));
        }
        if !is_well_formed(&record.blame) {
            tracing::warn!(commit = %record.id, "rejecting history with malformed blame");
            return Err(TrackError::Malformed(format!("bad blame map in commit {}", record.id)));
        }
        let commit = Commit::new(
            record.id,
            record.steps.into_owned(),
            record.blame.into_owned(),
            head.take(),
        );
        head = Some(Arc::new(commit));
    }
    return head.ok_or_else(|| TrackError::Malformed("history has no commits".to_string()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::initial_commit;
    use transform::{Doc, ReplaceStep, Transform};

    const BASE: &str = "This is the initial state of the document before any edits have been made.";

    fn history() -> Arc<Commit> {
        let mut tr = Transform::new(Doc::new(BASE));
        tr.insert(60, "A").unwrap();
        let first = initial_commit().apply_transform(&tr);

        let mut tr = Transform::new(tr.doc().clone());
        tr.delete(0, 5).unwrap().insert(0, "That").unwrap();
        return first.freeze().apply_transform(&tr).freeze();
    }

    fn sealed(commits: Vec<CommitRecord<'static>>) -> String {
        let history = HistoryRecord {
            version: FORMAT_VERSION,
            digest: digest(&commits).unwrap().to_hex().to_string(),
            commits,
        };
        return serde_json::to_string(&history).unwrap();
    }

    #[test]
    fn round_trip_preserves_chain() {
        let head = history();
        let json = commit_to_json(&head).unwrap();
        let loaded = commit_from_json(&json).unwrap();

        assert_eq!(loaded.ids(), head.ids());
        assert_eq!(loaded.all_steps(), head.all_steps());
        for (a, b) in loaded.chain().iter().zip(head.chain()) {
            assert_eq!(a.blame(), b.blame());
        }
        assert_eq!(commit_to_json(&loaded).unwrap(), json);
    }

    #[test]
    fn steps_use_tagged_json() {
        let json = commit_to_json(&history()).unwrap();
        assert!(json.contains(r#"{"stepType":"replace","from":60,"to":60,"text":"A"}"#));
        assert!(json.contains(r#""version":1"#));
    }

    #[test]
    fn tampered_text_is_rejected() {
        let json = commit_to_json(&history()).unwrap();
        let tampered = json.replace(r#""text":"A""#, r#""text":"Z""#);
        assert_ne!(tampered, json);
        assert!(matches!(commit_from_json(&tampered), Err(TrackError::DigestMismatch)));
    }

    #[test]
    fn unknown_version_is_rejected() {
        let json = commit_to_json(&history()).unwrap();
        let newer = json.replace(r#""version":1"#, r#""version":2"#);
        assert!(matches!(commit_from_json(&newer), Err(TrackError::UnsupportedVersion(2))));
    }

    #[test]
    fn unknown_step_type_is_rejected() {
        let json = commit_to_json(&history()).unwrap();
        let bad = json.replace(r#""stepType":"replace""#, r#""stepType":"addMark""#);
        assert!(matches!(commit_from_json(&bad), Err(TrackError::Json(_))));
    }

    #[test]
    fn inverted_step_is_rejected() {
        let id = CommitId::generate();
        let json = sealed(vec![CommitRecord {
            id,
            steps: Cow::Owned(vec![Step::Replace(ReplaceStep { from: 5, to: 3, text: String::new() })]),
            blame: Cow::Owned(Vec::new()),
        }]);
        assert!(json.contains(r#""from":5,"to":3"#));
        assert!(matches!(commit_from_json(&json), Err(TrackError::Json(_))));
    }

    #[test]
    fn empty_history_is_rejected() {
        let json = sealed(Vec::new());
        assert!(matches!(commit_from_json(&json), Err(TrackError::Malformed(_))));
    }

    #[test]
    fn overlapping_blame_is_rejected() {
        let id = CommitId::generate();
        let blame = vec![Span::new(0, 5, Some(id)), Span::new(3, 8, Some(id))];
        let json = sealed(vec![CommitRecord {
            id,
            steps: Cow::Owned(Vec::new()),
            blame: Cow::Owned(blame),
        }]);
        assert!(matches!(commit_from_json(&json), Err(TrackError::Malformed(_))));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let id = CommitId::generate();
        let record = || CommitRecord {
            id,
            steps: Cow::Owned(Vec::new()),
            blame: Cow::Owned(Vec::new()),
        };
        let json = sealed(vec![record(), record()]);
        assert!(matches!(commit_from_json(&json), Err(TrackError::Malformed(_))));
    }

    #[test]
    fn long_chains_load() {
        let mut head = initial_commit();
        for _ in 0..5_000 {
            head = head.freeze();
        }
        let loaded = commit_from_json(&commit_to_json(&head).unwrap()).unwrap();
        assert_eq!(loaded.len(), 5_001);
    }
}

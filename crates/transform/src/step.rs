//! Atomic, invertible edits.
//!
//! Steps serialize to plain records tagged by `stepType`, e.g.
//!
//! ```text
//! {"stepType":"replace","from":53,"to":53,"text":"A"}
//! ```
//!
//! An unknown `stepType` fails to deserialize rather than being skipped, and
//! so does a record whose `to` lies before its `from`.

use serde::{Deserialize, Serialize};

use crate::doc::Doc;
use crate::error::StepError;
use crate::map::{Bias, Mappable, StepMap};

/// An atomic edit to a document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stepType", rename_all = "camelCase")]
pub enum Step {
    /// Replace a range of the document with new text.
    Replace(ReplaceStep),
}

/// Replace `from..to` with `text`. Covers insertion (`from == to`) and
/// deletion (empty `text`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ReplaceRecord")]
pub struct ReplaceStep {
    pub from: usize,
    pub to: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub text: String,
}

/// A replace step as it appears on the wire, before its range is checked.
#[derive(Deserialize)]
struct ReplaceRecord {
    from: usize,
    to: usize,
    #[serde(default)]
    text: String,
}

impl TryFrom<ReplaceRecord> for ReplaceStep {
    type Error = StepError;

    fn try_from(record: ReplaceRecord) -> Result<Self, Self::Error> {
        if record.from > record.to {
            return Err(StepError::InvertedRange { from: record.from, to: record.to });
        }
        return Ok(ReplaceStep {
            from: record.from,
            to: record.to,
            text: record.text,
        });
    }
}

impl Step {
    /// A step replacing `from..to` with `text`.
    pub fn replace(from: usize, to: usize, text: &str) -> Step {
        return Step::Replace(ReplaceStep {
            from,
            to,
            text: text.to_string(),
        });
    }

    /// A step inserting `text` at `pos`.
    pub fn insert(pos: usize, text: &str) -> Step {
        return Step::replace(pos, pos, text);
    }

    /// A step deleting `from..to`.
    pub fn delete(from: usize, to: usize) -> Step {
        return Step::replace(from, to, "");
    }

    /// Apply this step, producing a new document.
    pub fn apply(&self, doc: &Doc) -> Result<Doc, StepError> {
        match self {
            Step::Replace(step) => return doc.replace(step.from, step.to, &step.text),
        }
    }

    /// The position map this step produces.
    pub fn get_map(&self) -> StepMap {
        match self {
            Step::Replace(step) => {
                let new_size = step.text.chars().count();
                return StepMap::replace(step.from, step.to.saturating_sub(step.from), new_size);
            }
        }
    }

    /// The step that undoes this one. `doc` is the document this step was
    /// applied to.
    pub fn invert(&self, doc: &Doc) -> Result<Step, StepError> {
        match self {
            Step::Replace(step) => {
                let removed = doc.slice(step.from, step.to)?;
                let inserted = step.text.chars().count();
                return Ok(Step::replace(step.from, step.from + inserted, removed));
            }
        }
    }

    /// Re-express this step after the changes described by `mapping`.
    ///
    /// Returns `None` when the step no longer makes sense, which happens
    /// when both of its ends were inside content the mapping deleted.
    pub fn map<M: Mappable + ?Sized>(&self, mapping: &M) -> Option<Step> {
        match self {
            Step::Replace(step) => {
                let from = mapping.map_result(step.from, Bias::Right);
                let to = mapping.map_result(step.to, Bias::Left);
                if from.deleted_across() && to.deleted_across() {
                    return None;
                }
                return Some(Step::Replace(ReplaceStep {
                    from: from.pos,
                    to: from.pos.max(to.pos),
                    text: step.text.clone(),
                }));
            }
        }
    }
}

//! Accumulating steps against a document.

use crate::doc::Doc;
use crate::error::StepError;
use crate::map::Mapping;
use crate::step::Step;

/// A sequence of steps applied to a starting document.
///
/// Keeps every intermediate document (needed to invert steps later) and
/// the mapping from the starting document to the current one.
#[derive(Clone, Debug)]
pub struct Transform {
    before: Doc,
    doc: Doc,
    steps: Vec<Step>,
    docs: Vec<Doc>,
    mapping: Mapping,
}

impl Transform {
    /// Start a transform at the given document.
    pub fn new(doc: Doc) -> Transform {
        return Transform {
            before: doc.clone(),
            doc,
            steps: Vec::new(),
            docs: Vec::new(),
            mapping: Mapping::new(),
        };
    }

    /// The document this transform started from.
    pub fn before(&self) -> &Doc {
        return &self.before;
    }

    /// The current document.
    pub fn doc(&self) -> &Doc {
        return &self.doc;
    }

    /// The steps applied so far.
    pub fn steps(&self) -> &[Step] {
        return &self.steps;
    }

    /// The document before each step, parallel to `steps()`.
    pub fn docs(&self) -> &[Doc] {
        return &self.docs;
    }

    /// The mapping from `before()` to `doc()`, one map per step.
    pub fn mapping(&self) -> &Mapping {
        return &self.mapping;
    }

    /// Return true if any step has been applied.
    pub fn doc_changed(&self) -> bool {
        return !self.steps.is_empty();
    }

    /// Consume the transform, returning the current document.
    pub fn into_doc(self) -> Doc {
        return self.doc;
    }

    /// Apply a step, failing if it does not fit the current document.
    pub fn step(&mut self, step: Step) -> Result<&mut Self, StepError> {
        let next = step.apply(&self.doc)?;
        self.add_step(step, next);
        return Ok(self);
    }

    /// Try to apply a step. On failure the transform is left unchanged.
    pub fn maybe_step(&mut self, step: &Step) -> Result<(), StepError> {
        let next = step.apply(&self.doc)?;
        self.add_step(step.clone(), next);
        return Ok(());
    }

    /// Replace `from..to` with `text`. Replacing nothing with nothing adds
    /// no step.
    pub fn replace(&mut self, from: usize, to: usize, text: &str) -> Result<&mut Self, StepError> {
        if from == to && text.is_empty() {
            self.doc.check_range(from, to)?;
            return Ok(self);
        }
        return self.step(Step::replace(from, to, text));
    }

    /// Insert `text` at `pos`.
    pub fn insert(&mut self, pos: usize, text: &str) -> Result<&mut Self, StepError> {
        return self.replace(pos, pos, text);
    }

    /// Delete `from..to`.
    pub fn delete(&mut self, from: usize, to: usize) -> Result<&mut Self, StepError> {
        return self.replace(from, to, "");
    }

    fn add_step(&mut self, step: Step, next: Doc) {
        self.mapping.append_map(step.get_map(), None);
        self.docs.push(std::mem::replace(&mut self.doc, next));
        self.steps.push(step);
    }
}

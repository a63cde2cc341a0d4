//! Immutable plain-text documents.
//!
//! Positions are character offsets, not byte offsets, so a position is
//! stable regardless of how wide the surrounding characters are in UTF-8.
//! The text is held behind an `Arc`, which makes a `Doc` cheap to clone
//! when transforms keep every intermediate document around.

use std::sync::Arc;

use crate::error::StepError;

/// An immutable text document.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Doc {
    text: Arc<str>,
    len: usize,
}

impl Doc {
    /// Create a document holding the given text.
    pub fn new(text: &str) -> Doc {
        return Doc {
            text: Arc::from(text),
            len: text.chars().count(),
        };
    }

    /// Create an empty document.
    pub fn empty() -> Doc {
        return Doc::new("");
    }

    /// The number of characters in the document.
    pub fn len(&self) -> usize {
        return self.len;
    }

    /// Return true if the document has no content.
    pub fn is_empty(&self) -> bool {
        return self.len == 0;
    }

    /// The full text of the document.
    pub fn text(&self) -> &str {
        return &self.text;
    }

    /// Check that `from..to` is a valid range in this document.
    pub fn check_range(&self, from: usize, to: usize) -> Result<(), StepError> {
        if from > to {
            return Err(StepError::InvertedRange { from, to });
        }
        if to > self.len {
            return Err(StepError::OutOfRange { from, to, len: self.len });
        }
        return Ok(());
    }

    /// Get the text between two character positions.
    pub fn slice(&self, from: usize, to: usize) -> Result<&str, StepError> {
        self.check_range(from, to)?;
        let start = self.byte_offset(from);
        let end = self.byte_offset(to);
        return Ok(&self.text[start..end]);
    }

    /// Produce a new document with `from..to` replaced by `text`.
    pub fn replace(&self, from: usize, to: usize, text: &str) -> Result<Doc, StepError> {
        self.check_range(from, to)?;
        let start = self.byte_offset(from);
        let end = self.byte_offset(to);

        let mut result = String::with_capacity(self.text.len() - (end - start) + text.len());
        result.push_str(&self.text[..start]);
        result.push_str(text);
        result.push_str(&self.text[end..]);

        return Ok(Doc {
            text: Arc::from(result),
            len: self.len - (to - from) + text.chars().count(),
        });
    }

    /// Convert a character position to a byte offset. `pos` must be in range.
    fn byte_offset(&self, pos: usize) -> usize {
        if pos == self.len {
            return self.text.len();
        }
        return self
            .text
            .char_indices()
            .nth(pos)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
    }
}

impl Default for Doc {
    fn default() -> Self {
        return Doc::empty();
    }
}

impl std::fmt::Debug for Doc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "Doc({:?})", self.text);
    }
}

impl std::fmt::Display for Doc {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return f.write_str(&self.text);
    }
}

//! Invertible edits over a plain-text document.
//!
//! This crate is the edit model the history engine is built on. It has
//! three layers:
//!
//! - `Doc`: an immutable text value addressed by character offset.
//! - `Step`: an atomic, invertible edit. Steps can be mapped through
//!   position changes made by other steps, which is what makes rebasing
//!   possible.
//! - `StepMap` / `Mapping`: the position translation produced by one step,
//!   and an ordered composition of them.
//!
//! # Example
//!
//! ```
//! use transform::{Doc, Transform, Mappable, Bias};
//!
//! let doc = Doc::new("Hello World");
//! let mut tr = Transform::new(doc);
//! tr.insert(5, ",").unwrap();
//! tr.delete(7, 12).unwrap();
//! assert_eq!(tr.doc().text(), "Hello, ");
//!
//! // Positions in the original document can be mapped to the result.
//! assert_eq!(tr.mapping().map(5, Bias::Right), 6);
//! ```

pub mod doc;
pub mod error;
pub mod map;
pub mod step;
pub mod transform;

pub use doc::Doc;
pub use error::StepError;
pub use map::{Bias, Change, MapResult, Mappable, Mapping, MappingSlice, StepMap};
pub use step::{ReplaceStep, Step};
pub use transform::Transform;

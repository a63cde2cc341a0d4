//! Tracked - commit history and blame for a plain text document.
//!
//! Edits are recorded as steps in an open head commit. Freezing the head
//! closes it into history. Every commit carries a blame map attributing
//! ranges of the current document to the commits that inserted them, and
//! history can be rewritten to drop commits or to replay one chain on top
//! of another.
//!
//! # Quick Start
//!
//! ```
//! use tracked::{Doc, Session};
//!
//! let mut session = Session::new(Doc::new("Hello world"));
//!
//! // Edit and commit
//! session.edit(|tr| tr.insert(5, ",").map(|_| ())).unwrap();
//! let first = session.head().id();
//! assert!(session.commit());
//! assert_eq!(session.blame_at(5), Some(first));
//!
//! // Drop the commit again
//! session.revert(&[first]).unwrap();
//! assert_eq!(session.doc().text(), "Hello world");
//! ```

pub mod blame;
pub mod checkout;
pub mod commit;
pub mod config;
pub mod error;
pub mod id;
pub mod io;
pub mod rebase;
pub mod session;

pub use blame::{decorate_blame, find_in_blame, insert_into_blame_map, update_blame, Decoration, Span};
pub use checkout::{checkout, checkout_with, replay};
pub use commit::{initial_commit, Commit};
pub use config::TrackConfig;
pub use error::TrackError;
pub use id::CommitId;
pub use io::{commit_from_json, commit_to_json};
pub use rebase::{cherry_pick, rewind_and_playback, Rebased};
pub use session::Session;
pub use transform::{Bias, Doc, Mapping, Step, StepError, Transform};

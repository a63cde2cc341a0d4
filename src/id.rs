//! Commit identifiers.
//!
//! Ids are 128 random bits. They are never derived from content: a rewrite
//! of history produces new commits with new ids even when the steps come
//! out identical.

use std::str::FromStr;

use rand_core::OsRng;
use rand_core::RngCore;
use serde::{Deserialize, Serialize};

use crate::error::TrackError;

/// A unique commit identifier, rendered as 32 hex characters.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommitId(pub [u8; 16]);

impl CommitId {
    /// Generate a fresh random id.
    pub fn generate() -> CommitId {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        return CommitId(bytes);
    }

    /// The first eight hex characters, for display.
    pub fn short(&self) -> String {
        return self.to_string()[..8].to_string();
    }
}

impl std::fmt::Display for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0 {
            write!(f, "{:02x}", byte)?;
        }
        return Ok(());
    }
}

impl std::fmt::Debug for CommitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "CommitId({})", self);
    }
}

impl FromStr for CommitId {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 32 || !s.is_ascii() {
            return Err(TrackError::Malformed(format!("invalid commit id {:?}", s)));
        }
        let mut bytes = [0u8; 16];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| TrackError::Malformed(format!("invalid commit id {:?}", s)))?;
        }
        return Ok(CommitId(bytes));
    }
}

impl TryFrom<String> for CommitId {
    type Error = TrackError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        return value.parse();
    }
}

impl From<CommitId> for String {
    fn from(id: CommitId) -> String {
        return id.to_string();
    }
}

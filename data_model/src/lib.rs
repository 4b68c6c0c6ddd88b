use std::{
    fmt::{self, Display},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumIter, EnumString};
use uuid::Uuid;

/// Length of the canonical hyphenated form, e.g.
/// `67e55044-10b1-426f-9247-bb680e5fe0c8`.
const HYPHENATED_LEN: usize = 36;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ParseRecordIdError {
    #[error("`{input}` is not a hyphenated uuid")]
    Malformed { input: String },
}

/// Identifier naming one stored record.
///
/// Backed by a random 128-bit value and always rendered in canonical
/// lowercase hyphenated form, which is also the name the record is persisted
/// under in every backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses `name` only if it is already in canonical form.
    ///
    /// Backends enumerate raw names; anything that would not round-trip back
    /// to the same name is not one of ours.
    pub fn from_canonical(name: &str) -> Option<Self> {
        let id = name.parse::<RecordId>().ok()?;
        if id.to_string() == name {
            Some(id)
        } else {
            None
        }
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for RecordId {
    type Err = ParseRecordIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != HYPHENATED_LEN {
            return Err(ParseRecordIdError::Malformed {
                input: s.to_string(),
            });
        }
        Uuid::try_parse(s)
            .map(Self)
            .map_err(|_| ParseRecordIdError::Malformed {
                input: s.to_string(),
            })
    }
}

impl From<Uuid> for RecordId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Backend a request is routed to.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    AsRefStr,
    EnumString,
    EnumIter,
    strum::Display,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum StorageTarget {
    File,
    Blob,
    Table,
}

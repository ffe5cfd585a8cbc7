//! Registry identifier type.
//!
//! Every person record in the external registry is keyed by an 8-digit
//! numeric ID. Parsing into [`ItsId`] is the single validation point;
//! components that take an `ItsId` can assume the digits are well formed
//! and never re-validate.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of digits in a registry ID.
pub const ID_DIGITS: usize = 8;

/// Error returned when raw input is not a valid registry ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("registry id must be exactly {ID_DIGITS} ASCII digits, got {0:?}")]
pub struct InvalidItsId(
    /// The rejected input.
    pub String,
);

/// An 8-digit registry identifier.
///
/// The inner string is guaranteed to be exactly [`ID_DIGITS`] ASCII digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItsId(String);

impl ItsId {
    /// Parses a registry ID from raw input.
    ///
    /// ## Errors
    ///
    /// Returns [`InvalidItsId`] unless the input is exactly eight ASCII
    /// digits. No whitespace trimming is performed; callers normalize
    /// their input first.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidItsId> {
        let raw = raw.into();
        if raw.len() == ID_DIGITS && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Self(raw))
        } else {
            Err(InvalidItsId(raw))
        }
    }

    /// Returns the ID as its digit string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the raw digit bytes.
    #[must_use]
    pub fn digits(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Display for ItsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ItsId {
    type Err = InvalidItsId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ItsId {
    type Error = InvalidItsId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ItsId> for String {
    fn from(id: ItsId) -> Self {
        id.0
    }
}

//! Identity snapshot model.
//!
//! An [`IdentityRecord`] is what an identity source returns for one
//! registry ID. Records are immutable: a fresh fetch produces a fresh
//! record, and nothing downstream ever mutates one.

use serde::{Deserialize, Serialize};

use crate::id::ItsId;

/// An immutable identity snapshot fetched from an identity source.
///
/// All fields are already in canonical shape; source-specific field names
/// and casing are mapped away inside the source implementation that
/// produced the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityRecord {
    // === Identity ===
    /// Registry ID the record belongs to.
    pub id: ItsId,

    // === Legal name ===
    /// First name.
    pub first_name: String,
    /// Middle name, if recorded.
    pub middle_name: Option<String>,
    /// Last name.
    pub last_name: String,

    // === Contact ===
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,

    // === Classification ===
    /// Occupation string as recorded by the source (e.g., "Doctor").
    pub occupation: String,
    /// Membership category string as recorded by the source (e.g., "Amil").
    pub category: String,

    // === Profile attributes ===
    /// Postal address.
    pub address: String,
    /// Nationality.
    pub nationality: String,

    // === Source-assigned ===
    /// Reference to the photo held by the source.
    pub photo_ref: String,
}

impl IdentityRecord {
    /// Returns the full legal name.
    #[must_use]
    pub fn full_name(&self) -> String {
        match &self.middle_name {
            Some(middle) => format!("{} {} {}", self.first_name, middle, self.last_name),
            None => format!("{} {}", self.first_name, self.last_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(middle: Option<&str>) -> IdentityRecord {
        IdentityRecord {
            id: ItsId::new("12345678").unwrap(),
            first_name: "Aisha".to_string(),
            middle_name: middle.map(String::from),
            last_name: "Rahman".to_string(),
            email: "aisha@example.org".to_string(),
            phone: "+1-555-0100".to_string(),
            occupation: "Teacher".to_string(),
            category: "Member".to_string(),
            address: "12 Elm St".to_string(),
            nationality: "Canadian".to_string(),
            photo_ref: "photos/12345678.jpg".to_string(),
        }
    }

    #[test]
    fn full_name_with_middle() {
        assert_eq!(record(Some("Noor")).full_name(), "Aisha Noor Rahman");
    }

    #[test]
    fn full_name_without_middle() {
        assert_eq!(record(None).full_name(), "Aisha Rahman");
    }
}

//! Local user profile model.
//!
//! The profile is the only entity in this subsystem with identity that
//! outlives a single resolution call. It is created on the first
//! successful resolution of an ID and updated in place afterwards; it is
//! never recreated.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::ItsId;
use crate::identity::IdentityRecord;
use crate::role::Role;

/// Freshness of the synchronized attribute fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SyncStatus {
    /// The last synchronization attempt succeeded.
    Fresh,
    /// A refresh attempt timed out; the retained attributes are old.
    Stale,
    /// The source no longer has a record for this ID.
    Failed,
}

/// The reconciled, persisted record for one registry ID.
///
/// The synchronized attribute fields mirror [`IdentityRecord`] and are
/// overwritten wholesale on every successful sync (the external source is
/// authoritative over local edits of these specific fields). `created_at`
/// is set once and never touched again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalUserProfile {
    // === Identity ===
    /// Registry ID (primary key).
    pub its_id: ItsId,

    // === Synchronized attributes ===
    /// First name.
    pub first_name: String,
    /// Middle name, if recorded.
    pub middle_name: Option<String>,
    /// Last name.
    pub last_name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Occupation string from the source.
    pub occupation: String,
    /// Membership category string from the source.
    pub category: String,
    /// Postal address.
    pub address: String,
    /// Nationality.
    pub nationality: String,
    /// Reference to the photo held by the source.
    pub photo_ref: String,

    // === Resolution ===
    /// Resolved application role.
    pub role: Role,

    // === Sync metadata ===
    /// Freshness of the synchronized fields.
    pub sync_status: SyncStatus,
    /// When the profile was last successfully synchronized.
    pub last_synced_at: DateTime<Utc>,
    /// When the profile was first created.
    pub created_at: DateTime<Utc>,
}

impl LocalUserProfile {
    /// Creates a profile from a freshly fetched record.
    #[must_use]
    pub fn from_record(record: &IdentityRecord, role: Role) -> Self {
        let now = Utc::now();
        Self {
            its_id: record.id.clone(),
            first_name: record.first_name.clone(),
            middle_name: record.middle_name.clone(),
            last_name: record.last_name.clone(),
            email: record.email.clone(),
            phone: record.phone.clone(),
            occupation: record.occupation.clone(),
            category: record.category.clone(),
            address: record.address.clone(),
            nationality: record.nationality.clone(),
            photo_ref: record.photo_ref.clone(),
            role,
            sync_status: SyncStatus::Fresh,
            last_synced_at: now,
            created_at: now,
        }
    }

    /// Overwrites the synchronized attribute fields from a fresh record.
    ///
    /// Role, sync metadata and `created_at` are left for the caller; this
    /// touches exactly the fields the external source is authoritative
    /// over.
    pub fn apply_record(&mut self, record: &IdentityRecord) {
        self.first_name = record.first_name.clone();
        self.middle_name = record.middle_name.clone();
        self.last_name = record.last_name.clone();
        self.email = record.email.clone();
        self.phone = record.phone.clone();
        self.occupation = record.occupation.clone();
        self.category = record.category.clone();
        self.address = record.address.clone();
        self.nationality = record.nationality.clone();
        self.photo_ref = record.photo_ref.clone();
    }

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

    fn record() -> IdentityRecord {
        IdentityRecord {
            id: ItsId::new("12345678").unwrap(),
            first_name: "Bilal".to_string(),
            middle_name: None,
            last_name: "Ahmed".to_string(),
            email: "bilal@example.org".to_string(),
            phone: "+1-555-0101".to_string(),
            occupation: "Doctor".to_string(),
            category: "Member".to_string(),
            address: "4 Oak Ave".to_string(),
            nationality: "British".to_string(),
            photo_ref: "photos/12345678.jpg".to_string(),
        }
    }

    #[test]
    fn from_record_copies_every_synchronized_field() {
        let rec = record();
        let profile = LocalUserProfile::from_record(&rec, Role::Practitioner);

        assert_eq!(profile.its_id, rec.id);
        assert_eq!(profile.first_name, rec.first_name);
        assert_eq!(profile.last_name, rec.last_name);
        assert_eq!(profile.email, rec.email);
        assert_eq!(profile.occupation, rec.occupation);
        assert_eq!(profile.role, Role::Practitioner);
        assert_eq!(profile.sync_status, SyncStatus::Fresh);
        assert_eq!(profile.created_at, profile.last_synced_at);
    }

    #[test]
    fn apply_record_leaves_metadata_alone() {
        let rec = record();
        let mut profile = LocalUserProfile::from_record(&rec, Role::GeneralMember);
        let created = profile.created_at;
        let synced = profile.last_synced_at;

        let mut newer = record();
        newer.email = "new@example.org".to_string();
        profile.apply_record(&newer);

        assert_eq!(profile.email, "new@example.org");
        assert_eq!(profile.created_at, created);
        assert_eq!(profile.last_synced_at, synced);
        assert_eq!(profile.role, Role::GeneralMember);
    }
}

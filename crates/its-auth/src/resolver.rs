//! Role resolution policy.
//!
//! A pure decision function: identical inputs always yield the identical
//! role, and nothing here has side effects. Attribute-derived roles
//! outrank list-derived roles because the identity source is more
//! authoritative than administrator-maintained lists.

use its_model::{IdentityRecord, Role};
use its_roster::{lists, MembershipListStore};

/// Occupation string that implies the practitioner role.
const PRACTITIONER_OCCUPATION: &str = "Doctor";

/// Category string that implies the regional-manager role.
const MANAGER_CATEGORY: &str = "Amil";

/// Maps an identity record to exactly one role.
///
/// Precedence, highest first, stopping at the first match:
///
/// 1. occupation equals "Doctor" (case-insensitive) → `Practitioner`
/// 2. category equals "Amil" (case-insensitive) → `RegionalManager`
/// 3. ID on the coordinator override list → `RegionalCoordinator`
/// 4. ID on the learner override list → `Learner`
/// 5. otherwise → `GeneralMember` (the intended catch-all, not an error)
///
/// `Administrator` is never produced here; it is assigned only by
/// explicit administrative action.
#[must_use]
pub fn resolve(record: &IdentityRecord, overrides: &MembershipListStore) -> Role {
    if record.occupation.eq_ignore_ascii_case(PRACTITIONER_OCCUPATION) {
        return Role::Practitioner;
    }
    if record.category.eq_ignore_ascii_case(MANAGER_CATEGORY) {
        return Role::RegionalManager;
    }
    if overrides.contains(lists::REGIONAL_COORDINATORS, &record.id) {
        return Role::RegionalCoordinator;
    }
    if overrides.contains(lists::LEARNERS, &record.id) {
        return Role::Learner;
    }
    Role::GeneralMember
}

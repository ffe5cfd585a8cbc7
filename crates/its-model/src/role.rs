//! Application role model.
//!
//! Exactly one role is assigned to each resolved identity. The vocabulary
//! is closed: downstream permission checks match on the enum, never on
//! strings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The single application-level permission tier of a resolved identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Role {
    /// Full administrative access. Never produced by role resolution;
    /// assigned only by explicit administrative action.
    Administrator,
    /// Manages a region. Derived from the source's category attribute.
    RegionalManager,
    /// Coordinates within a region. Derived from the coordinator
    /// override list.
    RegionalCoordinator,
    /// Practising professional. Derived from the source's occupation
    /// attribute.
    Practitioner,
    /// Enrolled learner. Derived from the learner override list.
    Learner,
    /// Default tier for everyone else.
    GeneralMember,
}

impl Role {
    /// All roles, in precedence-display order.
    pub const ALL: [Self; 6] = [
        Self::Administrator,
        Self::RegionalManager,
        Self::RegionalCoordinator,
        Self::Practitioner,
        Self::Learner,
        Self::GeneralMember,
    ];

    /// Returns the canonical string form of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Administrator => "administrator",
            Self::RegionalManager => "regional-manager",
            Self::RegionalCoordinator => "regional-coordinator",
            Self::Practitioner => "practitioner",
            Self::Learner => "learner",
            Self::GeneralMember => "general-member",
        }
    }

    /// Returns true for the catch-all tier.
    #[must_use]
    pub const fn is_default(&self) -> bool {
        matches!(self, Self::GeneralMember)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! # its-roster
//!
//! Administrator-curated membership override lists and the bulk-upload
//! parsing that feeds them. Lists map a name (e.g. the learner override
//! list) to a set of registry IDs consulted during role resolution.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod store;
pub mod upload;

pub use store::{lists, MembershipListStore};
pub use upload::{parse, RejectedEntry, RosterError, UploadFormat, UploadReport};

//! # its-source
//!
//! Identity source capability interface and its two implementations: a
//! deterministic synthetic generator (development) and a remote
//! HTTP-backed client (production). The rest of the workspace is written
//! once against [`IdentitySource`] and works unmodified against either.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod remote;
pub mod retry;
pub mod source;
pub mod synthetic;

pub use config::{SourceConfig, SourceMode};
pub use error::{SourceError, SourceResult};
pub use remote::RemoteIdentitySource;
pub use source::{build_source, IdentitySource};
pub use synthetic::SyntheticIdentitySource;

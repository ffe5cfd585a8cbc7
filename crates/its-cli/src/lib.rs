//! # its-cli
//!
//! Administration tool for the ITS identity-resolution subsystem:
//! membership roster uploads, single logins, bulk reconciliation and
//! registry search.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cli;
pub mod commands;
pub mod error;
pub mod output;
pub mod state;

pub use error::{CliError, CliResult};

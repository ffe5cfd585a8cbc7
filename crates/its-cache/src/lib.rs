//! # its-cache
//!
//! Time-bound response cache wrapping identity source lookups, so
//! repeated resolutions of the same ID do not hammer the registry.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cache;

pub use cache::ResponseCache;

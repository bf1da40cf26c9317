//! Row structs and domain models for the versioning tables.
//!
//! Each versioned table has a `FromRow` struct matching the row exactly
//! (status as its text code) and a fallible conversion into the domain
//! form the engine operates on.

pub mod content_version;

pub use content_version::{ContentVersion, ContentVersionRow, LanguageAvailabilityRow};

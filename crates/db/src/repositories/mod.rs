//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async query methods.
//! Reads accept `&PgPool`; writes that must join a surrounding transaction
//! accept `&mut PgConnection`.

pub mod root_repo;
pub mod version_repo;

pub use root_repo::RootRepo;
pub use version_repo::VersionRepo;

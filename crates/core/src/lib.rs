//! Verso core — the entity versioning and publishing engine.
//!
//! Every logical content item in the registry is identified by a *unific
//! root*; each edit of the item is a separate version row under that root
//! with its own publishing status and per-language availability rows. This
//! crate is the pure state-transition engine over that model:
//!
//! - [`status`] — the publishing status enumeration and its fallback
//!   priority table.
//! - [`entity`] — the [`VersionedEntity`] contract any content type must
//!   satisfy to participate in versioning.
//! - [`selector`] — side-effect-free version selection queries.
//! - [`factory`] — creation of editable versions (clone-on-publish
//!   semantics, root assignment).
//! - [`publishing`] — the publish / withdraw / restore / archive state
//!   machine.
//! - [`language`] — per-language publishing status, independent of the
//!   entity-level status.
//! - [`uow`] — the unit-of-work contract the engine computes against, plus
//!   an in-memory implementation with change tracking.
//!
//! The engine performs no I/O: all operations run against a caller-supplied
//! unit of work, and every multi-row mutation is computed fully before any
//! row is touched, so an aborted surrounding transaction discards it safely.

pub mod entity;
pub mod error;
pub mod factory;
pub mod language;
pub mod publishing;
pub mod selector;
pub mod status;
pub mod types;
pub mod uow;

pub use entity::{LanguageAvailability, VersionedEntity};
pub use error::VersioningError;
pub use factory::{VersionFactory, VersioningMode};
pub use language::{LanguageAvailabilityInfo, LanguageStatusCoordinator};
pub use publishing::{
    NoValidation, PublishValidator, PublishingAffectedResult, PublishingCoordinator,
};
pub use selector::VersionInfo;
pub use status::{PublishingStatus, StatusFilter};
pub use types::{LanguageId, RootId, Timestamp, VersionId, VersionNumber};
pub use uow::{MemoryUnitOfWork, UnitOfWork};

#[cfg(test)]
pub(crate) mod test_support;

//! Engine error taxonomy.
//!
//! Three families, with different recovery semantics for callers:
//!
//! - **conflicts** — a second Modified, Draft or Published version would be
//!   created for a root that already holds one. Recoverable: re-read state
//!   and edit the existing version instead.
//! - **validation** — the transition would leave the content in a state the
//!   rules forbid (failed business validation, zero visible languages).
//!   Surfaced to the end user, never retried automatically.
//! - **state errors** — a transition was requested from a status that does
//!   not allow it. Programming errors in the calling service.

use crate::status::PublishingStatus;
use crate::types::{RootId, VersionId};

#[derive(Debug, thiserror::Error)]
pub enum VersioningError {
    #[error("version not found: {0}")]
    VersionNotFound(VersionId),

    #[error("version {0} has no root; it was never saved through the version factory")]
    MissingRoot(VersionId),

    #[error("a modified version already exists for root {root}")]
    ModifiedVersionExists { root: RootId },

    #[error("a draft version already exists for root {root}")]
    DraftVersionExists { root: RootId },

    #[error("a published version already exists for root {root}")]
    PublishedVersionExists { root: RootId },

    #[error("publish validation failed: {0}")]
    PublishValidation(String),

    #[error("version {version} would have no language left in a visible status")]
    NoVisibleLanguage { version: VersionId },

    #[error("status {from} does not allow a transition to {to}")]
    InvalidTransition {
        from: PublishingStatus,
        to: PublishingStatus,
    },

    #[error("status {status} is not in the allowed source set for this operation")]
    SourceStatusNotAllowed { status: PublishingStatus },

    #[error("unknown publishing status code '{0}'")]
    UnknownStatusCode(String),
}

impl VersioningError {
    /// Recoverable by re-reading current state and retrying against the
    /// existing Draft/Modified version.
    pub const fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::ModifiedVersionExists { .. }
                | Self::DraftVersionExists { .. }
                | Self::PublishedVersionExists { .. }
        )
    }

    /// User-facing; the content itself must change before a retry can work.
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::PublishValidation(_) | Self::NoVisibleLanguage { .. }
        )
    }

    /// A transition issued from a disallowed source status; the calling
    /// service should not have offered the operation.
    pub const fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidTransition { .. } | Self::SourceStatusNotAllowed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_taxonomy_classifiers_are_disjoint() {
        let errors = [
            VersioningError::ModifiedVersionExists { root: Uuid::nil() },
            VersioningError::DraftVersionExists { root: Uuid::nil() },
            VersioningError::PublishedVersionExists { root: Uuid::nil() },
            VersioningError::PublishValidation("missing summary".into()),
            VersioningError::NoVisibleLanguage {
                version: Uuid::nil(),
            },
            VersioningError::InvalidTransition {
                from: PublishingStatus::Deleted,
                to: PublishingStatus::Published,
            },
            VersioningError::SourceStatusNotAllowed {
                status: PublishingStatus::Draft,
            },
        ];
        for err in &errors {
            let classes = [err.is_conflict(), err.is_validation(), err.is_state_error()];
            assert_eq!(
                classes.iter().filter(|c| **c).count(),
                1,
                "{err} must belong to exactly one class"
            );
        }
    }

    #[test]
    fn test_lookup_errors_belong_to_no_class() {
        let err = VersioningError::VersionNotFound(Uuid::nil());
        assert!(!err.is_conflict() && !err.is_validation() && !err.is_state_error());
    }
}

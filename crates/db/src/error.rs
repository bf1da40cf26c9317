//! Storage-layer error type.

use verso_core::{RootId, VersioningError};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// An engine guard or a storage constraint standing in for one.
    #[error(transparent)]
    Engine(#[from] VersioningError),
}

impl StoreError {
    /// Translate a unique violation on one of the partial
    /// one-holder-per-root indexes into the matching engine conflict.
    /// Anything else stays a database error.
    pub(crate) fn from_save_error(err: sqlx::Error, root: RootId) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.kind() == sqlx::error::ErrorKind::UniqueViolation {
                match db.constraint() {
                    Some("content_versions_one_modified_per_root") => {
                        return Self::Engine(VersioningError::ModifiedVersionExists { root });
                    }
                    Some("content_versions_one_draft_per_root") => {
                        return Self::Engine(VersioningError::DraftVersionExists { root });
                    }
                    Some("content_versions_one_published_per_root") => {
                        return Self::Engine(VersioningError::PublishedVersionExists { root });
                    }
                    _ => {}
                }
            }
        }
        Self::Database(err)
    }

    /// `true` when a caller can recover by re-reading current state.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Engine(e) if e.is_conflict())
    }
}

//! The minimal contract a content type must satisfy to be versioned.
//!
//! The registry has many unrelated content types (services, channels,
//! organizations); the engine is agnostic to their business semantics and
//! only requires the capabilities below. Logic is shared through this trait
//! bound rather than a class hierarchy.

use serde::{Deserialize, Serialize};

use crate::status::PublishingStatus;
use crate::types::{LanguageId, RootId, Timestamp, VersionId, VersionNumber};

/// Per-language publishing status and scheduling metadata of one version.
///
/// Owned exclusively by its parent version; copied wholesale when the
/// parent is cloned for editing, and removed with the parent when the
/// parent is purged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAvailability {
    pub language_id: LanguageId,
    pub status: PublishingStatus,
    /// Scheduled publish time; the language moves to Published once passed.
    pub publish_at: Option<Timestamp>,
    /// Scheduled archive time; the language moves to Deleted once passed.
    pub archive_at: Option<Timestamp>,
    pub modified: Timestamp,
    pub modified_by: String,
}

impl LanguageAvailability {
    pub fn new(
        language_id: LanguageId,
        status: PublishingStatus,
        modified_by: impl Into<String>,
        modified: Timestamp,
    ) -> Self {
        Self {
            language_id,
            status,
            publish_at: None,
            archive_at: None,
            modified,
            modified_by: modified_by.into(),
        }
    }

    /// A language counts as visible when end users can reach some rendition
    /// of it: either the published one or an in-progress draft.
    pub const fn is_visible(&self) -> bool {
        matches!(
            self.status,
            PublishingStatus::Published | PublishingStatus::Draft
        )
    }
}

/// Capability contract for anything the engine versions.
///
/// `root_id` is `None` only for an entity that has never been saved; the
/// version factory assigns a root on first save and the root never changes
/// afterwards. `Clone` is required because creating an editable version of
/// a published entity is a full copy (language rows included).
pub trait VersionedEntity: Clone {
    fn version_id(&self) -> VersionId;
    fn set_version_id(&mut self, id: VersionId);

    fn root_id(&self) -> Option<RootId>;
    fn set_root_id(&mut self, root: RootId);

    fn version(&self) -> VersionNumber;
    fn set_version(&mut self, version: VersionNumber);

    fn status(&self) -> PublishingStatus;
    fn set_status(&mut self, status: PublishingStatus);

    fn languages(&self) -> &[LanguageAvailability];
    fn languages_mut(&mut self) -> &mut Vec<LanguageAvailability>;

    /// Stamp the audit fields of the entity itself (not its language rows).
    fn stamp(&mut self, modified_by: &str, modified: Timestamp);
}

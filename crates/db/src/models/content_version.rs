//! Content version rows and their assembled domain form.

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use verso_core::{
    LanguageAvailability, LanguageId, PublishingStatus, RootId, Timestamp, VersionId,
    VersionNumber, VersionedEntity, VersioningError,
};

/// A row from the `content_versions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ContentVersionRow {
    pub id: Uuid,
    pub root_id: Uuid,
    pub version_major: i32,
    pub version_minor: i32,
    pub publishing_status: String,
    pub modified: Timestamp,
    pub modified_by: String,
}

/// A row from the `language_availabilities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LanguageAvailabilityRow {
    pub version_id: Uuid,
    pub language_id: Uuid,
    pub publishing_status: String,
    pub publish_at: Option<Timestamp>,
    pub archive_at: Option<Timestamp>,
    pub modified: Timestamp,
    pub modified_by: String,
}

impl LanguageAvailabilityRow {
    fn into_domain(self) -> Result<LanguageAvailability, VersioningError> {
        Ok(LanguageAvailability {
            language_id: self.language_id,
            status: self.publishing_status.parse()?,
            publish_at: self.publish_at,
            archive_at: self.archive_at,
            modified: self.modified,
            modified_by: self.modified_by,
        })
    }
}

/// A version of a content item as the engine sees it: the version row plus
/// its language availability rows.
///
/// `root_id` is `None` only before the first save; persisting a rootless
/// version is rejected by the repository.
#[derive(Debug, Clone, Serialize)]
pub struct ContentVersion {
    pub id: VersionId,
    pub root_id: Option<RootId>,
    pub version: VersionNumber,
    pub status: PublishingStatus,
    pub languages: Vec<LanguageAvailability>,
    pub modified: Timestamp,
    pub modified_by: String,
}

impl ContentVersion {
    /// A brand-new, never-saved version with draft rows for `languages`.
    /// The version factory assigns the root, counters and status on save.
    pub fn new(languages: &[LanguageId], user: &str, now: Timestamp) -> Self {
        Self {
            id: Uuid::new_v4(),
            root_id: None,
            version: VersionNumber::initial(),
            status: PublishingStatus::Draft,
            languages: languages
                .iter()
                .map(|l| LanguageAvailability::new(*l, PublishingStatus::Draft, user, now))
                .collect(),
            modified: now,
            modified_by: user.to_string(),
        }
    }

    /// Assemble the domain form from a version row and its language rows.
    pub fn assemble(
        row: ContentVersionRow,
        languages: Vec<LanguageAvailabilityRow>,
    ) -> Result<Self, VersioningError> {
        Ok(Self {
            id: row.id,
            root_id: Some(row.root_id),
            version: VersionNumber::new(row.version_major, row.version_minor),
            status: row.publishing_status.parse()?,
            languages: languages
                .into_iter()
                .map(LanguageAvailabilityRow::into_domain)
                .collect::<Result<_, _>>()?,
            modified: row.modified,
            modified_by: row.modified_by,
        })
    }
}

impl VersionedEntity for ContentVersion {
    fn version_id(&self) -> VersionId {
        self.id
    }

    fn set_version_id(&mut self, id: VersionId) {
        self.id = id;
    }

    fn root_id(&self) -> Option<RootId> {
        self.root_id
    }

    fn set_root_id(&mut self, root: RootId) {
        self.root_id = Some(root);
    }

    fn version(&self) -> VersionNumber {
        self.version
    }

    fn set_version(&mut self, version: VersionNumber) {
        self.version = version;
    }

    fn status(&self) -> PublishingStatus {
        self.status
    }

    fn set_status(&mut self, status: PublishingStatus) {
        self.status = status;
    }

    fn languages(&self) -> &[LanguageAvailability] {
        &self.languages
    }

    fn languages_mut(&mut self) -> &mut Vec<LanguageAvailability> {
        &mut self.languages
    }

    fn stamp(&mut self, modified_by: &str, modified: Timestamp) {
        self.modified_by = modified_by.to_string();
        self.modified = modified;
    }
}

//! Shared fixtures for the engine's unit tests.

use chrono::TimeZone;
use uuid::Uuid;

use crate::entity::{LanguageAvailability, VersionedEntity};
use crate::status::PublishingStatus;
use crate::types::{LanguageId, RootId, Timestamp, VersionId, VersionNumber};

/// Minimal content type driving the engine in tests.
#[derive(Debug, Clone, PartialEq)]
pub struct TestEntity {
    pub id: VersionId,
    pub root: Option<RootId>,
    pub version: VersionNumber,
    pub status: PublishingStatus,
    pub languages: Vec<LanguageAvailability>,
    pub modified: Timestamp,
    pub modified_by: String,
    /// Stands in for the content payload; cloned with the version.
    pub name: String,
}

impl VersionedEntity for TestEntity {
    fn version_id(&self) -> VersionId {
        self.id
    }

    fn set_version_id(&mut self, id: VersionId) {
        self.id = id;
    }

    fn root_id(&self) -> Option<RootId> {
        self.root
    }

    fn set_root_id(&mut self, root: RootId) {
        self.root = Some(root);
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

pub fn fixed_now() -> Timestamp {
    chrono::Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
}

/// Finnish language id, stable across tests.
pub fn fi() -> LanguageId {
    Uuid::from_u128(0xf1)
}

/// Swedish language id, stable across tests.
pub fn sv() -> LanguageId {
    Uuid::from_u128(0x5f)
}

pub fn language(id: LanguageId, status: PublishingStatus) -> LanguageAvailability {
    LanguageAvailability::new(id, status, "tester", fixed_now())
}

/// A persisted-looking entity with its own fresh root and one `fi` language
/// row mirroring the entity status.
pub fn entity(status: PublishingStatus) -> TestEntity {
    entity_with_version(status, VersionNumber::initial())
}

pub fn entity_with_version(status: PublishingStatus, version: VersionNumber) -> TestEntity {
    TestEntity {
        id: Uuid::new_v4(),
        root: Some(Uuid::new_v4()),
        version,
        status,
        languages: vec![language(fi(), status)],
        modified: fixed_now(),
        modified_by: "tester".to_string(),
        name: "test entity".to_string(),
    }
}

/// An entity that has never been saved: no root yet.
pub fn unsaved_entity() -> TestEntity {
    TestEntity {
        id: Uuid::new_v4(),
        root: None,
        version: VersionNumber::new(0, 0),
        status: PublishingStatus::Draft,
        languages: vec![language(fi(), PublishingStatus::Draft)],
        modified: fixed_now(),
        modified_by: "tester".to_string(),
        name: "unsaved entity".to_string(),
    }
}

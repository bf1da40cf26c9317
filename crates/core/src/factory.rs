//! Creation of editable versions.
//!
//! A published version is immutable: asking for an editable version of it
//! produces a full clone (new version id, same root, minor incremented,
//! language rows copied) and the clone receives the edit. Draft and
//! Modified versions are edited in place to avoid unbounded version
//! proliferation from repeated small edits.

use uuid::Uuid;

use crate::entity::VersionedEntity;
use crate::error::VersioningError;
use crate::selector;
use crate::status::PublishingStatus;
use crate::types::{RootId, VersionNumber};
use crate::uow::UnitOfWork;

/// How the factory may obtain the editable version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersioningMode {
    /// Clone only when the source is Published, otherwise reuse in place.
    Standard,
    /// Always produce a new version row, whatever the source status.
    ForcedClone,
}

pub struct VersionFactory;

impl VersionFactory {
    /// Guarantee the entity has a root, allocating one on first save.
    ///
    /// The root is created exactly once per logical item and never mutated
    /// afterwards.
    pub fn ensure_unific_root<E, U>(uow: &mut U, entity: &mut E) -> RootId
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        match entity.root_id() {
            Some(root) => root,
            None => {
                let root = uow.create_root();
                entity.set_root_id(root);
                root
            }
        }
    }

    /// Produce the version that should receive an edit, and record it in
    /// the unit of work.
    ///
    /// `target_status` forces the resulting status; the default is Draft
    /// for an ordinary edit and Modified when the source is Published.
    ///
    /// Fails with a conflict when a second Modified (or Draft) version
    /// would be created for the root: a previously published item cannot be
    /// branched again while an editable version already exists — the caller
    /// must pick up that version instead.
    pub fn create_entity_version<E, U>(
        uow: &mut U,
        mut entity: E,
        mode: VersioningMode,
        target_status: Option<PublishingStatus>,
    ) -> Result<E, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        // First save: no root, no siblings, no cloning.
        if entity.root_id().is_none() {
            Self::ensure_unific_root(uow, &mut entity);
            entity.set_version(VersionNumber::initial());
            entity.set_status(target_status.unwrap_or(PublishingStatus::Draft));
            let (user, now) = (uow.user().to_owned(), uow.now());
            entity.stamp(&user, now);
            uow.upsert(entity.clone());
            return Ok(entity);
        }

        let root = entity
            .root_id()
            .ok_or(VersioningError::MissingRoot(entity.version_id()))?;
        let source_status = entity.status();

        if !selector::is_allowed_for_editing(&entity) {
            return Err(VersioningError::SourceStatusNotAllowed {
                status: source_status,
            });
        }

        let clone_required =
            source_status == PublishingStatus::Published || mode == VersioningMode::ForcedClone;

        if clone_required {
            let desired = target_status.unwrap_or(match source_status {
                PublishingStatus::Published => PublishingStatus::Modified,
                _ => PublishingStatus::Draft,
            });
            let siblings = uow.versions_of_root(root);
            Self::guard_single_editable(root, &siblings, desired, None)?;

            let mut new_version = entity.clone();
            new_version.set_version_id(Uuid::new_v4());
            new_version.set_version(next_minor_of(&siblings, entity.version().major));
            new_version.set_status(desired);
            let (user, now) = (uow.user().to_owned(), uow.now());
            new_version.stamp(&user, now);
            uow.upsert(new_version.clone());
            return Ok(new_version);
        }

        // Draft/Modified: reuse the row in place.
        let desired = target_status.unwrap_or(source_status);
        if desired != source_status {
            let siblings = uow.versions_of_root(root);
            Self::guard_single_editable(root, &siblings, desired, Some(entity.version_id()))?;
        }
        entity.set_status(desired);
        let (user, now) = (uow.user().to_owned(), uow.now());
        entity.stamp(&user, now);
        uow.upsert(entity.clone());
        Ok(entity)
    }

    /// One Draft, one Modified and one Published holder per root, enforced
    /// in memory. The storage layer enforces the same rule with partial
    /// unique indexes; this guard is the last line of defense inside the
    /// transaction. A Published target only ever arrives through an
    /// explicit `target_status` — the publish coordinator demotes the
    /// previous holder instead of tripping this guard.
    fn guard_single_editable<E: VersionedEntity>(
        root: RootId,
        siblings: &[E],
        desired: PublishingStatus,
        reuse_of: Option<crate::types::VersionId>,
    ) -> Result<(), VersioningError> {
        let holder = siblings
            .iter()
            .find(|v| v.status() == desired && Some(v.version_id()) != reuse_of);
        match (desired, holder) {
            (PublishingStatus::Modified, Some(_)) => {
                Err(VersioningError::ModifiedVersionExists { root })
            }
            (PublishingStatus::Draft, Some(_)) => {
                Err(VersioningError::DraftVersionExists { root })
            }
            (PublishingStatus::Published, Some(_)) => {
                Err(VersioningError::PublishedVersionExists { root })
            }
            _ => Ok(()),
        }
    }
}

/// Next free minor within `major`, given every sibling of the root.
fn next_minor_of<E: VersionedEntity>(siblings: &[E], major: i32) -> VersionNumber {
    let max_minor = siblings
        .iter()
        .filter(|v| v.version().major == major)
        .map(|v| v.version().minor)
        .max()
        .unwrap_or(0);
    VersionNumber::new(major, max_minor + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use crate::test_support::{entity_with_version, fixed_now, unsaved_entity, TestEntity};
    use crate::uow::MemoryUnitOfWork;

    fn uow() -> MemoryUnitOfWork<TestEntity> {
        MemoryUnitOfWork::new("tester", fixed_now())
    }

    #[test]
    fn test_first_save_creates_root_and_draft() {
        let mut uow = uow();
        let entity = unsaved_entity();
        let saved = VersionFactory::create_entity_version(
            &mut uow,
            entity,
            VersioningMode::Standard,
            None,
        )
        .unwrap();

        assert!(saved.root_id().is_some());
        assert_eq!(saved.status(), PublishingStatus::Draft);
        assert_eq!(saved.version(), VersionNumber::initial());
        assert_eq!(uow.drain_created_roots().len(), 1);
        assert_eq!(uow.drain_changes().len(), 1);
    }

    #[test]
    fn test_published_source_is_cloned_not_mutated() {
        let mut uow = uow();
        let published = entity_with_version(PublishingStatus::Published, VersionNumber::new(1, 0));
        uow.seed(published.clone());

        let editable = VersionFactory::create_entity_version(
            &mut uow,
            published.clone(),
            VersioningMode::Standard,
            None,
        )
        .unwrap();

        assert_ne!(editable.version_id(), published.version_id());
        assert_eq!(editable.root_id(), published.root_id());
        assert_eq!(editable.status(), PublishingStatus::Modified);
        assert_eq!(editable.version(), VersionNumber::new(1, 1));
        // Language rows travel with the clone.
        assert_eq!(editable.languages(), published.languages());

        // The published original is untouched in the working set.
        let original = uow.get(published.version_id()).unwrap();
        assert_eq!(original.status(), PublishingStatus::Published);
        assert_eq!(original.version(), VersionNumber::new(1, 0));
    }

    #[test]
    fn test_second_modified_for_root_conflicts() {
        let mut uow = uow();
        let published = entity_with_version(PublishingStatus::Published, VersionNumber::new(1, 0));
        let root = published.root_id().unwrap();
        let mut existing = entity_with_version(PublishingStatus::Modified, VersionNumber::new(1, 1));
        existing.root = Some(root);
        uow.seed(published.clone());
        uow.seed(existing);

        let err = VersionFactory::create_entity_version(
            &mut uow,
            published,
            VersioningMode::Standard,
            None,
        )
        .unwrap_err();
        assert_matches!(err, VersioningError::ModifiedVersionExists { root: r } if r == root);
        assert!(err.is_conflict());
        assert!(!uow.is_dirty());
    }

    #[test]
    fn test_draft_is_reused_in_place() {
        let mut uow = uow();
        let draft = entity_with_version(PublishingStatus::Draft, VersionNumber::initial());
        uow.seed(draft.clone());

        let editable = VersionFactory::create_entity_version(
            &mut uow,
            draft.clone(),
            VersioningMode::Standard,
            None,
        )
        .unwrap();

        assert_eq!(editable.version_id(), draft.version_id());
        assert_eq!(editable.version(), draft.version());
        assert_eq!(editable.status(), PublishingStatus::Draft);
    }

    #[test]
    fn test_forced_clone_of_draft_conflicts_with_itself() {
        let mut uow = uow();
        let draft = entity_with_version(PublishingStatus::Draft, VersionNumber::initial());
        uow.seed(draft.clone());

        let err = VersionFactory::create_entity_version(
            &mut uow,
            draft,
            VersioningMode::ForcedClone,
            None,
        )
        .unwrap_err();
        assert_matches!(err, VersioningError::DraftVersionExists { .. });
    }

    #[test]
    fn test_published_target_conflicts_with_existing_published() {
        let mut uow = uow();
        let published = entity_with_version(PublishingStatus::Published, VersionNumber::new(1, 0));
        let root = published.root_id().unwrap();
        let mut draft = entity_with_version(PublishingStatus::Draft, VersionNumber::new(1, 1));
        draft.root = Some(root);
        uow.seed(published);
        uow.seed(draft.clone());

        // Promoting the draft directly must not sneak a second Published
        // row past the one-per-root invariant.
        let err = VersionFactory::create_entity_version(
            &mut uow,
            draft,
            VersioningMode::Standard,
            Some(PublishingStatus::Published),
        )
        .unwrap_err();
        assert_matches!(err, VersioningError::PublishedVersionExists { root: r } if r == root);
        assert!(err.is_conflict());
        assert!(!uow.is_dirty());

        let published_count = uow
            .versions_of_root(root)
            .iter()
            .filter(|v| v.status() == PublishingStatus::Published)
            .count();
        assert_eq!(published_count, 1);
    }

    #[test]
    fn test_cloning_published_to_published_conflicts() {
        let mut uow = uow();
        let published = entity_with_version(PublishingStatus::Published, VersionNumber::new(1, 0));
        uow.seed(published.clone());

        // The source itself keeps Published, so the clone cannot share it.
        let err = VersionFactory::create_entity_version(
            &mut uow,
            published,
            VersioningMode::Standard,
            Some(PublishingStatus::Published),
        )
        .unwrap_err();
        assert_matches!(err, VersioningError::PublishedVersionExists { .. });
    }

    #[test]
    fn test_editing_archived_version_is_rejected() {
        let mut uow = uow();
        let deleted = entity_with_version(PublishingStatus::Deleted, VersionNumber::new(1, 0));
        uow.seed(deleted.clone());

        let err = VersionFactory::create_entity_version(
            &mut uow,
            deleted,
            VersioningMode::Standard,
            None,
        )
        .unwrap_err();
        assert_matches!(err, VersioningError::SourceStatusNotAllowed { .. });
        assert!(err.is_state_error());
    }

    #[test]
    fn test_clone_minor_skips_used_numbers() {
        let mut uow = uow();
        let published = entity_with_version(PublishingStatus::Published, VersionNumber::new(2, 0));
        let root = published.root_id().unwrap();
        let mut old = entity_with_version(PublishingStatus::OldPublished, VersionNumber::new(2, 3));
        old.root = Some(root);
        uow.seed(published.clone());
        uow.seed(old);

        let editable = VersionFactory::create_entity_version(
            &mut uow,
            published,
            VersioningMode::Standard,
            None,
        )
        .unwrap();
        assert_eq!(editable.version(), VersionNumber::new(2, 4));
    }
}

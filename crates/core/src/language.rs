//! Per-language publishing status, independent of the entity-level status.
//!
//! A version of a multi-language item carries one availability row per
//! language, each with its own lifecycle status and optional scheduling
//! timestamps. Changes here run independently of the entity state machine
//! and can leave the aggregate status transiently inconsistent — callers
//! re-derive it through [`LanguageStatusCoordinator::derived_status`] after
//! any per-language change.
//!
//! Both mutation entry points enforce the no-invisible-content guard: a
//! change that would leave zero languages in a visible status (Published or
//! Draft) is rejected before any row is touched. The guard holds at the
//! engine boundary unconditionally; call sites that need a looser rule must
//! pre-filter, pending product clarification.

use serde::{Deserialize, Serialize};

use crate::entity::{LanguageAvailability, VersionedEntity};
use crate::error::VersioningError;
use crate::status::PublishingStatus;
use crate::types::{LanguageId, Timestamp, VersionId};
use crate::uow::UnitOfWork;

/// Explicit per-language target for bulk operations: status plus the
/// scheduling timestamps to store alongside it (`None` clears a schedule).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageAvailabilityInfo {
    pub language_id: LanguageId,
    pub status: PublishingStatus,
    pub publish_at: Option<Timestamp>,
    pub archive_at: Option<Timestamp>,
}

impl LanguageAvailabilityInfo {
    pub fn new(language_id: LanguageId, status: PublishingStatus) -> Self {
        Self {
            language_id,
            status,
            publish_at: None,
            archive_at: None,
        }
    }
}

pub struct LanguageStatusCoordinator;

impl LanguageStatusCoordinator {
    /// Move every language row matching the filters to `status_to`.
    ///
    /// `from_filter` restricts by current status, `languages` by language
    /// id; `None` means no restriction. Returns the number of rows changed.
    pub fn change_status<E, U>(
        uow: &mut U,
        id: VersionId,
        status_to: PublishingStatus,
        from_filter: Option<&[PublishingStatus]>,
        languages: Option<&[LanguageId]>,
    ) -> Result<usize, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;

        let selected: Vec<LanguageId> = entity
            .languages()
            .iter()
            .filter(|row| {
                from_filter.map_or(true, |from| from.contains(&row.status))
                    && languages.map_or(true, |ids| ids.contains(&row.language_id))
            })
            .map(|row| row.language_id)
            .collect();
        if selected.is_empty() {
            return Ok(0);
        }

        Self::guard_visible_after(&entity, |row| {
            if selected.contains(&row.language_id) {
                status_to
            } else {
                row.status
            }
        })?;

        let (user, now) = (uow.user().to_owned(), uow.now());
        for row in entity.languages_mut() {
            if selected.contains(&row.language_id) {
                row.status = status_to;
                row.modified = now;
                row.modified_by = user.clone();
            }
        }
        uow.upsert(entity);
        Ok(selected.len())
    }

    /// Apply an explicit per-language target map — e.g. publish Finnish
    /// while leaving Swedish as Draft in the same call. Languages without a
    /// row yet get one created.
    pub fn apply_statuses<E, U>(
        uow: &mut U,
        id: VersionId,
        targets: &[LanguageAvailabilityInfo],
    ) -> Result<usize, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        if targets.is_empty() {
            return Ok(0);
        }

        let target_of = |language: LanguageId| -> Option<&LanguageAvailabilityInfo> {
            targets.iter().find(|t| t.language_id == language)
        };

        // Simulate the resulting set first: existing rows with targets
        // applied, plus rows the targets would create.
        let mut resulting: Vec<PublishingStatus> = entity
            .languages()
            .iter()
            .map(|row| target_of(row.language_id).map_or(row.status, |t| t.status))
            .collect();
        for target in targets {
            if !entity
                .languages()
                .iter()
                .any(|row| row.language_id == target.language_id)
            {
                resulting.push(target.status);
            }
        }
        if !resulting.iter().any(|status| {
            matches!(
                status,
                PublishingStatus::Published | PublishingStatus::Draft
            )
        }) {
            return Err(VersioningError::NoVisibleLanguage { version: id });
        }

        let (user, now) = (uow.user().to_owned(), uow.now());
        let mut changed = 0;
        for row in entity.languages_mut() {
            if let Some(target) = targets.iter().find(|t| t.language_id == row.language_id) {
                row.status = target.status;
                row.publish_at = target.publish_at;
                row.archive_at = target.archive_at;
                row.modified = now;
                row.modified_by = user.clone();
                changed += 1;
            }
        }
        for target in targets {
            let exists = entity
                .languages()
                .iter()
                .any(|row| row.language_id == target.language_id);
            if !exists {
                let mut row =
                    LanguageAvailability::new(target.language_id, target.status, &user, now);
                row.publish_at = target.publish_at;
                row.archive_at = target.archive_at;
                entity.languages_mut().push(row);
                changed += 1;
            }
        }
        uow.upsert(entity);
        Ok(changed)
    }

    /// Aggregate status implied by the language rows: Published iff at
    /// least one language is Published, otherwise the best remaining
    /// language status; the entity's own status when it has no languages.
    pub fn derived_status<E: VersionedEntity>(entity: &E) -> PublishingStatus {
        let statuses: Vec<PublishingStatus> =
            entity.languages().iter().map(|row| row.status).collect();
        if statuses.is_empty() {
            return entity.status();
        }
        for candidate in [
            PublishingStatus::Published,
            PublishingStatus::Draft,
            PublishingStatus::Modified,
            PublishingStatus::OldPublished,
        ] {
            if statuses.contains(&candidate) {
                return candidate;
            }
        }
        PublishingStatus::Deleted
    }

    /// Language transitions whose scheduled time has passed: `archive_at`
    /// moves a row to Deleted, `publish_at` to Published. A row due for
    /// both archives — the later editorial decision wins.
    pub fn due_schedule_changes<E: VersionedEntity>(
        entity: &E,
        now: Timestamp,
    ) -> Vec<LanguageAvailabilityInfo> {
        entity
            .languages()
            .iter()
            .filter_map(|row| {
                if row.archive_at.is_some_and(|at| at <= now)
                    && row.status != PublishingStatus::Deleted
                {
                    return Some(LanguageAvailabilityInfo {
                        language_id: row.language_id,
                        status: PublishingStatus::Deleted,
                        publish_at: row.publish_at,
                        archive_at: None,
                    });
                }
                if row.publish_at.is_some_and(|at| at <= now)
                    && row.status != PublishingStatus::Published
                {
                    return Some(LanguageAvailabilityInfo {
                        language_id: row.language_id,
                        status: PublishingStatus::Published,
                        publish_at: None,
                        archive_at: row.archive_at,
                    });
                }
                None
            })
            .collect()
    }

    /// Apply every due scheduled transition for the version, consuming the
    /// triggering timestamps. The visibility guard applies as usual, so a
    /// schedule that would archive the last visible language is rejected.
    pub fn apply_due_schedules<E, U>(uow: &mut U, id: VersionId) -> Result<usize, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        let due = Self::due_schedule_changes(&entity, uow.now());
        if due.is_empty() {
            return Ok(0);
        }
        Self::apply_statuses(uow, id, &due)
    }

    /// Shared guard: the resulting language set must keep at least one
    /// visible (Published or Draft) member. Entities without language rows
    /// are exempt — there is nothing to make invisible.
    fn guard_visible_after<E: VersionedEntity>(
        entity: &E,
        resulting: impl Fn(&LanguageAvailability) -> PublishingStatus,
    ) -> Result<(), VersioningError> {
        if entity.languages().is_empty() {
            return Ok(());
        }
        let any_visible = entity.languages().iter().any(|row| {
            matches!(
                resulting(row),
                PublishingStatus::Published | PublishingStatus::Draft
            )
        });
        if any_visible {
            Ok(())
        } else {
            Err(VersioningError::NoVisibleLanguage {
                version: entity.version_id(),
            })
        }
    }
}

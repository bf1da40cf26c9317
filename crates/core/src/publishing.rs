//! The publish / withdraw / restore / archive state machine.
//!
//! Every operation computes its full affected set in memory before touching
//! a single row: if any guard fails, the unit of work receives no mutation
//! at all. A successful operation returns one [`PublishingAffectedResult`]
//! per transitioned version so the caller can audit and persist the whole
//! set atomically.

use serde::Serialize;

use crate::entity::VersionedEntity;
use crate::error::VersioningError;
use crate::factory::{VersionFactory, VersioningMode};
use crate::status::PublishingStatus;
use crate::types::{VersionId, VersionNumber};
use crate::uow::UnitOfWork;

/// Audit record of one status transition caused by a single operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishingAffectedResult {
    pub id: VersionId,
    pub status_old: PublishingStatus,
    pub status_new: PublishingStatus,
}

/// Seam for the content-type-specific business validation a publish must
/// pass. The engine knows nothing about service classes or mandatory
/// fields; the calling service supplies the rules.
pub trait PublishValidator<E> {
    fn validate(&self, entity: &E) -> Result<(), String>;
}

/// Accepts everything. The default for content types without publish rules.
pub struct NoValidation;

impl<E> PublishValidator<E> for NoValidation {
    fn validate(&self, _entity: &E) -> Result<(), String> {
        Ok(())
    }
}

/// Source statuses a withdraw is permitted from unless the caller widens
/// the set.
pub const DEFAULT_WITHDRAW_SOURCES: &[PublishingStatus] = &[PublishingStatus::Published];

pub struct PublishingCoordinator;

impl PublishingCoordinator {
    /// Publish a Draft or Modified version.
    ///
    /// The target status is deliberately not a parameter: Published is the
    /// only promotion this operation performs, and transitions away from
    /// Published go through [`Self::change_to_modified`] or
    /// [`Self::archive`] so their demotion rules cannot be bypassed.
    ///
    /// The version moves to the next major (`n.0`) and becomes Published;
    /// if a different version of the root currently holds Published, it is
    /// demoted to OldPublished in the same operation. Language availability
    /// rows are left exactly as the caller staged them through the language
    /// coordinator — but at least one language must already be Published,
    /// otherwise the item would go live while visible in no language.
    pub fn publish_version<E, U, V>(
        uow: &mut U,
        id: VersionId,
        validator: &V,
    ) -> Result<Vec<PublishingAffectedResult>, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
        V: PublishValidator<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        let from = entity.status();
        if !matches!(from, PublishingStatus::Draft | PublishingStatus::Modified) {
            return Err(VersioningError::InvalidTransition {
                from,
                to: PublishingStatus::Published,
            });
        }
        let root = entity.root_id().ok_or(VersioningError::MissingRoot(id))?;

        validator
            .validate(&entity)
            .map_err(VersioningError::PublishValidation)?;
        if !entity
            .languages()
            .iter()
            .any(|l| l.status == PublishingStatus::Published)
        {
            return Err(VersioningError::NoVisibleLanguage { version: id });
        }

        let siblings = uow.versions_of_root(root);
        let max_major = siblings
            .iter()
            .map(|v| v.version().major)
            .max()
            .unwrap_or(0);
        let superseded = siblings
            .iter()
            .find(|v| v.status() == PublishingStatus::Published && v.version_id() != id)
            .cloned();

        let (user, now) = (uow.user().to_owned(), uow.now());
        let mut affected = Vec::with_capacity(2);

        entity.set_status(PublishingStatus::Published);
        entity.set_version(VersionNumber::new(max_major + 1, 0));
        entity.stamp(&user, now);
        affected.push(PublishingAffectedResult {
            id,
            status_old: from,
            status_new: PublishingStatus::Published,
        });
        uow.upsert(entity);

        if let Some(mut prev) = superseded {
            prev.set_status(PublishingStatus::OldPublished);
            prev.stamp(&user, now);
            affected.push(PublishingAffectedResult {
                id: prev.version_id(),
                status_old: PublishingStatus::Published,
                status_new: PublishingStatus::OldPublished,
            });
            uow.upsert(prev);
        }

        Ok(affected)
    }

    /// Withdraw: take a published version out of publication by branching
    /// an editable Modified copy and demoting the published row to
    /// OldPublished.
    ///
    /// Only permitted from `allowed_sources` (defaults to Published via
    /// [`DEFAULT_WITHDRAW_SOURCES`]). Conflicts if a Modified version
    /// already exists for the root — withdrawal and ordinary editing cannot
    /// both produce a second Modified version.
    pub fn change_to_modified<E, U>(
        uow: &mut U,
        id: VersionId,
        allowed_sources: &[PublishingStatus],
    ) -> Result<Vec<PublishingAffectedResult>, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        let from = entity.status();
        if !allowed_sources.contains(&from) {
            return Err(VersioningError::SourceStatusNotAllowed { status: from });
        }
        let root = entity.root_id().ok_or(VersioningError::MissingRoot(id))?;

        let siblings = uow.versions_of_root(root);
        if siblings
            .iter()
            .any(|v| v.status() == PublishingStatus::Modified)
        {
            return Err(VersioningError::ModifiedVersionExists { root });
        }

        let branched = VersionFactory::create_entity_version(
            uow,
            entity.clone(),
            VersioningMode::ForcedClone,
            Some(PublishingStatus::Modified),
        )?;
        let mut affected = vec![PublishingAffectedResult {
            id: branched.version_id(),
            status_old: from,
            status_new: PublishingStatus::Modified,
        }];

        if from == PublishingStatus::Published {
            let (user, now) = (uow.user().to_owned(), uow.now());
            entity.set_status(PublishingStatus::OldPublished);
            entity.stamp(&user, now);
            affected.push(PublishingAffectedResult {
                id,
                status_old: PublishingStatus::Published,
                status_new: PublishingStatus::OldPublished,
            });
            uow.upsert(entity);
        }

        Ok(affected)
    }

    /// Restore an archived version to an editable state.
    ///
    /// The last known live status is not stored anywhere, so it is
    /// re-derived from the version counters: a version that has been
    /// through a publish restores as Modified, a never-published one as
    /// Draft. The one-editable-per-root invariant applies unchanged.
    pub fn restore<E, U>(
        uow: &mut U,
        id: VersionId,
    ) -> Result<Vec<PublishingAffectedResult>, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        let from = entity.status();
        if from != PublishingStatus::Deleted {
            return Err(VersioningError::SourceStatusNotAllowed { status: from });
        }
        let root = entity.root_id().ok_or(VersioningError::MissingRoot(id))?;

        let target = if entity.version().has_been_published() {
            PublishingStatus::Modified
        } else {
            PublishingStatus::Draft
        };
        let siblings = uow.versions_of_root(root);
        if siblings
            .iter()
            .any(|v| v.status() == target && v.version_id() != id)
        {
            return Err(match target {
                PublishingStatus::Modified => VersioningError::ModifiedVersionExists { root },
                _ => VersioningError::DraftVersionExists { root },
            });
        }

        let (user, now) = (uow.user().to_owned(), uow.now());
        entity.set_status(target);
        entity.stamp(&user, now);
        uow.upsert(entity);
        Ok(vec![PublishingAffectedResult {
            id,
            status_old: PublishingStatus::Deleted,
            status_new: target,
        }])
    }

    /// Archive a live version. Terminal: the version drops out of every
    /// default query and out of all transitions except [`Self::restore`].
    pub fn archive<E, U>(
        uow: &mut U,
        id: VersionId,
    ) -> Result<Vec<PublishingAffectedResult>, VersioningError>
    where
        E: VersionedEntity,
        U: UnitOfWork<E>,
    {
        let mut entity = uow.get(id).ok_or(VersioningError::VersionNotFound(id))?;
        let from = entity.status();
        if !from.is_live() {
            return Err(VersioningError::InvalidTransition {
                from,
                to: PublishingStatus::Deleted,
            });
        }

        let (user, now) = (uow.user().to_owned(), uow.now());
        entity.set_status(PublishingStatus::Deleted);
        entity.stamp(&user, now);
        uow.upsert(entity);
        Ok(vec![PublishingAffectedResult {
            id,
            status_old: from,
            status_new: PublishingStatus::Deleted,
        }])
    }
}

//! Version selection: pure queries over the versions of a root.
//!
//! Given the set of versions sharing a root, these functions pick "the"
//! version for a filter — an exact status, the fallback priority order, or
//! the full history. They are side-effect-free; the coordinators and the
//! storage layer both go through them so the selection rules cannot drift
//! between read paths.

use serde::Serialize;

use crate::entity::VersionedEntity;
use crate::status::{PublishingStatus, StatusFilter};
use crate::types::{RootId, VersionId, VersionNumber};
use crate::uow::UnitOfWork;

/// Read-only projection used to answer "list all versions" queries without
/// materializing full entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub version_id: VersionId,
    pub root_id: Option<RootId>,
    pub version: VersionNumber,
    pub status: PublishingStatus,
}

/// The version holding exactly `status`, or none.
///
/// Statuses constrained to one live holder per root (Draft, Modified,
/// Published) yield that holder; for OldPublished the newest one wins.
pub fn specific_version<E: VersionedEntity>(
    versions: &[E],
    status: PublishingStatus,
) -> Option<&E> {
    versions
        .iter()
        .filter(|v| v.status() == status)
        .max_by_key(|v| v.version())
}

/// Keep only versions matching `filter`.
pub fn filter_by<E: VersionedEntity>(versions: &[E], filter: StatusFilter) -> Vec<&E> {
    versions.iter().filter(|v| filter.matches(v.status())).collect()
}

/// Keep only the live set (Draft, Modified, Published) — the default for
/// almost every read path.
pub fn filter_live<E: VersionedEntity>(versions: &[E]) -> Vec<&E> {
    filter_by(versions, StatusFilter::Live)
}

/// Order by the fallback priority table, newest version first within equal
/// priority. The first element is "the current representative version".
pub fn order_by_priority_fallback<E: VersionedEntity>(versions: &[E]) -> Vec<&E> {
    let mut ordered: Vec<&E> = versions.iter().collect();
    ordered.sort_by(|a, b| {
        a.status()
            .priority()
            .cmp(&b.status().priority())
            .then_with(|| b.version().cmp(&a.version()))
    });
    ordered
}

/// The current representative version: highest-priority member of the live
/// set. This is how callers get "the" version without knowing which
/// statuses exist.
pub fn representative<E: VersionedEntity>(versions: &[E]) -> Option<&E> {
    let live: Vec<&E> = filter_live(versions);
    live.into_iter().min_by_key(|v| {
        (
            v.status().priority(),
            std::cmp::Reverse(v.version()),
        )
    })
}

/// Every version, newest first, for audit/history display.
pub fn all_versions<E: VersionedEntity>(versions: &[E]) -> Vec<VersionInfo> {
    let mut infos: Vec<VersionInfo> = versions
        .iter()
        .map(|v| VersionInfo {
            version_id: v.version_id(),
            root_id: v.root_id(),
            version: v.version(),
            status: v.status(),
        })
        .collect();
    infos.sort_by(|a, b| b.version.cmp(&a.version));
    infos
}

/// The live Published version of the root, if any.
pub fn last_published_version<E: VersionedEntity>(versions: &[E]) -> Option<&E> {
    specific_version(versions, PublishingStatus::Published)
}

/// The Modified version of the root, if any.
pub fn last_modified_version<E: VersionedEntity>(versions: &[E]) -> Option<&E> {
    specific_version(versions, PublishingStatus::Modified)
}

/// The newest version whose status is neither Modified nor Deleted: the
/// anchor a restore re-derives its target status from.
pub fn get_not_modified_version<E: VersionedEntity>(versions: &[E]) -> Option<&E> {
    versions
        .iter()
        .filter(|v| {
            !matches!(
                v.status(),
                PublishingStatus::Modified | PublishingStatus::Deleted
            )
        })
        .max_by_key(|v| v.version())
}

/// Archived and superseded versions cannot be edited without a restore.
pub fn is_allowed_for_editing<E: VersionedEntity>(entity: &E) -> bool {
    entity.status().is_live()
}

// ── Unit-of-work lookups ─────────────────────────────────────────────

/// The version of `root` holding exactly `status`.
pub fn get_specific_version_by_root<E, U>(
    uow: &U,
    root: RootId,
    status: PublishingStatus,
) -> Option<E>
where
    E: VersionedEntity,
    U: UnitOfWork<E>,
{
    let versions = uow.versions_of_root(root);
    specific_version(&versions, status).cloned()
}

/// Id-only variant of [`get_specific_version_by_root`].
pub fn get_version_id<E, U>(uow: &U, root: RootId, status: PublishingStatus) -> Option<VersionId>
where
    E: VersionedEntity,
    U: UnitOfWork<E>,
{
    get_specific_version_by_root(uow, root, status).map(|v| v.version_id())
}

/// Root identity of a version.
pub fn get_unific_root_id<E, U>(uow: &U, version_id: VersionId) -> Option<RootId>
where
    E: VersionedEntity,
    U: UnitOfWork<E>,
{
    uow.get(version_id).and_then(|v| v.root_id())
}

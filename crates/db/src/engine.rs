//! Transaction orchestration for versioning operations.
//!
//! Every write operation follows the same shape: open a transaction, lock
//! and load the affected root's versions into a [`MemoryUnitOfWork`], run
//! the pure transition from `verso-core` against it, then persist the
//! drained changes and commit. A failed guard aborts before any row was
//! written, so partial transitions never reach the database.

use chrono::Utc;
use sqlx::PgConnection;
use uuid::Uuid;

use verso_core::{
    publishing::DEFAULT_WITHDRAW_SOURCES, LanguageAvailabilityInfo, LanguageId,
    LanguageStatusCoordinator, MemoryUnitOfWork, NoValidation, PublishValidator,
    PublishingAffectedResult, PublishingCoordinator, PublishingStatus, RootId, UnitOfWork,
    VersionFactory, VersionId, VersioningError, VersioningMode,
};

use crate::error::StoreError;
use crate::models::ContentVersion;
use crate::repositories::{RootRepo, VersionRepo};
use crate::DbPool;

/// Runs versioning operations against PostgreSQL, one transaction per
/// operation, on behalf of a named editor.
pub struct VersioningEngine {
    pool: DbPool,
}

impl VersioningEngine {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    // ── Version lifecycle ────────────────────────────────────────────

    /// First save of a new content item: allocates a unific root and stores
    /// version 0.1 as Draft, with a draft availability row per language.
    pub async fn create_version(
        &self,
        languages: &[LanguageId],
        user: &str,
    ) -> Result<ContentVersion, StoreError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();
        let mut uow = MemoryUnitOfWork::new(user, now);
        let entity = ContentVersion::new(languages, user, now);
        let saved =
            VersionFactory::create_entity_version(&mut uow, entity, VersioningMode::Standard, None)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        tracing::debug!(version_id = %saved.id, root_id = ?saved.root_id, "created version");
        Ok(saved)
    }

    /// Produce the version that should receive an edit, cloning when the
    /// source is Published. Returns the editable version, freshly stamped.
    pub async fn edit_version(
        &self,
        id: VersionId,
        user: &str,
    ) -> Result<ContentVersion, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let entity = uow
            .get(id)
            .ok_or(VersioningError::VersionNotFound(id))?;
        let editable =
            VersionFactory::create_entity_version(&mut uow, entity, VersioningMode::Standard, None)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        Ok(editable)
    }

    // ── Publishing transitions ───────────────────────────────────────

    /// Publish a Draft or Modified version after it passes `validator`.
    pub async fn publish<V>(
        &self,
        id: VersionId,
        user: &str,
        validator: &V,
    ) -> Result<Vec<PublishingAffectedResult>, StoreError>
    where
        V: PublishValidator<ContentVersion>,
    {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let affected = PublishingCoordinator::publish_version(&mut uow, id, validator)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        tracing::info!(version_id = %id, transitions = affected.len(), "published version");
        Ok(affected)
    }

    /// Publish without content-type-specific validation.
    pub async fn publish_unvalidated(
        &self,
        id: VersionId,
        user: &str,
    ) -> Result<Vec<PublishingAffectedResult>, StoreError> {
        self.publish(id, user, &NoValidation).await
    }

    /// Withdraw a published version: branch an editable Modified copy and
    /// demote the published row to OldPublished.
    pub async fn withdraw(
        &self,
        id: VersionId,
        user: &str,
    ) -> Result<Vec<PublishingAffectedResult>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let affected =
            PublishingCoordinator::change_to_modified(&mut uow, id, DEFAULT_WITHDRAW_SOURCES)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        tracing::info!(version_id = %id, "withdrew version");
        Ok(affected)
    }

    /// Restore an archived version to an editable state.
    pub async fn restore(
        &self,
        id: VersionId,
        user: &str,
    ) -> Result<Vec<PublishingAffectedResult>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let affected = PublishingCoordinator::restore(&mut uow, id)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        Ok(affected)
    }

    /// Archive a live version (soft delete).
    pub async fn archive(
        &self,
        id: VersionId,
        user: &str,
    ) -> Result<Vec<PublishingAffectedResult>, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let affected = PublishingCoordinator::archive(&mut uow, id)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        Ok(affected)
    }

    // ── Language availability ────────────────────────────────────────

    /// Move a version's language rows matching the filters to `status_to`.
    /// Returns the number of rows changed; zero when nothing matched.
    pub async fn change_language_status(
        &self,
        id: VersionId,
        user: &str,
        status_to: PublishingStatus,
        from_filter: Option<&[PublishingStatus]>,
        languages: Option<&[LanguageId]>,
    ) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let changed =
            LanguageStatusCoordinator::change_status(&mut uow, id, status_to, from_filter, languages)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        Ok(changed)
    }

    /// Set per-language statuses and schedules in one operation, creating
    /// availability rows for languages the version does not carry yet.
    pub async fn apply_language_statuses(
        &self,
        id: VersionId,
        user: &str,
        targets: &[LanguageAvailabilityInfo],
    ) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let changed = LanguageStatusCoordinator::apply_statuses(&mut uow, id, targets)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        Ok(changed)
    }

    /// Apply any PublishAt / ArchiveAt schedules on the version that are
    /// due, consuming the timestamps. Meant to run from a periodic task.
    pub async fn apply_due_schedules(&self, id: VersionId, user: &str) -> Result<usize, StoreError> {
        let mut tx = self.pool.begin().await?;
        let mut uow = load_locked(&mut tx, id, user).await?;
        let changed = LanguageStatusCoordinator::apply_due_schedules(&mut uow, id)?;
        persist(&mut tx, &mut uow).await?;
        tx.commit().await?;
        if changed > 0 {
            tracing::debug!(version_id = %id, changed, "applied due language schedules");
        }
        Ok(changed)
    }
}

/// Resolve the root of `id`, lock every version row under it and seed a
/// unit of work with them.
async fn load_locked(
    conn: &mut PgConnection,
    id: VersionId,
    user: &str,
) -> Result<MemoryUnitOfWork<ContentVersion>, StoreError> {
    let root = root_of(&mut *conn, id).await?;
    let versions = VersionRepo::versions_of_root_for_update(&mut *conn, root).await?;
    let mut uow = MemoryUnitOfWork::new(user, Utc::now());
    for version in versions {
        uow.seed(version);
    }
    Ok(uow)
}

async fn root_of(conn: &mut PgConnection, id: VersionId) -> Result<RootId, StoreError> {
    let row: Option<(Uuid,)> =
        sqlx::query_as("SELECT root_id FROM content_versions WHERE id = $1")
            .bind(id)
            .fetch_optional(conn)
            .await?;
    row.map(|r| r.0)
        .ok_or_else(|| VersioningError::VersionNotFound(id).into())
}

/// Write the unit of work's accumulated changes: new roots first (foreign
/// key order), then every created or mutated version row.
async fn persist(
    conn: &mut PgConnection,
    uow: &mut MemoryUnitOfWork<ContentVersion>,
) -> Result<(), StoreError> {
    for root in uow.drain_created_roots() {
        RootRepo::insert(&mut *conn, root).await?;
    }
    let mut changes = uow.drain_changes();
    // The partial unique indexes are checked per statement, so the row
    // leaving a guarded status (a demotion to OldPublished or Deleted) must
    // hit the database before the row entering it.
    changes.sort_by_key(|entity| u8::from(entity.status.is_live()));
    tracing::debug!(rows = changes.len(), "persisting versioning changes");
    for entity in &changes {
        VersionRepo::save(&mut *conn, entity).await?;
    }
    Ok(())
}

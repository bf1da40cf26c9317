//! Repository for the `content_versions` and `language_availabilities`
//! tables.

use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use verso_core::{
    selector::VersionInfo, PublishingStatus, RootId, VersionId, VersionNumber, VersioningError,
};

use crate::error::StoreError;
use crate::models::content_version::{
    ContentVersion, ContentVersionRow, LanguageAvailabilityRow,
};

/// Column list shared across version queries.
const COLUMNS: &str =
    "id, root_id, version_major, version_minor, publishing_status, modified, modified_by";

/// Column list shared across language availability queries.
const LANGUAGE_COLUMNS: &str =
    "version_id, language_id, publishing_status, publish_at, archive_at, modified, modified_by";

/// Provides persistence and lookups for content versions.
pub struct VersionRepo;

impl VersionRepo {
    // ── Lookups ──────────────────────────────────────────────────────

    /// Fetch one version with its language rows.
    pub async fn find_by_id(
        pool: &PgPool,
        id: VersionId,
    ) -> Result<Option<ContentVersion>, StoreError> {
        let query = format!("SELECT {COLUMNS} FROM content_versions WHERE id = $1");
        let row = sqlx::query_as::<_, ContentVersionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let languages = Self::languages_of(pool, &[row.id]).await?;
        Ok(Some(ContentVersion::assemble(row, languages)?))
    }

    /// Every version under a root, newest version number first, with
    /// language rows attached.
    pub async fn versions_of_root(
        pool: &PgPool,
        root: RootId,
    ) -> Result<Vec<ContentVersion>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_versions
             WHERE root_id = $1
             ORDER BY version_major DESC, version_minor DESC"
        );
        let rows = sqlx::query_as::<_, ContentVersionRow>(&query)
            .bind(root)
            .fetch_all(pool)
            .await?;
        Self::assemble_all(pool, rows).await
    }

    /// Same as [`Self::versions_of_root`], but run inside a transaction with
    /// the version rows locked until commit. Serializes concurrent
    /// transitions on the same root.
    pub async fn versions_of_root_for_update(
        conn: &mut PgConnection,
        root: RootId,
    ) -> Result<Vec<ContentVersion>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_versions
             WHERE root_id = $1
             ORDER BY version_major DESC, version_minor DESC
             FOR UPDATE"
        );
        let rows = sqlx::query_as::<_, ContentVersionRow>(&query)
            .bind(root)
            .fetch_all(&mut *conn)
            .await?;
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let language_query = format!(
            "SELECT {LANGUAGE_COLUMNS} FROM language_availabilities
             WHERE version_id = ANY($1)
             ORDER BY language_id"
        );
        let languages = sqlx::query_as::<_, LanguageAvailabilityRow>(&language_query)
            .bind(&ids)
            .fetch_all(conn)
            .await?;
        Self::group_by_version(rows, languages)
    }

    /// History projection: every version of a root, newest first, without
    /// materializing language rows.
    pub async fn list_version_infos(
        pool: &PgPool,
        root: RootId,
    ) -> Result<Vec<VersionInfo>, StoreError> {
        let query = format!(
            "SELECT {COLUMNS} FROM content_versions
             WHERE root_id = $1
             ORDER BY version_major DESC, version_minor DESC"
        );
        let rows = sqlx::query_as::<_, ContentVersionRow>(&query)
            .bind(root)
            .fetch_all(pool)
            .await?;
        rows.into_iter()
            .map(|row| {
                Ok(VersionInfo {
                    version_id: row.id,
                    root_id: Some(row.root_id),
                    version: VersionNumber::new(row.version_major, row.version_minor),
                    status: row
                        .publishing_status
                        .parse()
                        .map_err(StoreError::Engine)?,
                })
            })
            .collect()
    }

    /// Id of the version of `root` holding exactly `status`, if any.
    pub async fn get_version_id(
        pool: &PgPool,
        root: RootId,
        status: PublishingStatus,
    ) -> Result<Option<VersionId>, StoreError> {
        let row: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM content_versions
             WHERE root_id = $1 AND publishing_status = $2
             ORDER BY version_major DESC, version_minor DESC
             LIMIT 1",
        )
        .bind(root)
        .bind(status.as_str())
        .fetch_optional(pool)
        .await?;
        Ok(row.map(|r| r.0))
    }

    /// Root identity of a version.
    pub async fn get_root_id(
        pool: &PgPool,
        version_id: VersionId,
    ) -> Result<Option<RootId>, StoreError> {
        let row: Option<(Uuid,)> =
            sqlx::query_as("SELECT root_id FROM content_versions WHERE id = $1")
                .bind(version_id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Upsert a version row and replace its language rows.
    ///
    /// Violations of the one-Draft / one-Modified-per-root partial indexes
    /// surface as the engine's conflict errors; this is the storage-level
    /// enforcement a concurrent editor runs into when the in-memory guard
    /// was computed against stale state.
    pub async fn save(
        conn: &mut PgConnection,
        entity: &ContentVersion,
    ) -> Result<(), StoreError> {
        let root = entity
            .root_id
            .ok_or(VersioningError::MissingRoot(entity.id))?;

        sqlx::query(
            "INSERT INTO content_versions
                (id, root_id, version_major, version_minor, publishing_status, modified, modified_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (id) DO UPDATE SET
                version_major = EXCLUDED.version_major,
                version_minor = EXCLUDED.version_minor,
                publishing_status = EXCLUDED.publishing_status,
                modified = EXCLUDED.modified,
                modified_by = EXCLUDED.modified_by",
        )
        .bind(entity.id)
        .bind(root)
        .bind(entity.version.major)
        .bind(entity.version.minor)
        .bind(entity.status.as_str())
        .bind(entity.modified)
        .bind(&entity.modified_by)
        .execute(&mut *conn)
        .await
        .map_err(|e| StoreError::from_save_error(e, root))?;

        sqlx::query("DELETE FROM language_availabilities WHERE version_id = $1")
            .bind(entity.id)
            .execute(&mut *conn)
            .await?;
        for language in &entity.languages {
            sqlx::query(
                "INSERT INTO language_availabilities
                    (version_id, language_id, publishing_status, publish_at, archive_at, modified, modified_by)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(entity.id)
            .bind(language.language_id)
            .bind(language.status.as_str())
            .bind(language.publish_at)
            .bind(language.archive_at)
            .bind(language.modified)
            .bind(&language.modified_by)
            .execute(&mut *conn)
            .await?;
        }
        Ok(())
    }

    /// Hard-delete a version and its language rows. Reserved for permanent
    /// purging; the editorial flow archives instead.
    pub async fn purge(conn: &mut PgConnection, id: VersionId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content_versions WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // ── Internal ─────────────────────────────────────────────────────

    async fn languages_of(
        pool: &PgPool,
        version_ids: &[Uuid],
    ) -> Result<Vec<LanguageAvailabilityRow>, StoreError> {
        let query = format!(
            "SELECT {LANGUAGE_COLUMNS} FROM language_availabilities
             WHERE version_id = ANY($1)
             ORDER BY language_id"
        );
        Ok(sqlx::query_as::<_, LanguageAvailabilityRow>(&query)
            .bind(version_ids)
            .fetch_all(pool)
            .await?)
    }

    async fn assemble_all(
        pool: &PgPool,
        rows: Vec<ContentVersionRow>,
    ) -> Result<Vec<ContentVersion>, StoreError> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let languages = Self::languages_of(pool, &ids).await?;
        Self::group_by_version(rows, languages)
    }

    fn group_by_version(
        rows: Vec<ContentVersionRow>,
        languages: Vec<LanguageAvailabilityRow>,
    ) -> Result<Vec<ContentVersion>, StoreError> {
        let mut versions = Vec::with_capacity(rows.len());
        for row in rows {
            let own: Vec<LanguageAvailabilityRow> = languages
                .iter()
                .filter(|l| l.version_id == row.id)
                .cloned()
                .collect();
            versions.push(ContentVersion::assemble(row, own)?);
        }
        Ok(versions)
    }
}

//! Repository for the `unific_roots` table.

use sqlx::{PgConnection, PgPool};

use verso_core::RootId;

/// Provides operations on unific roots — the stable identities shared by
/// every version of one logical content item.
pub struct RootRepo;

impl RootRepo {
    /// Insert a root allocated by the engine.
    pub async fn insert(conn: &mut PgConnection, root: RootId) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO unific_roots (id) VALUES ($1)")
            .bind(root)
            .execute(conn)
            .await?;
        Ok(())
    }

    pub async fn exists(pool: &PgPool, root: RootId) -> Result<bool, sqlx::Error> {
        let row: (bool,) =
            sqlx::query_as("SELECT EXISTS (SELECT 1 FROM unific_roots WHERE id = $1)")
                .bind(root)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }

    /// Delete a root once every version under it is gone. No-op while
    /// versions remain — the root lives as long as any version does.
    pub async fn purge_if_empty(conn: &mut PgConnection, root: RootId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM unific_roots
             WHERE id = $1
               AND NOT EXISTS (SELECT 1 FROM content_versions WHERE root_id = $1)",
        )
        .bind(root)
        .execute(conn)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

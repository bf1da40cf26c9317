//! Verso storage layer.
//!
//! PostgreSQL collaborator for the versioning engine in `verso-core`:
//!
//! - [`models`] — row structs and the assembled [`models::ContentVersion`]
//!   that implements the engine's `VersionedEntity` contract.
//! - [`repositories`] — CRUD and lookup queries over the versioning tables.
//! - [`engine`] — transaction orchestration: load a root's versions, run a
//!   core transition in memory, persist the affected set in one commit.
//!
//! The partial unique indexes in `migrations/` back the engine's
//! one-editable-version-per-root invariants at the storage level.

pub mod engine;
pub mod error;
pub mod models;
pub mod repositories;

pub use engine::VersioningEngine;
pub use error::StoreError;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

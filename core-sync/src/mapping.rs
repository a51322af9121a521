//! # Record Mapping Store
//!
//! Durable table mapping logical entities to their remote record lineage.
//!
//! ## Overview
//!
//! One row per logical entity — the source of truth for "does this entity
//! already exist remotely". Rows are created on first successful CREATE,
//! overwritten (new record id, new `updated_at`) on every successful UPDATE,
//! and never deleted by the engine. Failed entities keep their prior row
//! unchanged so a later run retries from the last recorded state.

use crate::error::{Result, SyncError};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

/// One logical entity's remote mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    pub logical_id: String,
    /// Most recent remote record id of the entity's lineage
    pub record_id: String,
    /// Number of files shipped with the mapped record
    pub file_count: u32,
    /// Unix seconds of the first successful create; preserved across updates
    pub created_at: i64,
    /// Unix seconds of the most recent successful create or update
    pub updated_at: i64,
}

/// Repository trait for mapping persistence.
#[async_trait]
pub trait MappingStore: Send + Sync {
    /// Find the entry for a logical entity.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    async fn find(&self, logical_id: &str) -> Result<Option<MappingEntry>>;

    /// All entries, ordered by logical id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    async fn load_all(&self) -> Result<Vec<MappingEntry>>;

    /// Insert or overwrite the entry for the entry's logical id.
    ///
    /// Last write wins per key; the caller is responsible for carrying the
    /// original `created_at` forward on updates.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails
    async fn upsert(&self, entry: &MappingEntry) -> Result<()>;
}

/// SQLite implementation of [`MappingStore`].
pub struct SqliteMappingStore {
    pool: SqlitePool,
}

impl SqliteMappingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create the mapping table when it does not exist yet.
    pub async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS record_mappings (
                logical_id TEXT PRIMARY KEY NOT NULL,
                record_id TEXT NOT NULL,
                file_count INTEGER NOT NULL DEFAULT 0,
                created_at INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Database row representation of a mapping entry
#[derive(Debug, FromRow)]
struct MappingRow {
    logical_id: String,
    record_id: String,
    file_count: i64,
    created_at: i64,
    updated_at: i64,
}

impl From<MappingRow> for MappingEntry {
    fn from(row: MappingRow) -> Self {
        MappingEntry {
            logical_id: row.logical_id,
            record_id: row.record_id,
            file_count: row.file_count.max(0) as u32,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl MappingStore for SqliteMappingStore {
    async fn find(&self, logical_id: &str) -> Result<Option<MappingEntry>> {
        let row: Option<MappingRow> = sqlx::query_as(
            r#"
            SELECT logical_id, record_id, file_count, created_at, updated_at
            FROM record_mappings
            WHERE logical_id = ?
            "#,
        )
        .bind(logical_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(row.map(MappingEntry::from))
    }

    async fn load_all(&self) -> Result<Vec<MappingEntry>> {
        let rows: Vec<MappingRow> = sqlx::query_as(
            r#"
            SELECT logical_id, record_id, file_count, created_at, updated_at
            FROM record_mappings
            ORDER BY logical_id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(rows.into_iter().map(MappingEntry::from).collect())
    }

    async fn upsert(&self, entry: &MappingEntry) -> Result<()> {
        // Single statement, so near-simultaneous completions serialize at
        // the database and cannot lose updates.
        sqlx::query(
            r#"
            INSERT INTO record_mappings (logical_id, record_id, file_count, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(logical_id) DO UPDATE SET
                record_id = excluded.record_id,
                file_count = excluded.file_count,
                created_at = excluded.created_at,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&entry.logical_id)
        .bind(&entry.record_id)
        .bind(entry.file_count as i64)
        .bind(entry.created_at)
        .bind(entry.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| SyncError::Database(e.to_string()))?;

        Ok(())
    }
}

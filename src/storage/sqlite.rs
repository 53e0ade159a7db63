//! SQLite persistence for work items
//!
//! Embedded file-backed store used for local development and tests.
//! Every operation checks a connection out of the sqlx pool for its own duration;
//! the connection goes back to the pool when it is dropped, on every exit path.

use crate::tracker::{ItemStats, NewWorkItem, WorkItem};
use anyhow::Result;
use sqlx::{
    pool::PoolConnection,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow},
    Row, Sqlite,
};
use std::str::FromStr;

const SELECT_COLUMNS: &str = "SELECT id, title, manuscript_id, venue, role, status, due_date, notes, \
     created_at, updated_at FROM work_items";

/// SQLite-backed work item store
#[derive(Debug, Clone)]
pub struct SqliteItemStore {
    /// SQLite connection pool
    pool: SqlitePool,
}

impl SqliteItemStore {
    /// Wrap an existing pool
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (and create if missing) the database behind a `sqlite:` URL
    ///
    /// In-memory databases vanish with their last connection, so they get a
    /// single connection that never idles out.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool_options = if is_in_memory(url) {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new()
        };

        let pool = pool_options.connect_with(options).await?;
        Ok(Self::new(pool))
    }

    /// Check out a scoped connection; released when dropped
    pub async fn acquire_session(&self) -> Result<PoolConnection<Sqlite>> {
        Ok(self.pool.acquire().await?)
    }

    /// Create the work_items table if absent
    ///
    /// AUTOINCREMENT keeps ids of deleted rows from being handed out again.
    pub async fn ensure_schema(&self) -> Result<()> {
        let mut session = self.acquire_session().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS work_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                manuscript_id TEXT,
                venue TEXT,
                role TEXT NOT NULL,
                status TEXT NOT NULL,
                due_date DATE,
                notes TEXT,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&mut *session)
        .await?;

        Ok(())
    }

    /// Page through items in insertion (id) order
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<WorkItem>> {
        let mut session = self.acquire_session().await?;
        let rows = sqlx::query(&format!("{} ORDER BY id LIMIT ? OFFSET ?", SELECT_COLUMNS))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *session)
            .await?;

        rows.iter().map(row_to_item).collect()
    }

    /// Insert a new row and return its generated id
    pub async fn insert(&self, item: &NewWorkItem, created_at: chrono::NaiveDateTime) -> Result<i64> {
        let mut session = self.acquire_session().await?;
        let result = sqlx::query(
            r#"
            INSERT INTO work_items
                (title, manuscript_id, venue, role, status, due_date, notes, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&item.title)
        .bind(&item.manuscript_id)
        .bind(&item.venue)
        .bind(item.role.to_string())
        .bind(item.status.to_string())
        .bind(item.due_date)
        .bind(&item.notes)
        .bind(created_at)
        .bind(created_at)
        .execute(&mut *session)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Fetch one item by id
    pub async fn get(&self, id: i64) -> Result<Option<WorkItem>> {
        let mut session = self.acquire_session().await?;
        let row = sqlx::query(&format!("{} WHERE id = ?", SELECT_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *session)
            .await?;

        row.as_ref().map(row_to_item).transpose()
    }

    /// Write every mutable column of `item` back; false if the row is gone
    pub async fn save(&self, item: &WorkItem) -> Result<bool> {
        let mut session = self.acquire_session().await?;
        let result = sqlx::query(
            r#"
            UPDATE work_items SET
                title = ?, manuscript_id = ?, venue = ?, role = ?, status = ?,
                due_date = ?, notes = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&item.title)
        .bind(&item.manuscript_id)
        .bind(&item.venue)
        .bind(item.role.to_string())
        .bind(item.status.to_string())
        .bind(item.due_date)
        .bind(&item.notes)
        .bind(item.updated_at)
        .bind(item.id)
        .execute(&mut *session)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Hard delete; false if there was nothing to delete
    pub async fn delete(&self, id: i64) -> Result<bool> {
        let mut session = self.acquire_session().await?;
        let result = sqlx::query("DELETE FROM work_items WHERE id = ?")
            .bind(id)
            .execute(&mut *session)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Bucketed counts from a single grouped query
    pub async fn stats(&self) -> Result<ItemStats> {
        let mut session = self.acquire_session().await?;
        let rows = sqlx::query("SELECT status, COUNT(*) AS count FROM work_items GROUP BY status")
            .fetch_all(&mut *session)
            .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let status: String = row.try_get("status")?;
            let count: i64 = row.try_get("count")?;
            counts.push((status, count));
        }

        Ok(ItemStats::from_grouped_counts(counts))
    }
}

fn is_in_memory(url: &str) -> bool {
    url.contains(":memory:") || url.contains("mode=memory")
}

fn row_to_item(row: &SqliteRow) -> Result<WorkItem> {
    let role: String = row.try_get("role")?;
    let status: String = row.try_get("status")?;

    Ok(WorkItem {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        manuscript_id: row.try_get("manuscript_id")?,
        venue: row.try_get("venue")?,
        role: role
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid role '{}' in work_items: {}", role, e))?,
        status: status
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid status '{}' in work_items: {}", status, e))?,
        due_date: row.try_get("due_date")?,
        notes: row.try_get("notes")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

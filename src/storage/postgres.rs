//! PostgreSQL persistence for work items
//!
//! Hosted store used in deployment. Connections come from a sqlx pool; each operation
//! checks one out and returns it on drop, and broken connections are replaced by the
//! pool instead of poisoning later requests. `sslmode` in the URL is honoured (rustls).

use crate::tracker::{ItemStats, NewWorkItem, WorkItem};
use anyhow::Result;
use sqlx::{
    pool::PoolConnection,
    postgres::{PgConnectOptions, PgPool, PgPoolOptions, PgRow},
    Postgres, Row,
};
use std::str::FromStr;

const SELECT_COLUMNS: &str = "SELECT id, title, manuscript_id, venue, role, status, due_date, notes, \
     created_at, updated_at FROM work_items";

/// PostgreSQL-backed work item store
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    /// PostgreSQL connection pool
    pool: PgPool,
}

impl PostgresItemStore {
    /// Wrap an existing pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect to a `postgresql://` URL
    ///
    /// Fails immediately if the server is unreachable or the TLS requirement
    /// can't be met; no retries.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = PgConnectOptions::from_str(url)
            .map_err(|e| anyhow::anyhow!("Invalid PostgreSQL URL: {}", e))?;
        Self::connect_with(options).await
    }

    /// Connect with pre-built options (search_path, application name, ...)
    pub async fn connect_with(options: PgConnectOptions) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
        Ok(Self::new(pool))
    }

    /// Check out a scoped connection; released when dropped
    pub async fn acquire_session(&self) -> Result<PoolConnection<Postgres>> {
        Ok(self.pool.acquire().await?)
    }

    /// Create the work_items table if absent
    ///
    /// Identity sequences never hand out a value twice, even after deletes.
    pub async fn ensure_schema(&self) -> Result<()> {
        let mut session = self.acquire_session().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS work_items (
                id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
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
    ///
    /// Negative values are passed through; PostgreSQL rejects them.
    pub async fn list(&self, offset: i64, limit: i64) -> Result<Vec<WorkItem>> {
        let mut session = self.acquire_session().await?;
        let rows = sqlx::query(&format!("{} ORDER BY id LIMIT $1 OFFSET $2", SELECT_COLUMNS))
            .bind(limit)
            .bind(offset)
            .fetch_all(&mut *session)
            .await?;

        rows.iter().map(row_to_item).collect()
    }

    /// Insert a new row and return its generated id
    pub async fn insert(&self, item: &NewWorkItem, created_at: chrono::NaiveDateTime) -> Result<i64> {
        let mut session = self.acquire_session().await?;
        let row = sqlx::query(
            r#"
            INSERT INTO work_items
                (title, manuscript_id, venue, role, status, due_date, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING id
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
        .fetch_one(&mut *session)
        .await?;

        Ok(row.try_get("id")?)
    }

    /// Fetch one item by id
    pub async fn get(&self, id: i64) -> Result<Option<WorkItem>> {
        let mut session = self.acquire_session().await?;
        let row = sqlx::query(&format!("{} WHERE id = $1", SELECT_COLUMNS))
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
                title = $1, manuscript_id = $2, venue = $3, role = $4, status = $5,
                due_date = $6, notes = $7, updated_at = $8
            WHERE id = $9
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
        let result = sqlx::query("DELETE FROM work_items WHERE id = $1")
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

fn row_to_item(row: &PgRow) -> Result<WorkItem> {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::normalize_postgres_url;
    use crate::storage::{Database, ItemStorage};
    use crate::tracker::{Role, Status, WorkItemPatch};
    use chrono::NaiveDate;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Wire bytes of a PostgreSQL SSLRequest: length 8, code 80877103
    const SSL_REQUEST: [u8; 8] = [0x00, 0x00, 0x00, 0x08, 0x04, 0xD2, 0x16, 0x2F];

    #[tokio::test]
    async fn sslmode_require_negotiates_tls_first() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let (first_packet_tx, first_packet_rx) = tokio::sync::oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut packet = [0u8; 8];
            socket.read_exact(&mut packet).await.unwrap();
            let _ = first_packet_tx.send(packet);
            // Server without TLS support
            socket.write_all(b"N").await.unwrap();
        });

        let url = format!("postgresql://u:p@127.0.0.1:{}/reviews?sslmode=require", port);
        let result = tokio::time::timeout(std::time::Duration::from_secs(30), PostgresItemStore::connect(&url))
            .await
            .unwrap();

        let err = result.unwrap_err();
        assert!(err.to_string().contains("TLS"), "unexpected error: {}", err);
        assert_eq!(first_packet_rx.await.unwrap(), SSL_REQUEST);
    }

    #[test]
    fn url_parameters_reach_connect_options() {
        assert!(PgConnectOptions::from_str("postgresql://u:p@db.example.com/reviews?sslmode=require").is_ok());
        assert!(PgConnectOptions::from_str("postgresql://u@h/db?sslmode=bogus").is_err());
    }

    // The tests below need a live server and run only when POSTGRES_URL is set.
    // Each one works in its own schema so they can run in parallel.

    async fn live_storage(name: &str) -> Option<ItemStorage> {
        let url = std::env::var("POSTGRES_URL").ok().filter(|url| !url.trim().is_empty())?;
        let url = normalize_postgres_url(url.trim());
        let schema = format!("review_tracker_test_{}_{}", name, std::process::id());

        let admin = PgPool::connect(&url).await.unwrap();
        sqlx::query(&format!("DROP SCHEMA IF EXISTS {} CASCADE", schema))
            .execute(&admin)
            .await
            .unwrap();
        sqlx::query(&format!("CREATE SCHEMA {}", schema))
            .execute(&admin)
            .await
            .unwrap();
        admin.close().await;

        let options = PgConnectOptions::from_str(&url)
            .unwrap()
            .options([("search_path", schema.as_str())]);
        let store = PostgresItemStore::connect_with(options).await.unwrap();
        store.ensure_schema().await.unwrap();
        store.ensure_schema().await.unwrap();

        Some(ItemStorage::new(Database::Postgres(store)))
    }

    fn new_item(title: &str, status: Status) -> NewWorkItem {
        NewWorkItem {
            title: title.to_string(),
            manuscript_id: Some("NeurIPS-8812".to_string()),
            venue: Some("NeurIPS".to_string()),
            role: Role::AssociateEditor,
            status,
            due_date: NaiveDate::from_ymd_opt(2025, 7, 14),
            notes: Some("fast track".to_string()),
        }
    }

    #[tokio::test]
    async fn pg_create_then_fetch_round_trips_every_column() {
        let Some(storage) = live_storage("roundtrip").await else { return };
        assert!(storage.list_items(0, 100).await.unwrap().is_empty());

        let created = storage.create_item(new_item("Meta-review", Status::PendingDecision)).await.unwrap();
        let fetched = storage.get_item(created.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.role, Role::AssociateEditor);
        assert_eq!(fetched.status, Status::PendingDecision);
    }

    #[tokio::test]
    async fn pg_list_pages_in_insertion_order() {
        let Some(storage) = live_storage("paging").await else { return };
        for title in ["one", "two", "three"] {
            storage.create_item(new_item(title, Status::Active)).await.unwrap();
        }

        let titles: Vec<String> = storage
            .list_items(1, 1)
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.title)
            .collect();
        assert_eq!(titles, vec!["two"]);

        // PostgreSQL refuses negative bounds; the error is passed up unchanged
        assert!(storage.list_items(0, -1).await.is_err());
    }

    #[tokio::test]
    async fn pg_partial_update_keeps_unsent_fields() {
        let Some(storage) = live_storage("update").await else { return };
        let created = storage.create_item(new_item("Review", Status::Invited)).await.unwrap();

        let patch: WorkItemPatch =
            serde_json::from_str(r#"{"id": 77, "status": "Accepted", "due_date": null}"#).unwrap();
        let updated = storage.update_item(created.id, patch).await.unwrap().unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.status, Status::Accepted);
        assert_eq!(updated.due_date, None);
        assert_eq!(updated.title, created.title);
        assert_eq!(updated.notes, created.notes);
        assert_eq!(storage.get_item(created.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn pg_missing_ids_and_delete() {
        let Some(storage) = live_storage("delete").await else { return };
        assert!(storage.get_item(1).await.unwrap().is_none());
        assert!(storage.update_item(1, WorkItemPatch::default()).await.unwrap().is_none());
        assert!(!storage.delete_item(1).await.unwrap());

        let first = storage.create_item(new_item("a", Status::Active)).await.unwrap();
        let second = storage.create_item(new_item("b", Status::Active)).await.unwrap();
        assert!(storage.delete_item(second.id).await.unwrap());
        assert!(storage.get_item(second.id).await.unwrap().is_none());

        let third = storage.create_item(new_item("c", Status::Active)).await.unwrap();
        assert!(third.id > second.id);
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn pg_stats_bucket_by_status() {
        let Some(storage) = live_storage("stats").await else { return };
        assert_eq!(storage.item_stats().await.unwrap(), ItemStats::default());

        for status in [Status::Invited, Status::Completed, Status::PendingDecision, Status::Rejected] {
            storage.create_item(new_item("x", status)).await.unwrap();
        }
        assert_eq!(
            storage.item_stats().await.unwrap(),
            ItemStats { active: 1, pending: 1, completed: 2 }
        );
    }
}

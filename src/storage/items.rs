//! Work item operations over whichever backend is open
//!
//! Each call runs against its own scoped session and commits implicitly.
//! Lookups return `Option`/`bool` so the API layer decides what "missing" means.

use crate::storage::database::Database;
use crate::tracker::{types::now_timestamp, ItemStats, NewWorkItem, WorkItem, WorkItemPatch};
use anyhow::Result;

/// Work item storage manager
#[derive(Debug, Clone)]
pub struct ItemStorage {
    db: Database,
}

impl ItemStorage {
    /// Create storage over an opened database
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List up to `limit` items starting at `offset`, ordered by id
    ///
    /// Bounds are passed to the store unvalidated.
    pub async fn list_items(&self, offset: i64, limit: i64) -> Result<Vec<WorkItem>> {
        match &self.db {
            Database::Sqlite(store) => store.list(offset, limit).await,
            Database::Postgres(store) => store.list(offset, limit).await,
        }
    }

    /// Insert a new item; the store assigns `id`, both timestamps are "now"
    pub async fn create_item(&self, new_item: NewWorkItem) -> Result<WorkItem> {
        let created_at = now_timestamp();
        let id = match &self.db {
            Database::Sqlite(store) => store.insert(&new_item, created_at).await?,
            Database::Postgres(store) => store.insert(&new_item, created_at).await?,
        };

        Ok(WorkItem {
            id,
            title: new_item.title,
            manuscript_id: new_item.manuscript_id,
            venue: new_item.venue,
            role: new_item.role,
            status: new_item.status,
            due_date: new_item.due_date,
            notes: new_item.notes,
            created_at,
            updated_at: created_at,
        })
    }

    /// Fetch an item by id
    pub async fn get_item(&self, id: i64) -> Result<Option<WorkItem>> {
        match &self.db {
            Database::Sqlite(store) => store.get(id).await,
            Database::Postgres(store) => store.get(id).await,
        }
    }

    /// Merge the sent fields of `patch` onto the stored item
    ///
    /// Returns `None` if the item doesn't exist (or vanished between read and write).
    /// `updated_at` is left as it was at creation. An empty patch skips the write.
    pub async fn update_item(&self, id: i64, patch: WorkItemPatch) -> Result<Option<WorkItem>> {
        let Some(mut item) = self.get_item(id).await? else {
            return Ok(None);
        };

        if patch.is_empty() {
            return Ok(Some(item));
        }

        patch.apply_to(&mut item);

        let saved = match &self.db {
            Database::Sqlite(store) => store.save(&item).await?,
            Database::Postgres(store) => store.save(&item).await?,
        };

        Ok(saved.then_some(item))
    }

    /// Permanently delete an item; false if it didn't exist
    pub async fn delete_item(&self, id: i64) -> Result<bool> {
        match &self.db {
            Database::Sqlite(store) => store.delete(id).await,
            Database::Postgres(store) => store.delete(id).await,
        }
    }

    /// Active / pending / completed counts across all items
    pub async fn item_stats(&self) -> Result<ItemStats> {
        match &self.db {
            Database::Sqlite(store) => store.stats().await,
            Database::Postgres(store) => store.stats().await,
        }
    }
}

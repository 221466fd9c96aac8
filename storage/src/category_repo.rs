//! Category repository: read-mostly access to the externally seeded forest.
//!
//! Lookup is always scoped to a parent: sibling names under one parent are
//! unique, so `(name, parent_id)` determines at most one row.

use crate::error::StorageError;
use crate::models::{CategoryNode, CategoryRecord};
use crate::sqlite_pool::SqlitePoolManager;
use std::collections::HashMap;

#[derive(Clone)]
pub struct CategoryRepository {
    pool_manager: SqlitePoolManager,
}

impl CategoryRepository {
    pub fn new(pool_manager: SqlitePoolManager) -> Self {
        Self { pool_manager }
    }

    pub(crate) async fn init(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                parent_id INTEGER,
                UNIQUE (name, parent_id)
            )
            "#,
        )
        .execute(self.pool_manager.pool())
        .await?;
        Ok(())
    }

    /// Seeding helper: inserts a category under the given parent and returns
    /// its id.
    pub async fn insert(&self, name: &str, parent_id: Option<i64>) -> Result<i64, StorageError> {
        let result = sqlx::query("INSERT INTO categories (name, parent_id) VALUES (?, ?)")
            .bind(name)
            .bind(parent_id)
            .execute(self.pool_manager.pool())
            .await?;
        Ok(result.last_insert_rowid())
    }

    /// Root-level categories (no parent).
    pub async fn roots(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT * FROM categories WHERE parent_id IS NULL ORDER BY name",
        )
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    pub async fn children(&self, parent_id: i64) -> Result<Vec<CategoryRecord>, StorageError> {
        let records = sqlx::query_as::<_, CategoryRecord>(
            "SELECT * FROM categories WHERE parent_id = ? ORDER BY name",
        )
        .bind(parent_id)
        .fetch_all(self.pool_manager.pool())
        .await?;
        Ok(records)
    }

    /// Parent-scoped name lookup; `None` parent means root level.
    pub async fn find(
        &self,
        name: &str,
        parent_id: Option<i64>,
    ) -> Result<Option<CategoryRecord>, StorageError> {
        let record = sqlx::query_as::<_, CategoryRecord>(
            r#"
            SELECT * FROM categories
            WHERE name = ? AND (parent_id = ? OR (? IS NULL AND parent_id IS NULL))
            "#,
        )
        .bind(name)
        .bind(parent_id)
        .bind(parent_id)
        .fetch_optional(self.pool_manager.pool())
        .await?;
        Ok(record)
    }

    pub async fn get(&self, id: i64) -> Result<Option<CategoryRecord>, StorageError> {
        let record = sqlx::query_as::<_, CategoryRecord>("SELECT * FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool_manager.pool())
            .await?;
        Ok(record)
    }

    pub async fn all(&self) -> Result<Vec<CategoryRecord>, StorageError> {
        let records =
            sqlx::query_as::<_, CategoryRecord>("SELECT * FROM categories ORDER BY id")
                .fetch_all(self.pool_manager.pool())
                .await?;
        Ok(records)
    }

    /// Assembles the whole forest into nested nodes, roots first.
    pub async fn tree(&self) -> Result<Vec<CategoryNode>, StorageError> {
        let records = self.all().await?;

        let mut children_of: HashMap<Option<i64>, Vec<CategoryRecord>> = HashMap::new();
        for record in records {
            children_of.entry(record.parent_id).or_default().push(record);
        }

        fn build(
            parent: Option<i64>,
            children_of: &HashMap<Option<i64>, Vec<CategoryRecord>>,
        ) -> Vec<CategoryNode> {
            children_of
                .get(&parent)
                .map(|records| {
                    records
                        .iter()
                        .map(|r| CategoryNode {
                            id: r.id,
                            name: r.name.clone(),
                            parent_id: r.parent_id,
                            children: build(Some(r.id), children_of),
                        })
                        .collect()
                })
                .unwrap_or_default()
        }

        Ok(build(None, &children_of))
    }
}

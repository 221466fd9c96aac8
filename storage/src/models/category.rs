//! Category record and tree node models.
//!
//! The category forest is externally seeded and read-mostly; sibling names
//! under one parent are unique, so `(name, parent_id)` is a lookup key.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
}

/// A category with its children, as returned by `CategoryRepository::tree`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryNode {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub children: Vec<CategoryNode>,
}

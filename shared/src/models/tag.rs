//! Tag Model

use serde::{Deserialize, Serialize};

/// Tag entity
///
/// `normalized_name` (trimmed, lowercase) carries the uniqueness constraint;
/// `name` keeps the spelling it was first created with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Tag {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub normalized_name: String,
    pub created_at: i64,
}

/// Create tag payload (also used by find-or-create)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCreate {
    pub name: String,
}

/// Update tag payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagUpdate {
    pub name: Option<String>,
}

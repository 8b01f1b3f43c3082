//! Group Model (waiter-to-tables assignment within a section)

use serde::{Deserialize, Serialize};

/// Group entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Group {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub section_id: i64,
    pub waiter_id: Option<i64>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub table_ids: Vec<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create group payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreate {
    pub name: String,
    pub section_id: i64,
    pub waiter_id: Option<i64>,
    #[serde(default)]
    pub table_ids: Vec<i64>,
}

/// Update group payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdate {
    pub name: Option<String>,
    pub waiter_id: Option<i64>,
    pub table_ids: Option<Vec<i64>>,
}

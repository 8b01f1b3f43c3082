//! Waiter Model

use serde::{Deserialize, Serialize};

/// Waiter entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Waiter {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub phone_number: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create waiter payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterCreate {
    pub name: String,
    pub phone_number: String,
}

/// Update waiter payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
}

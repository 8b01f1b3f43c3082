//! Item Model (menu entry and inventory stock line)

use serde::{Deserialize, Serialize};

/// Item entity
///
/// Stock fields (`quantity`, `avg_price`, `total_purchase_value`) are only
/// mutated by the inventory ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    /// Menu price; overwritten with the latest purchase price
    pub price: f64,
    pub avg_price: f64,
    pub quantity: f64,
    pub total_purchase_value: f64,
    pub category_id: i64,
    /// Denormalized from the category
    pub category_name: String,
    /// Tag ids (JSON column)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub tags: Vec<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create item payload
///
/// `tags` are tag names, resolved with find-or-create.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCreate {
    pub name: String,
    pub price: f64,
    pub category_id: i64,
    /// Opening stock; its value is booked at `price`
    pub quantity: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Update item payload (stock fields are not editable here)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub category_id: Option<i64>,
    pub tags: Option<Vec<String>>,
}

/// Item list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    pub category_id: Option<i64>,
    pub search: Option<String>,
    pub tag: Option<String>,
}

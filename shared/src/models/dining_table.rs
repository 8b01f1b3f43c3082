//! Dining Table Model

use serde::{Deserialize, Serialize};

use super::OrderItem;

/// Waiter snapshot embedded on tables and orders
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaiterSnapshot {
    pub id: i64,
    pub name: String,
    pub phone_number: String,
}

/// Dining table entity
///
/// Everything from `has_orders` down is a denormalized summary of the
/// table's pending order, written by the order engine only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DiningTable {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    pub table_number: i64,
    pub section_id: i64,
    pub seats: i32,

    pub has_orders: bool,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub current_order_items: Vec<OrderItem>,
    pub current_bill_amount: f64,
    pub bill_number: Option<String>,
    pub first_order_time: Option<i64>,
    pub payment_method: Option<String>,
    pub waiter_id: Option<i64>,
    /// Stored as JSON text; `null` when no waiter is assigned
    #[cfg_attr(feature = "db", sqlx(json))]
    pub waiter: Option<WaiterSnapshot>,

    pub created_at: i64,
    pub updated_at: i64,
}

/// Create dining table payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableCreate {
    pub name: String,
    pub table_number: i64,
    pub section_id: i64,
    pub seats: Option<i32>,
}

/// Update dining table payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiningTableUpdate {
    pub name: Option<String>,
    pub table_number: Option<i64>,
    pub section_id: Option<i64>,
    pub seats: Option<i32>,
}

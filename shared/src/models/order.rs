//! Dine-in Order Model

use serde::{Deserialize, Serialize};

use super::{ChargeType, WaiterSnapshot};

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

/// Line item of a dine-in order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub category_name: Option<String>,
    pub item_id: Option<i64>,
    #[serde(default)]
    pub is_cancelled: bool,
    pub cancelled_reason: Option<String>,
    /// Kitchen wave this line was sent with (1-based)
    pub round: i64,
}

/// Charge applied to an order, snapshotted from the section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedCharge {
    pub name: String,
    #[serde(rename = "type")]
    pub charge_type: ChargeType,
    pub value: f64,
    pub amount: f64,
}

/// Order entity (one bill per table while pending)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Order {
    pub id: i64,
    pub restaurant_id: i64,
    pub bill_number: String,
    pub table_id: i64,
    pub section_id: i64,
    pub section_name: String,
    pub waiter_id: Option<i64>,
    /// Waiter name snapshot
    #[serde(rename = "waiter")]
    pub waiter_name: Option<String>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub items: Vec<OrderItem>,
    #[cfg_attr(feature = "db", sqlx(json))]
    pub charges: Vec<AppliedCharge>,
    pub subtotal: f64,
    pub total: f64,
    pub current_round: i64,
    pub status: OrderStatus,
    pub payment_method: Option<String>,
    pub is_deleted: bool,
    pub deleted_reason: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    pub completed_at: Option<i64>,
}

/// Incoming line of a place-order request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemInput {
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    pub category_name: Option<String>,
    pub item_id: Option<i64>,
    #[serde(default)]
    pub is_cancelled: bool,
    pub cancelled_reason: Option<String>,
    /// Round of a line sent earlier; absent for new lines
    pub round: Option<i64>,
}

/// POST /api/tables/{id}/orders
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub orders: Vec<OrderItemInput>,
    pub waiter_id: Option<i64>,
}

/// DELETE /api/tables/{id}/orders
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearOrdersRequest {
    pub payment_method: Option<String>,
}

/// DELETE /api/orders/{id}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteOrderRequest {
    pub reason: Option<String>,
}

/// PUT /api/orders/{id}/items/{index}/cancel
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelItemRequest {
    pub reason: String,
}

/// Merged table + order view returned by the order engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableOrderView {
    pub table_id: i64,
    pub table_name: String,
    pub table_number: i64,
    pub section_id: i64,
    pub section_name: Option<String>,
    pub order_id: Option<i64>,
    pub bill_number: Option<String>,
    pub has_orders: bool,
    pub current_order_items: Vec<OrderItem>,
    pub current_bill_amount: f64,
    pub charges: Vec<AppliedCharge>,
    pub payment_method: Option<String>,
    pub waiter_id: Option<i64>,
    pub waiter: Option<WaiterSnapshot>,
    pub first_order_time: Option<i64>,
    pub created_at: Option<i64>,
    pub updated_at: i64,
}

/// DELETE /api/orders/{id} response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDeleted {
    pub message: String,
    pub order_id: i64,
}

/// Pagination block of list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

/// GET /api/orders response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPage {
    pub orders: Vec<Order>,
    pub pagination: Pagination,
}

//! Spoilage Model

use serde::{Deserialize, Serialize};

/// Spoilage reason
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum SpoilageReason {
    Expired,
    Damaged,
    Contaminated,
    Overcooked,
    Other,
}

/// Spoilage record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Spoilage {
    pub id: i64,
    pub restaurant_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub spoiled_quantity: f64,
    pub reason: SpoilageReason,
    pub notes: Option<String>,
    pub vendor_id: Option<i64>,
    /// Item price at the time of reporting
    pub price: f64,
    /// `spoiled_quantity * price`, rounded to cents
    pub total_loss_value: f64,
    pub created_at: i64,
}

/// POST /api/spoilage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpoilageCreate {
    pub item_id: i64,
    pub spoiled_quantity: f64,
    pub reason: SpoilageReason,
    pub notes: Option<String>,
    pub vendor_id: Option<i64>,
}

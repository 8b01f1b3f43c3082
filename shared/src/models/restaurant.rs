//! Restaurant Model (tenant root)

use serde::{Deserialize, Serialize};

/// Daily bill counter carried on the restaurant row
///
/// `current_*` is the civil date (UTC+5:30) of the last minted bill number.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct BillTracking {
    #[cfg_attr(feature = "db", sqlx(rename = "bill_year"))]
    pub current_year: i32,
    #[cfg_attr(feature = "db", sqlx(rename = "bill_month"))]
    pub current_month: i32,
    #[cfg_attr(feature = "db", sqlx(rename = "bill_day"))]
    pub current_date: i32,
    pub daily_order_counter: i64,
}

/// Restaurant entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Restaurant {
    pub id: i64,
    pub name: String,
    pub location: Option<String>,
    pub contact: Option<String>,
    /// Creator (user id)
    pub owner_id: i64,
    #[cfg_attr(feature = "db", sqlx(flatten))]
    pub bill_tracking: BillTracking,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create restaurant payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreate {
    pub name: String,
    pub location: Option<String>,
    pub contact: Option<String>,
}

/// Update restaurant payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantUpdate {
    pub name: Option<String>,
    pub location: Option<String>,
    pub contact: Option<String>,
}

/// Response of restaurant creation: the record plus a token carrying the new tenant
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantCreated {
    pub restaurant: Restaurant,
    pub token: String,
}

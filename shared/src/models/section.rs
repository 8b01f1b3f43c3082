//! Section Model (floor area with its charges)

use serde::{Deserialize, Serialize};

/// How a charge is computed against the order subtotal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ChargeType {
    /// `value` is a percentage of the subtotal (18 = 18%)
    Percentage,
    /// `value` is a flat amount
    Fixed,
}

/// Charge definition held by a section (service charge, tax, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCharge {
    pub name: String,
    pub value: f64,
    #[serde(rename = "type")]
    pub charge_type: ChargeType,
}

/// Section entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Section {
    pub id: i64,
    pub restaurant_id: i64,
    pub name: String,
    /// Ordered charge list (JSON column)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub charges: Vec<SectionCharge>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create section payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionCreate {
    pub name: String,
    #[serde(default)]
    pub charges: Vec<SectionCharge>,
}

/// Update section payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionUpdate {
    pub name: Option<String>,
    pub charges: Option<Vec<SectionCharge>>,
}

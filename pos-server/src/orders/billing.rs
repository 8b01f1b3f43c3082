//! Bill numbers, line validation and order totals
//!
//! Amounts are computed in `Decimal` and stored as `f64` rounded to cents.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use shared::models::{AppliedCharge, ChargeType, OrderItem, OrderItemInput, SectionCharge};

use super::OrderError;
use crate::utils::money::{round2, to_decimal, to_f64};
use crate::utils::validation::MAX_NAME_LEN;

/// Maximum allowed price per line
const MAX_PRICE: f64 = 1_000_000.0;
/// Maximum allowed quantity per line
const MAX_QUANTITY: i32 = 9999;

/// `YYMMDD` + counter, zero padded to four digits
pub fn format_bill_number(date: NaiveDate, counter: i64) -> String {
    format!(
        "{:02}{:02}{:02}{:04}",
        date.year().rem_euclid(100),
        date.month(),
        date.day(),
        counter
    )
}

/// Validate one incoming line
pub fn validate_item(index: usize, item: &OrderItemInput) -> Result<(), OrderError> {
    let name = item.name.trim();
    if name.is_empty() {
        return Err(OrderError::InvalidOperation(format!("orders[{index}].name is required")));
    }
    if name.len() > MAX_NAME_LEN {
        return Err(OrderError::InvalidOperation(format!(
            "orders[{index}].name is too long (max {MAX_NAME_LEN})"
        )));
    }
    if !item.price.is_finite() || item.price < 0.0 {
        return Err(OrderError::InvalidOperation(format!(
            "orders[{index}].price must be non-negative, got {}",
            item.price
        )));
    }
    if item.price > MAX_PRICE {
        return Err(OrderError::InvalidOperation(format!(
            "orders[{index}].price exceeds maximum allowed ({MAX_PRICE})"
        )));
    }
    if !(1..=MAX_QUANTITY).contains(&item.quantity) {
        return Err(OrderError::InvalidOperation(format!(
            "orders[{index}].quantity must be between 1 and {MAX_QUANTITY}, got {}",
            item.quantity
        )));
    }
    if let Some(round) = item.round
        && round < 1
    {
        return Err(OrderError::InvalidOperation(format!(
            "orders[{index}].round must be positive, got {round}"
        )));
    }
    Ok(())
}

/// Convert the request lines, stamping new ones with `round`
pub fn stamp_items(inputs: Vec<OrderItemInput>, round: i64) -> Vec<OrderItem> {
    inputs
        .into_iter()
        .map(|input| OrderItem {
            name: input.name.trim().to_string(),
            price: input.price,
            quantity: input.quantity,
            category_name: input.category_name,
            item_id: input.item_id,
            is_cancelled: input.is_cancelled,
            cancelled_reason: input.cancelled_reason,
            round: input.round.unwrap_or(round),
        })
        .collect()
}

/// Computed money block of an order
#[derive(Debug, Clone, PartialEq)]
pub struct Totals {
    pub subtotal: f64,
    pub charges: Vec<AppliedCharge>,
    pub total: f64,
}

fn subtotal(items: &[OrderItem]) -> Decimal {
    items
        .iter()
        .filter(|item| !item.is_cancelled)
        .map(|item| to_decimal(item.price) * Decimal::from(item.quantity))
        .sum()
}

fn charge_amount(charge_type: ChargeType, value: f64, subtotal: Decimal) -> Decimal {
    match charge_type {
        ChargeType::Percentage => round2(subtotal * to_decimal(value) / Decimal::ONE_HUNDRED),
        ChargeType::Fixed => round2(to_decimal(value)),
    }
}

fn totals_from(items: &[OrderItem], defs: impl Iterator<Item = (String, ChargeType, f64)>) -> Totals {
    let subtotal = round2(subtotal(items));
    let mut charge_sum = Decimal::ZERO;
    let charges = defs
        .map(|(name, charge_type, value)| {
            let amount = charge_amount(charge_type, value, subtotal);
            charge_sum += amount;
            AppliedCharge {
                name,
                charge_type,
                value,
                amount: to_f64(amount),
            }
        })
        .collect();
    Totals {
        subtotal: to_f64(subtotal),
        charges,
        total: to_f64(subtotal + charge_sum),
    }
}

/// Totals against the section's current charge list
pub fn compute_totals(items: &[OrderItem], charges: &[SectionCharge]) -> Totals {
    totals_from(
        items,
        charges.iter().map(|c| (c.name.clone(), c.charge_type, c.value)),
    )
}

/// Totals against charges already snapshotted on the order
pub fn recompute_totals(items: &[OrderItem], applied: &[AppliedCharge]) -> Totals {
    totals_from(
        items,
        applied.iter().map(|c| (c.name.clone(), c.charge_type, c.value)),
    )
}

//! Inventory
//!
//! - **ledger**: atomic stock deltas on `item` rows
//! - **ivm**: purchase / sale / stockout orders and the deltas they carry
//! - **spoilage**: loss records that take stock out (and give it back on delete)
//!
//! Stock deltas always run in the same transaction as the record that
//! caused them.

pub mod ivm;
pub mod ledger;
pub mod spoilage;

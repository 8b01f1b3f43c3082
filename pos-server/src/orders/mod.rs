//! Dine-in Order Engine
//!
//! - **manager**: `OrdersManager`, the only writer of orders and of the
//!   table summary columns
//! - **billing**: bill numbers, line validation, charges and totals
//! - **locks**: per-table async mutexes
//!
//! # Write path
//!
//! ```text
//! request → validate → TableLocks::lock(table)
//!                          ↓
//!              (bill counter, committed alone)
//!                          ↓
//!              BEGIN → order row → table summary → COMMIT
//! ```

pub mod billing;
pub mod locks;
pub mod manager;

pub use locks::TableLocks;
pub use manager::{ManagerResult, OrderError, OrdersManager};

//! Data models
//!
//! Shared between the server and its HTTP clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids, all timestamps Unix millis.
//! JSON payloads are camelCase.

pub mod category;
pub mod dining_table;
pub mod group;
pub mod item;
pub mod ivm_order;
pub mod order;
pub mod restaurant;
pub mod section;
pub mod spoilage;
pub mod tag;
pub mod user;
pub mod vendor;
pub mod waiter;

// Re-exports
pub use category::*;
pub use dining_table::*;
pub use group::*;
pub use item::*;
pub use ivm_order::*;
pub use order::*;
pub use restaurant::*;
pub use section::*;
pub use spoilage::*;
pub use tag::*;
pub use user::*;
pub use vendor::*;
pub use waiter::*;

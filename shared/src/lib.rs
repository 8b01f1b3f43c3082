//! Shared types for the POS backend
//!
//! Data models and request payloads used by the server and its HTTP
//! clients, plus small utilities (timestamps, id generation).

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

//! Data models
//!
//! Shared between the server and its API clients.
//! All IDs are `i64` snowflakes (SQLite INTEGER PRIMARY KEY).

pub mod admin;
pub mod order;
pub mod product;
pub mod user;

// Re-exports
pub use admin::*;
pub use order::*;
pub use product::*;
pub use user::*;

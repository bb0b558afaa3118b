//! Shared types for the GetFurnitures marketplace
//!
//! Domain models exchanged over the REST API, the unified error system and
//! small utilities used by the server crate and its tests.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

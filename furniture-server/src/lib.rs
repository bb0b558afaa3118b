//! GetFurnitures marketplace server
//!
//! Customers register with an emailed OTP, browse the catalog, keep
//! favourites and place orders for a callback. Admins manage products and
//! work the order queue.
//!
//! # Module layout
//!
//! ```text
//! furniture-server/src/
//! ├── api/        # routers and handlers
//! ├── auth/       # JWT issuing/validation, guards
//! ├── services/   # business operations
//! ├── db/         # SQLite repositories
//! ├── notify/     # mail outbox and worker
//! ├── config.rs   # environment configuration
//! ├── state.rs    # shared handler state
//! ├── error.rs    # service error bridge
//! ├── logger.rs   # tracing setup, security_log!
//! └── util.rs     # hashing, codes, tokens
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod logger;
pub mod notify;
pub mod services;
pub mod state;
pub mod util;

pub use api::create_router;
pub use auth::{CurrentUser, JwtService};
pub use config::Config;
pub use db::DbService;
pub use error::{ServiceError, ServiceResult};
pub use logger::init_logger;
pub use state::AppState;

// Re-export unified error types from shared
pub use shared::error::{ApiResponse, AppError, ErrorCode};

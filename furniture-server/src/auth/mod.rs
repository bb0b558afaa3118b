//! Authentication and authorization
//!
//! - [`JwtService`] - token issuing and validation
//! - [`CurrentUser`] - caller identity, available as an extractor
//! - [`require_auth`], [`require_admin`], [`require_user`] - route middleware

pub mod extractor;
pub mod jwt;
pub mod middleware;

pub use jwt::{Claims, CurrentUser, JwtError, JwtService, Role};
pub use middleware::{require_admin, require_auth, require_user};

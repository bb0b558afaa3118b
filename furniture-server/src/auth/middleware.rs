//! Authentication middleware
//!
//! `require_auth` guards every `/private` route; the role guards run after it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::{AppError, ErrorCode};

use crate::auth::CurrentUser;
use crate::auth::extractor::authenticate;
use crate::security_log;
use crate::state::AppState;

/// Require a valid bearer token and attach [`CurrentUser`] to the request.
///
/// | Failure | Status |
/// |---------|--------|
/// | no `Authorization` header | 401 NotAuthenticated |
/// | expired token | 401 TokenExpired |
/// | malformed or forged token | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let user = authenticate(req.headers(), req.uri().path(), &state.jwt)?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

/// Require an admin token
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if !user.is_admin() {
        security_log!(
            WARN,
            "admin_required",
            account_id = user.id,
            path = %req.uri().path()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }
    Ok(next.run(req).await)
}

/// Require a customer token
pub async fn require_user(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(AppError::unauthorized)?;
    if user.is_admin() {
        return Err(AppError::forbidden("This action is only available to customers"));
    }
    Ok(next.run(req).await)
}

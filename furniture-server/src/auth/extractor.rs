//! JWT Extractor
//!
//! Lets handlers take `CurrentUser` as an argument. Reuses the identity
//! inserted by [`super::require_auth`] when present.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;

use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::security_log;
use crate::state::AppState;

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<CurrentUser>() {
            return Ok(user.clone());
        }

        let user = authenticate(&parts.headers, parts.uri.path(), &state.jwt)?;
        parts.extensions.insert(user.clone());
        Ok(user)
    }
}

/// Validate the bearer token in `headers`
pub(crate) fn authenticate(
    headers: &http::HeaderMap,
    path: &str,
    jwt: &JwtService,
) -> Result<CurrentUser, AppError> {
    let Some(header) = headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        security_log!(WARN, "auth_missing", path = %path);
        return Err(AppError::unauthorized());
    };

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = jwt.validate_token(token).map_err(|e| {
        security_log!(WARN, "auth_failed", path = %path, error = %e);
        match e {
            JwtError::ExpiredToken => AppError::token_expired(),
            _ => AppError::invalid_token("Invalid token"),
        }
    })?;

    CurrentUser::try_from(claims).map_err(|e| AppError::invalid_token(e.to_string()))
}

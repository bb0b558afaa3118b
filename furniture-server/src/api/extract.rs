//! Request extractors that reject with the standard error envelope

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use shared::error::AppError;

/// JSON body whose rejection renders as an [`AppError`]
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| AppError::invalid_request(format!("Invalid JSON body: {}", e.body_text())))?;
        Ok(ApiJson(payload))
    }
}

/// Parse a numeric path segment
pub fn parse_id(name: &str, raw: &str) -> Result<i64, AppError> {
    raw.trim().parse().map_err(|_| {
        AppError::invalid_request(format!("{name} must be a numeric id")).with_detail("field", name)
    })
}

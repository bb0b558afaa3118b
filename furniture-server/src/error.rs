//! Unified service-layer error type
//!
//! `ServiceError` bridges repository and infrastructure errors and the API-layer
//! `AppError`, so services can use `?` on both.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};

use crate::db::RepoError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Service-layer error
///
/// - `Db`: infrastructure failure (logged, rendered as InternalError)
/// - `App`: business-rule error passed through to the client
#[derive(Debug)]
pub enum ServiceError {
    Db(BoxError),
    App(AppError),
}

impl From<RepoError> for ServiceError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::Database(msg) => ServiceError::Db(msg.into()),
            other => ServiceError::App(other.into()),
        }
    }
}

impl From<sqlx::Error> for ServiceError {
    fn from(e: sqlx::Error) -> Self {
        RepoError::from(e).into()
    }
}

impl From<std::io::Error> for ServiceError {
    fn from(e: std::io::Error) -> Self {
        ServiceError::Db(e.into())
    }
}

impl From<AppError> for ServiceError {
    fn from(e: AppError) -> Self {
        ServiceError::App(e)
    }
}

impl From<ServiceError> for AppError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::App(app_err) => app_err,
            ServiceError::Db(db_err) => {
                tracing::error!(error = %db_err, "Service infrastructure error");
                AppError::new(ErrorCode::InternalError)
            }
        }
    }
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> axum::response::Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repo_errors_split_between_variants() {
        let e: ServiceError = RepoError::Duplicate("email".into()).into();
        assert!(matches!(e, ServiceError::App(ref a) if a.code == ErrorCode::AlreadyExists));

        let e: ServiceError = RepoError::Database("disk full".into()).into();
        assert!(matches!(e, ServiceError::Db(_)));
        let app: AppError = e.into();
        assert_eq!(app.code, ErrorCode::InternalError);
    }
}

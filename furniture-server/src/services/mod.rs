//! Business operations
//!
//! Each function takes the shared [`AppState`](crate::state::AppState), does
//! its validation, persistence and outbox work, and returns domain values for
//! the HTTP layer to shape.

pub mod accounts;
pub mod admins;
pub mod catalog;
pub mod favourites;
pub mod images;
pub mod orders;
pub mod password_reset;

use shared::error::{AppError, ErrorCode};

use crate::db::{self, RepoResult};
use crate::util::{MAX_PASSWORD_LEN, MIN_PASSWORD_LEN, generate_otp, hash_password};
use sqlx::SqlitePool;

/// Trimmed, lowercased email; rejects obviously malformed input
pub(crate) fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(AppError::required("email"));
    }
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(AppError::validation("Invalid email address").with_detail("field", "email")),
    }
}

/// Trimmed non-empty value of a required text field
pub(crate) fn required_text(field: &str, value: &str) -> Result<String, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::required(field));
    }
    Ok(value.to_string())
}

pub(crate) fn check_password(password: &str) -> Result<(), AppError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LEN {
        return Err(AppError::new(ErrorCode::PasswordTooShort));
    }
    if len > MAX_PASSWORD_LEN {
        return Err(AppError::with_message(
            ErrorCode::ValueOutOfRange,
            format!("Password must be at most {MAX_PASSWORD_LEN} characters"),
        ));
    }
    Ok(())
}

pub(crate) fn hash_or_internal(password: &str) -> Result<String, AppError> {
    hash_password(password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        AppError::internal("Failed to hash password")
    })
}

/// OTP not currently held by any other unverified user
pub(crate) async fn fresh_otp(pool: &SqlitePool) -> RepoResult<i64> {
    loop {
        let otp = generate_otp();
        if !db::users::otp_in_use(pool, otp).await? {
            return Ok(otp);
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::config::Config;
    use crate::db::DbService;
    use crate::notify::{Notification, Notifier};
    use crate::state::AppState;
    use tokio::sync::mpsc;

    /// In-memory state with a captured outbox
    pub(crate) async fn state() -> (AppState, mpsc::Receiver<Notification>, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let upload_dir = dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(|name| match name {
            "UPLOAD_DIR" => Some(upload_dir.clone()),
            "ADMIN_EMAIL" => Some("admin@getfurnitures.test".into()),
            _ => None,
        })
        .unwrap();
        let db = DbService::in_memory().await.unwrap();
        let (notifier, rx) = Notifier::channel(64);
        (AppState::new(config, db, notifier), rx, dir)
    }

    /// Drain everything queued so far
    pub(crate) fn drain(rx: &mut mpsc::Receiver<Notification>) -> Vec<Notification> {
        let mut out = Vec::new();
        while let Ok(n) = rx.try_recv() {
            out.push(n);
        }
        out
    }
}

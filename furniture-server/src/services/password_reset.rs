//! Forgot / reset password
//!
//! The mailed token is 32 random bytes; only its SHA-256 digest is stored.
//! A token is single use and expires after [`RESET_TOKEN_TTL_MS`].

use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use super::{check_password, hash_or_internal, normalize_email};
use crate::db;
use crate::error::ServiceResult;
use crate::notify::Notification;
use crate::security_log;
use crate::state::AppState;
use crate::util::{generate_reset_token, hash_token};

/// 10 minutes
pub const RESET_TOKEN_TTL_MS: i64 = 10 * 60 * 1000;

/// Issue a reset token for `email` and mail the link
pub async fn request_reset(state: &AppState, email: &str) -> ServiceResult<()> {
    let email = normalize_email(email)?;
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    let token = generate_reset_token();
    let now = now_millis();
    db::reset_tokens::replace_for_user(
        &state.pool,
        user.id,
        &hash_token(&token),
        now + RESET_TOKEN_TTL_MS,
        now,
    )
    .await?;

    security_log!(INFO, "password_reset_requested", user_id = user.id);

    state.notifier.notify(Notification::PasswordReset {
        to: user.email,
        name: user.name,
        link: format!("{}/reset-password/{token}", state.config.frontend_url),
    });
    Ok(())
}

/// Consume `token` and set a new password
pub async fn reset_password(state: &AppState, token: &str, password: &str) -> ServiceResult<()> {
    let token_hash = hash_token(token.trim());
    let record = db::reset_tokens::find(&state.pool, &token_hash)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ResetTokenInvalid))?;

    if now_millis() >= record.expires_at {
        db::reset_tokens::delete(&state.pool, &token_hash).await?;
        return Err(AppError::new(ErrorCode::ResetTokenExpired).into());
    }
    check_password(password)?;

    // Only the request that deletes the row may proceed
    if !db::reset_tokens::delete(&state.pool, &token_hash).await? {
        return Err(AppError::new(ErrorCode::ResetTokenInvalid).into());
    }

    let hashed = hash_or_internal(password)?;
    db::users::update_password(&state.pool, record.user_id, &hashed, now_millis()).await?;

    security_log!(INFO, "password_reset", user_id = record.user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::NewUser;
    use crate::error::ServiceError;
    use crate::services::test_support::{drain, state};
    use crate::util::{hash_password, verify_password};

    async fn seed(state: &AppState) {
        let hash = hash_password("oldpass").unwrap();
        db::users::create(
            &state.pool,
            &NewUser {
                id: 1,
                name: "Asha",
                email: "a@x.com",
                hashed_password: &hash,
                phone: "1",
                address: "Pune",
                email_otp: 123456,
                now: 0,
            },
        )
        .await
        .unwrap();
    }

    fn token_from(n: Vec<Notification>) -> String {
        match n.into_iter().last() {
            Some(Notification::PasswordReset { link, .. }) => {
                link.rsplit('/').next().unwrap().to_string()
            }
            other => panic!("expected reset mail, got {other:?}"),
        }
    }

    fn code(e: ServiceError) -> ErrorCode {
        AppError::from(e).code
    }

    #[tokio::test]
    async fn reset_flow() {
        let (state, mut rx, _dir) = state().await;
        seed(&state).await;
        request_reset(&state, "a@x.com").await.unwrap();
        let token = token_from(drain(&mut rx));

        reset_password(&state, &token, "newpass").await.unwrap();
        let user = db::users::find_by_id(&state.pool, 1).await.unwrap().unwrap();
        assert!(verify_password("newpass", &user.hashed_password));
        assert!(!verify_password("oldpass", &user.hashed_password));

        let err = reset_password(&state, &token, "again12").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ResetTokenInvalid);
    }

    #[tokio::test]
    async fn expired_token_fails() {
        let (state, mut rx, _dir) = state().await;
        seed(&state).await;
        request_reset(&state, "a@x.com").await.unwrap();
        let token = token_from(drain(&mut rx));
        sqlx::query("UPDATE password_reset_tokens SET expires_at = 0")
            .execute(&state.pool)
            .await
            .unwrap();

        let err = reset_password(&state, &token, "newpass").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ResetTokenExpired);
        let user = db::users::find_by_id(&state.pool, 1).await.unwrap().unwrap();
        assert!(verify_password("oldpass", &user.hashed_password));
    }

    #[tokio::test]
    async fn newer_token_invalidates_older() {
        let (state, mut rx, _dir) = state().await;
        seed(&state).await;
        request_reset(&state, "a@x.com").await.unwrap();
        let first = token_from(drain(&mut rx));
        request_reset(&state, "a@x.com").await.unwrap();
        let second = token_from(drain(&mut rx));

        let err = reset_password(&state, &first, "newpass").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ResetTokenInvalid);
        reset_password(&state, &second, "newpass").await.unwrap();
    }

    #[tokio::test]
    async fn unknown_email_and_short_password() {
        let (state, mut rx, _dir) = state().await;
        seed(&state).await;
        let err = request_reset(&state, "z@x.com").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::UserNotFound);

        request_reset(&state, "a@x.com").await.unwrap();
        let token = token_from(drain(&mut rx));
        let err = reset_password(&state, &token, "123").await.unwrap_err();
        assert_eq!(code(err), ErrorCode::PasswordTooShort);
        // Token survives a rejected password
        reset_password(&state, &token, "123456").await.unwrap();
    }
}

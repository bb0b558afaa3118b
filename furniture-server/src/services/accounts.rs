//! Customer accounts: registration, OTP verification, login and profile

use shared::error::{AppError, ErrorCode};
use shared::models::{
    ChangePasswordRequest, LoginRequest, LoginUser, ProfileUpdate, RegisterRequest, UserProfile,
    VerifyOtpRequest,
};
use shared::util::{now_millis, snowflake_id};

use super::{check_password, fresh_otp, hash_or_internal, normalize_email, required_text};
use crate::auth::Role;
use crate::db::{self, RepoError, users::UserRecord};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::Notification;
use crate::security_log;
use crate::state::AppState;
use crate::util::verify_password;

/// Create an unverified account and mail its OTP
pub async fn register(state: &AppState, req: RegisterRequest) -> ServiceResult<UserRecord> {
    let name = required_text("name", &req.name)?;
    let email = normalize_email(&req.email)?;
    let phone = required_text("phone", &req.phone)?;
    let address = required_text("address", &req.address)?;
    check_password(&req.password)?;

    if db::users::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let hashed_password = hash_or_internal(&req.password)?;
    let otp = fresh_otp(&state.pool).await?;

    let user = db::users::create(
        &state.pool,
        &db::users::NewUser {
            id: snowflake_id(),
            name: &name,
            email: &email,
            hashed_password: &hashed_password,
            phone: &phone,
            address: &address,
            email_otp: otp,
            now: now_millis(),
        },
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(_) => ServiceError::App(AppError::new(ErrorCode::EmailAlreadyRegistered)),
        other => ServiceError::from(other),
    })?;

    tracing::info!(user_id = user.id, "User registered");

    state.notifier.notify(Notification::VerificationOtp {
        to: user.email.clone(),
        name: user.name.clone(),
        otp,
    });

    Ok(user)
}

/// Verify a pending account and issue its first session token.
///
/// With an email the OTP must belong to that account; without one it must
/// identify exactly one pending account.
pub async fn verify_otp(state: &AppState, req: VerifyOtpRequest) -> ServiceResult<String> {
    let otp = req
        .otp
        .as_code()
        .ok_or_else(|| AppError::validation("OTP must be a number").with_detail("field", "otp"))?;

    let user = match req.email.as_deref().filter(|e| !e.trim().is_empty()) {
        Some(email) => {
            let email = normalize_email(email)?;
            db::users::find_by_email(&state.pool, &email)
                .await?
                .filter(|u| !u.is_verified && u.email_otp == Some(otp))
                .ok_or_else(|| AppError::new(ErrorCode::OtpNotFound))?
        }
        None => {
            let mut matches = db::users::find_pending_by_otp(&state.pool, otp).await?;
            if matches.len() > 1 {
                return Err(AppError::new(ErrorCode::OtpAmbiguous).into());
            }
            matches
                .pop()
                .ok_or_else(|| AppError::new(ErrorCode::OtpNotFound))?
        }
    };

    if !db::users::consume_otp(&state.pool, user.id, otp, now_millis()).await? {
        return Err(AppError::new(ErrorCode::OtpNotFound).into());
    }

    tracing::info!(user_id = user.id, "User verified");
    issue_token(state, &user)
}

/// Replace the OTP of a pending account and mail it again
pub async fn resend_otp(state: &AppState, email: &str) -> ServiceResult<()> {
    let email = normalize_email(email)?;
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    if user.is_verified {
        return Err(AppError::new(ErrorCode::EmailAlreadyVerified).into());
    }

    let otp = fresh_otp(&state.pool).await?;
    db::users::set_otp(&state.pool, user.id, otp, now_millis()).await?;

    state.notifier.notify(Notification::VerificationOtp {
        to: user.email,
        name: user.name,
        otp,
    });
    Ok(())
}

/// Password login for verified customers
pub async fn login(state: &AppState, req: LoginRequest) -> ServiceResult<(String, LoginUser)> {
    let email = normalize_email(&req.email)?;
    let user = db::users::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;

    if !user.is_verified {
        security_log!(WARN, "login_unverified", user_id = user.id);
        return Err(AppError::new(ErrorCode::EmailNotVerified).into());
    }
    if !verify_password(&req.password, &user.hashed_password) {
        security_log!(WARN, "login_failed", user_id = user.id, reason = "bad_password");
        return Err(AppError::invalid_credentials().into());
    }

    let token = issue_token(state, &user)?;
    tracing::info!(user_id = user.id, "User logged in");
    Ok((token, user.login_user()))
}

pub async fn profile(state: &AppState, user_id: i64) -> ServiceResult<UserProfile> {
    let user = find_user(state, user_id).await?;
    Ok(user.profile())
}

/// Update name and, when given, phone and address
pub async fn update_profile(
    state: &AppState,
    user_id: i64,
    update: ProfileUpdate,
) -> ServiceResult<UserProfile> {
    let name = required_text("name", &update.name)?;
    let phone = update
        .phone
        .as_deref()
        .map(|p| required_text("phone", p))
        .transpose()?;
    let address = update
        .address
        .as_deref()
        .map(|a| required_text("address", a))
        .transpose()?;

    let user = db::users::update_profile(
        &state.pool,
        user_id,
        &name,
        phone.as_deref(),
        address.as_deref(),
        now_millis(),
    )
    .await
    .map_err(|e| match e {
        RepoError::NotFound(_) => ServiceError::App(AppError::new(ErrorCode::UserNotFound)),
        other => ServiceError::from(other),
    })?;

    tracing::info!(user_id, "User profile updated");
    Ok(user.profile())
}

/// Change password after checking the current one
pub async fn change_password(
    state: &AppState,
    user_id: i64,
    req: ChangePasswordRequest,
) -> ServiceResult<()> {
    let user = find_user(state, user_id).await?;
    if !verify_password(&req.old_password, &user.hashed_password) {
        security_log!(WARN, "password_change_failed", user_id);
        return Err(AppError::with_message(
            ErrorCode::InvalidCredentials,
            "Current password is incorrect",
        )
        .into());
    }
    check_password(&req.new_password)?;

    let hashed = hash_or_internal(&req.new_password)?;
    db::users::update_password(&state.pool, user_id, &hashed, now_millis()).await?;
    security_log!(INFO, "password_changed", user_id);
    Ok(())
}

pub(crate) async fn find_user(state: &AppState, user_id: i64) -> ServiceResult<UserRecord> {
    Ok(db::users::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?)
}

fn issue_token(state: &AppState, user: &UserRecord) -> ServiceResult<String> {
    state
        .jwt
        .generate_token(user.id, &user.email, Role::User)
        .map_err(|e| {
            tracing::error!(error = %e, "Token generation failed");
            AppError::internal("Failed to issue token").into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::test_support::{drain, state};
    use shared::models::OtpValue;

    fn registration(email: &str) -> RegisterRequest {
        RegisterRequest {
            name: "Asha".into(),
            email: email.into(),
            phone: "9000000000".into(),
            password: "secret1".into(),
            address: "Pune".into(),
        }
    }

    fn otp_of(n: &[Notification]) -> i64 {
        match n.last() {
            Some(Notification::VerificationOtp { otp, .. }) => *otp,
            other => panic!("expected OTP mail, got {other:?}"),
        }
    }

    fn code(e: ServiceError) -> ErrorCode {
        AppError::from(e).code
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (state, mut rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let err = register(&state, registration("A@X.com")).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::EmailAlreadyRegistered);
        assert_eq!(db::users::count(&state.pool).await.unwrap(), 1);
        assert_eq!(drain(&mut rx).len(), 1);
    }

    #[tokio::test]
    async fn unverified_user_cannot_log_in() {
        let (state, _rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let err = login(
            &state,
            LoginRequest {
                email: "a@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::EmailNotVerified);
    }

    #[tokio::test]
    async fn otp_is_single_use() {
        let (state, mut rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let otp = otp_of(&drain(&mut rx));

        let req = VerifyOtpRequest {
            email: None,
            otp: OtpValue::Text(otp.to_string()),
        };
        let token = verify_otp(&state, req.clone()).await.unwrap();
        assert!(state.jwt.validate_token(&token).is_ok());

        let err = verify_otp(&state, req).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OtpNotFound);

        let (token, user) = login(
            &state,
            LoginRequest {
                email: "a@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(!token.is_empty());
    }

    #[tokio::test]
    async fn otp_with_email_must_match_that_account() {
        let (state, mut rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let otp_a = otp_of(&drain(&mut rx));
        register(&state, registration("b@x.com")).await.unwrap();

        let err = verify_otp(
            &state,
            VerifyOtpRequest {
                email: Some("b@x.com".into()),
                otp: OtpValue::Number(otp_a),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::OtpNotFound);

        verify_otp(
            &state,
            VerifyOtpRequest {
                email: Some("a@x.com".into()),
                otp: OtpValue::Number(otp_a),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn shared_otp_without_email_is_ambiguous() {
        let (state, _rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        register(&state, registration("b@x.com")).await.unwrap();
        // Force a collision that registration itself never produces
        sqlx::query("UPDATE users SET email_otp = 222222")
            .execute(&state.pool)
            .await
            .unwrap();

        let err = verify_otp(
            &state,
            VerifyOtpRequest {
                email: None,
                otp: OtpValue::Number(222222),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::OtpAmbiguous);
    }

    #[tokio::test]
    async fn login_failures() {
        let (state, mut rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let otp = otp_of(&drain(&mut rx));
        verify_otp(
            &state,
            VerifyOtpRequest {
                email: None,
                otp: OtpValue::Number(otp),
            },
        )
        .await
        .unwrap();

        let wrong = login(
            &state,
            LoginRequest {
                email: "a@x.com".into(),
                password: "nope123".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(wrong), ErrorCode::InvalidCredentials);

        let missing = login(
            &state,
            LoginRequest {
                email: "z@x.com".into(),
                password: "secret1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(missing), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn resend_replaces_otp() {
        let (state, mut rx, _dir) = state().await;
        register(&state, registration("a@x.com")).await.unwrap();
        let first = otp_of(&drain(&mut rx));
        resend_otp(&state, "a@x.com").await.unwrap();
        let second = otp_of(&drain(&mut rx));

        let user = db::users::find_by_email(&state.pool, "a@x.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.email_otp, Some(second));
        if first != second {
            let err = verify_otp(
                &state,
                VerifyOtpRequest {
                    email: Some("a@x.com".into()),
                    otp: OtpValue::Number(first),
                },
            )
            .await
            .unwrap_err();
            assert_eq!(code(err), ErrorCode::OtpNotFound);
        }
    }

    #[tokio::test]
    async fn profile_and_password_change() {
        let (state, _rx, _dir) = state().await;
        let user = register(&state, registration("a@x.com")).await.unwrap();

        let updated = update_profile(
            &state,
            user.id,
            ProfileUpdate {
                name: "Asha K".into(),
                phone: None,
                address: Some("Mumbai".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Asha K");
        assert_eq!(updated.phone, "9000000000");
        assert_eq!(updated.address, "Mumbai");

        let err = change_password(
            &state,
            user.id,
            ChangePasswordRequest {
                old_password: "wrong".into(),
                new_password: "another1".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidCredentials);

        change_password(
            &state,
            user.id,
            ChangePasswordRequest {
                old_password: "secret1".into(),
                new_password: "another1".into(),
            },
        )
        .await
        .unwrap();
        let rec = find_user(&state, user.id).await.unwrap();
        assert!(verify_password("another1", &rec.hashed_password));
    }
}

//! Admin accounts

use shared::error::{AppError, ErrorCode};
use shared::models::{AdminProfile, AdminRegisterRequest, LoginRequest};
use shared::util::{now_millis, snowflake_id};

use super::{check_password, hash_or_internal, normalize_email, required_text};
use crate::auth::Role;
use crate::db::{self, RepoError};
use crate::error::{ServiceError, ServiceResult};
use crate::security_log;
use crate::state::AppState;
use crate::util::verify_password;

/// Create an admin account, if self-registration is enabled
pub async fn register(state: &AppState, req: AdminRegisterRequest) -> ServiceResult<AdminProfile> {
    if !state.config.allow_admin_registration {
        security_log!(WARN, "admin_register_blocked", email = %req.email);
        return Err(AppError::new(ErrorCode::AdminRegistrationDisabled).into());
    }

    let name = required_text("name", &req.name)?;
    let email = normalize_email(&req.email)?;
    check_password(&req.password)?;

    if db::admins::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::new(ErrorCode::EmailAlreadyRegistered).into());
    }

    let hashed = hash_or_internal(&req.password)?;
    let admin = db::admins::create(&state.pool, snowflake_id(), &name, &email, &hashed, now_millis())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => {
                ServiceError::App(AppError::new(ErrorCode::EmailAlreadyRegistered))
            }
            other => ServiceError::from(other),
        })?;

    security_log!(INFO, "admin_registered", admin_id = admin.id);
    Ok(admin.profile())
}

/// Password login for admins; the token carries the admin role
pub async fn login(state: &AppState, req: LoginRequest) -> ServiceResult<(String, AdminProfile)> {
    let email = normalize_email(&req.email)?;
    let admin = db::admins::find_by_email(&state.pool, &email)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::AdminNotFound))?;

    if !verify_password(&req.password, &admin.hashed_password) {
        security_log!(WARN, "admin_login_failed", admin_id = admin.id);
        return Err(AppError::invalid_credentials().into());
    }

    let token = state
        .jwt
        .generate_token(admin.id, &admin.email, Role::Admin)
        .map_err(|e| {
            tracing::error!(error = %e, "Token generation failed");
            ServiceError::App(AppError::internal("Failed to issue token"))
        })?;

    security_log!(INFO, "admin_login", admin_id = admin.id);
    Ok((token, admin.profile()))
}

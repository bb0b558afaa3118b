//! Public account endpoints
//!
//! POST /public/user-register - create an unverified account, mail OTP
//! POST /public/email-otp - verify OTP, issue token
//! POST /public/resend-otp - mail a fresh OTP
//! POST /public/user-login - customer login
//! POST /public/forgot-password - mail a reset link
//! POST /public/reset-password/{token}
//! POST /public/admin-register
//! POST /public/admin-login

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use shared::error::ApiResponse;
use shared::models::{
    AdminProfile, AdminRegisterRequest, ForgotPasswordRequest, LoginRequest, LoginUser,
    RegisterRequest, ResendOtpRequest, ResetPasswordRequest, VerifyOtpRequest,
};

use super::extract::ApiJson;
use crate::error::ServiceResult;
use crate::services::{accounts, admins, password_reset};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub message: String,
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: LoginUser,
}

#[derive(Debug, Serialize)]
pub struct AdminLoginResponse {
    pub message: String,
    pub token: String,
    pub admin: AdminProfile,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> ServiceResult<impl IntoResponse> {
    let user = accounts::register(&state, req).await?;
    let message = format!(
        "User created successfully. Verification OTP sent to {}",
        user.email
    );
    Ok((StatusCode::CREATED, Json(ApiResponse::message(message))))
}

pub async fn verify_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<VerifyOtpRequest>,
) -> ServiceResult<Json<TokenResponse>> {
    let token = accounts::verify_otp(&state, req).await?;
    Ok(Json(TokenResponse {
        message: "User verified successfully".into(),
        token,
    }))
}

pub async fn resend_otp(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ResendOtpRequest>,
) -> ServiceResult<ApiResponse<()>> {
    accounts::resend_otp(&state, &req.email).await?;
    Ok(ApiResponse::message("Verification OTP sent"))
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ServiceResult<Json<LoginResponse>> {
    let (token, user) = accounts::login(&state, req).await?;
    Ok(Json(LoginResponse {
        message: "Logged in successfully".into(),
        token,
        user,
    }))
}

pub async fn forgot_password(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> ServiceResult<ApiResponse<()>> {
    password_reset::request_reset(&state, &req.email).await?;
    Ok(ApiResponse::message("Password reset link sent to your email"))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> ServiceResult<ApiResponse<()>> {
    password_reset::reset_password(&state, &token, &req.password).await?;
    Ok(ApiResponse::message("Password reset successfully"))
}

pub async fn admin_register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<AdminRegisterRequest>,
) -> ServiceResult<impl IntoResponse> {
    admins::register(&state, req).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::message("Admin created successfully")),
    ))
}

pub async fn admin_login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> ServiceResult<Json<AdminLoginResponse>> {
    let (token, admin) = admins::login(&state, req).await?;
    Ok(Json(AdminLoginResponse {
        message: "Admin logged in successfully".into(),
        token,
        admin,
    }))
}

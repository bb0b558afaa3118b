//! Signed-in customer's own account

use axum::Json;
use axum::extract::State;
use shared::error::ApiResponse;
use shared::models::{ChangePasswordRequest, UpdateUserRequest, UserProfile};

use super::extract::ApiJson;
use crate::auth::CurrentUser;
use crate::error::ServiceResult;
use crate::services::accounts;
use crate::state::AppState;

/// GET /private/me
pub async fn me(State(state): State<AppState>, user: CurrentUser) -> ServiceResult<Json<UserProfile>> {
    Ok(Json(accounts::profile(&state, user.id).await?))
}

/// POST /private/update-user
pub async fn update_user(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> ServiceResult<ApiResponse<UserProfile>> {
    let profile = accounts::update_profile(&state, user.id, req.user_input).await?;
    Ok(ApiResponse::success_with_message("User updated successfully", profile))
}

/// POST /private/update-password
pub async fn update_password(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(req): ApiJson<ChangePasswordRequest>,
) -> ServiceResult<ApiResponse<()>> {
    accounts::change_password(&state, user.id, req).await?;
    Ok(ApiResponse::message("Password updated successfully"))
}

//! Favourites of the signed-in customer

use axum::Json;
use axum::extract::{Path, State};
use shared::error::ApiResponse;

use super::extract::parse_id;
use crate::auth::CurrentUser;
use crate::error::ServiceResult;
use crate::services::favourites;
use crate::state::AppState;

/// POST /private/add-to-favourites/{productId}
pub async fn add(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    let product_id = parse_id("productId", &product_id)?;
    favourites::add(&state, user.id, product_id).await?;
    Ok(ApiResponse::message("Product added to favorites"))
}

/// DELETE /private/remove-from-favourites/{productId}
///
/// Succeeds whether or not the product was a favourite.
pub async fn remove(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    let product_id = parse_id("productId", &product_id)?;
    favourites::remove(&state, user.id, product_id).await?;
    Ok(ApiResponse::message("Product removed from favorites"))
}

/// GET /private/favourites - product ids in the order they were added
pub async fn list(State(state): State<AppState>, user: CurrentUser) -> ServiceResult<Json<Vec<i64>>> {
    Ok(Json(favourites::list(&state, user.id).await?))
}

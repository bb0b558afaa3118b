//! Customer order endpoints

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use shared::error::ApiResponse;
use shared::models::OrderHistoryEntry;

use super::extract::parse_id;
use crate::auth::CurrentUser;
use crate::error::ServiceResult;
use crate::services::orders;
use crate::state::AppState;

/// POST /private/place-order/{productId}
pub async fn place(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(product_id): Path<String>,
) -> ServiceResult<impl IntoResponse> {
    let product_id = parse_id("productId", &product_id)?;
    let order = orders::place_order(&state, user.id, product_id).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message(
            "Order placed! Our team will contact you within 4-5 hours.",
            OrderHistoryEntry::from(order),
        ),
    ))
}

/// GET /private/order-history - newest first
pub async fn history(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ServiceResult<Json<Vec<OrderHistoryEntry>>> {
    Ok(Json(orders::history(&state, user.id).await?))
}

/// DELETE /private/cancel-order/{orderid}
pub async fn cancel(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(order_id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    let order_id = parse_id("orderid", &order_id)?;
    orders::cancel_order(&state, user.id, order_id).await?;
    Ok(ApiResponse::message("Order cancelled successfully"))
}

//! Customer catalog reads

use axum::Json;
use axum::extract::{Path, State};
use shared::models::CatalogItem;

use crate::error::ServiceResult;
use crate::services::catalog;
use crate::state::AppState;

/// GET /private/products
pub async fn list(State(state): State<AppState>) -> ServiceResult<Json<Vec<CatalogItem>>> {
    Ok(Json(catalog::list_catalog(&state).await?))
}

/// GET /private/products/{category} - matches category or model name
pub async fn by_category(
    State(state): State<AppState>,
    Path(term): Path<String>,
) -> ServiceResult<Json<Vec<CatalogItem>>> {
    Ok(Json(catalog::list_by_category(&state, &term).await?))
}

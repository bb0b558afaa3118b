//! Customer favourites

use shared::error::{AppError, ErrorCode};
use shared::util::now_millis;

use crate::db::{self, RepoError};
use crate::error::{ServiceError, ServiceResult};
use crate::services::accounts::find_user;
use crate::state::AppState;

pub async fn add(state: &AppState, user_id: i64, product_id: i64) -> ServiceResult<()> {
    find_user(state, user_id).await?;
    if db::products::find_by_id(&state.pool, product_id).await?.is_none() {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }

    db::favourites::add(&state.pool, user_id, product_id, now_millis())
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => ServiceError::App(AppError::new(ErrorCode::AlreadyFavourite)),
            other => ServiceError::from(other),
        })?;

    tracing::info!(user_id, product_id, "Favourite added");
    Ok(())
}

/// Idempotent: removing an id that is not a favourite succeeds
pub async fn remove(state: &AppState, user_id: i64, product_id: i64) -> ServiceResult<()> {
    find_user(state, user_id).await?;
    if db::favourites::remove(&state.pool, user_id, product_id).await? {
        tracing::info!(user_id, product_id, "Favourite removed");
    }
    Ok(())
}

/// Raw favourite product ids
pub async fn list(state: &AppState, user_id: i64) -> ServiceResult<Vec<i64>> {
    find_user(state, user_id).await?;
    Ok(db::favourites::list(&state.pool, user_id).await?)
}

//! Admin endpoints: product management and the order queue

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;
use shared::error::{ApiResponse, AppError, ErrorCode};
use shared::models::{Order, OrderStatusUpdate, Product, ProductSummary};

use super::extract::{ApiJson, parse_id};
use crate::error::ServiceResult;
use crate::services::catalog::{self, ProductForm};
use crate::services::images::{ImageUpload, MAX_FILES};
use crate::services::orders::{self, OrderView};
use crate::state::AppState;

/// Multipart field carrying product images
const IMAGES_FIELD: &str = "images";

/// POST /private/add-product
///
/// Multipart form: the product text fields plus 1 to 5 `images` files.
pub async fn add_product(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ServiceResult<impl IntoResponse> {
    let mut multipart = multipart.map_err(|e| AppError::invalid_request(e.body_text()))?;

    let mut form = ProductForm::default();
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == IMAGES_FIELD {
            if uploads.len() == MAX_FILES {
                return Err(AppError::with_message(
                    ErrorCode::TooManyFiles,
                    format!("At most {MAX_FILES} images per product"),
                )
                .into());
            }
            let filename = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let data = field.bytes().await.map_err(multipart_error)?;
            uploads.push(ImageUpload {
                filename,
                content_type,
                data: data.to_vec(),
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            form.set(&name, value);
        }
    }

    let product = catalog::add_product(&state, &form, &uploads).await?;
    Ok((
        StatusCode::CREATED,
        ApiResponse::success_with_message("Product added successfully", product),
    ))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::with_message(ErrorCode::FileTooLarge, e.body_text())
    } else {
        AppError::invalid_request(e.body_text())
    }
}

/// DELETE /private/delete-product/{id}
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServiceResult<ApiResponse<()>> {
    let id = parse_id("id", &id)?;
    catalog::delete_product(&state, id).await?;
    Ok(ApiResponse::message("Product deleted successfully"))
}

/// GET /private/get-all-products
pub async fn list_products(
    State(state): State<AppState>,
) -> ServiceResult<Json<Vec<ProductSummary>>> {
    Ok(Json(catalog::list_summaries(&state).await?))
}

/// GET /private/products-man/{phone}
pub async fn products_by_manufacturer(
    State(state): State<AppState>,
    Path(phone): Path<String>,
) -> ServiceResult<Json<Vec<Product>>> {
    Ok(Json(catalog::list_by_manufacturer(&state, &phone).await?))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub view: Option<String>,
}

/// GET /private/getallorders[?view=pending|live]
pub async fn list_orders(
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> ServiceResult<Json<Vec<Order>>> {
    let view = match query.view.as_deref().map(str::trim) {
        None | Some("") | Some("pending") => OrderView::Pending,
        Some("live") => OrderView::Live,
        Some(other) => {
            return Err(AppError::invalid_request(format!(
                "Unknown order view '{other}', expected 'pending' or 'live'"
            ))
            .with_detail("field", "view")
            .into());
        }
    };
    Ok(Json(orders::list_orders(&state, view).await?))
}

/// GET /private/completeorder/{orderid}
pub async fn complete_order(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
) -> ServiceResult<ApiResponse<Order>> {
    let order_id = parse_id("orderid", &order_id)?;
    let order = orders::complete_order(&state, order_id).await?;
    Ok(ApiResponse::success_with_message("Order completed successfully", order))
}

/// POST /private/order-status/{orderid}
pub async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<String>,
    ApiJson(req): ApiJson<OrderStatusUpdate>,
) -> ServiceResult<ApiResponse<Order>> {
    let order_id = parse_id("orderid", &order_id)?;
    let next = req.status().map_err(|e| {
        AppError::with_message(ErrorCode::InvalidOrderStatus, e).with_detail("field", "status")
    })?;
    let order = orders::set_status(&state, order_id, next).await?;
    Ok(ApiResponse::success_with_message("Order status updated", order))
}

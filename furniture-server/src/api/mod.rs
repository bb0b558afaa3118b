//! HTTP API
//!
//! | Prefix | Guard | Module |
//! |--------|-------|--------|
//! | `/public` | none | [`accounts`] |
//! | `/private` (customer) | token + customer role | [`profile`], [`catalog`], [`favourites`], [`orders`] |
//! | `/private` (admin) | token + admin role | [`admin`] |
//! | `/uploads` | none | static product images |

pub mod accounts;
pub mod admin;
pub mod catalog;
pub mod extract;
pub mod favourites;
pub mod middleware;
pub mod orders;
pub mod profile;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::auth::{require_admin, require_auth, require_user};
use crate::services::images::{MAX_FILE_SIZE, MAX_FILES};
use crate::state::AppState;

/// Multipart headroom on top of the image payload
const FORM_OVERHEAD: usize = 1024 * 1024;

/// Build the full application router
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/public/user-register", post(accounts::register))
        .route("/public/email-otp", post(accounts::verify_otp))
        .route("/public/resend-otp", post(accounts::resend_otp))
        .route("/public/user-login", post(accounts::login))
        .route("/public/forgot-password", post(accounts::forgot_password))
        .route("/public/reset-password/{token}", post(accounts::reset_password))
        .route("/public/admin-register", post(accounts::admin_register))
        .route("/public/admin-login", post(accounts::admin_login));

    let customer = Router::new()
        .route("/private/me", get(profile::me))
        .route("/private/update-user", post(profile::update_user))
        .route("/private/update-password", post(profile::update_password))
        .route("/private/products", get(catalog::list))
        .route("/private/products/{category}", get(catalog::by_category))
        .route("/private/add-to-favourites/{productId}", post(favourites::add))
        .route(
            "/private/remove-from-favourites/{productId}",
            delete(favourites::remove),
        )
        .route("/private/favourites", get(favourites::list))
        .route("/private/place-order/{productId}", post(orders::place))
        .route("/private/order-history", get(orders::history))
        .route("/private/cancel-order/{orderid}", delete(orders::cancel))
        .route_layer(axum::middleware::from_fn(require_user));

    let admin = Router::new()
        .route(
            "/private/add-product",
            post(admin::add_product)
                .layer(DefaultBodyLimit::max(MAX_FILES * MAX_FILE_SIZE + FORM_OVERHEAD)),
        )
        .route("/private/delete-product/{id}", delete(admin::delete_product))
        .route("/private/get-all-products", get(admin::list_products))
        .route("/private/products-man/{phone}", get(admin::products_by_manufacturer))
        .route("/private/getallorders", get(admin::list_orders))
        .route("/private/completeorder/{orderid}", get(admin::complete_order))
        .route("/private/order-status/{orderid}", post(admin::update_order_status))
        .route_layer(axum::middleware::from_fn(require_admin));

    // Role guards run after `require_auth` has attached the caller
    let private = customer.merge(admin).route_layer(axum::middleware::from_fn_with_state(
        state.clone(),
        require_auth,
    ));

    let uploads = ServeDir::new(&state.config.upload_dir);

    Router::new()
        .route("/", get(root))
        .merge(public)
        .merge(private)
        .nest_service("/uploads", uploads)
        .layer(cors_layer(&state.config.cors_origins))
        .layer(axum::middleware::from_fn(middleware::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "Welcome to the server" }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(allowed))
}

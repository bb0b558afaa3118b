//! Order lifecycle
//!
//! Orders snapshot the product and customer at placement time. Status moves
//! along [`OrderStatus::can_transition_to`]; every change is a compare-and-set
//! on the current status, so two racing updates cannot both apply.

use shared::error::{AppError, ErrorCode};
use shared::models::{Order, OrderHistoryEntry, OrderStatus};
use shared::util::{now_millis, snowflake_id};

use crate::db::{self, RepoError};
use crate::error::{ServiceError, ServiceResult};
use crate::notify::Notification;
use crate::services::accounts::find_user;
use crate::state::AppState;

/// Which orders the admin listing shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderView {
    /// Status exactly `pending`
    #[default]
    Pending,
    /// Every non-terminal status
    Live,
}

/// Place an order for `product_id`.
///
/// Fails with `LiveOrderExists` while the customer already has a live order
/// for the same product.
pub async fn place_order(state: &AppState, user_id: i64, product_id: i64) -> ServiceResult<Order> {
    let user = find_user(state, user_id).await?;
    let product = db::products::find_by_id(&state.pool, product_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    let now = now_millis();
    let order = Order {
        id: snowflake_id(),
        user_id: user.id,
        product_id: product.id,
        user_name: user.name.clone(),
        user_phone: user.phone.clone(),
        user_address: user.address.clone(),
        model_name: product.model_name.clone(),
        price_range: product.price_range,
        product_image: product.images.first().cloned(),
        manufacturer_name: product.manufacturer_name.clone(),
        factory_name: product.factory_name.clone(),
        manufacturer_phone: product.manufacturer_phone.clone(),
        status: OrderStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    db::orders::insert(&state.pool, &order)
        .await
        .map_err(|e| match e {
            RepoError::Duplicate(_) => ServiceError::App(AppError::new(ErrorCode::LiveOrderExists)),
            other => ServiceError::from(other),
        })?;

    tracing::info!(order_id = order.id, user_id, product_id, "Order placed");

    state.notifier.notify(Notification::OrderPlaced {
        to: user.email.clone(),
        name: user.name.clone(),
        model_name: order.model_name.clone(),
        order_id: order.id,
    });
    state.notifier.notify(Notification::NewOrderAlert {
        to: state.config.admin_email.clone(),
        customer_name: user.name,
        customer_email: user.email,
        customer_phone: user.phone,
        model_name: order.model_name.clone(),
        order_id: order.id,
    });

    Ok(order)
}

/// Admin: mark an order completed from any live status
pub async fn complete_order(state: &AppState, order_id: i64) -> ServiceResult<Order> {
    set_status(state, order_id, OrderStatus::Completed).await
}

/// Admin: move an order to `next`
pub async fn set_status(state: &AppState, order_id: i64, next: OrderStatus) -> ServiceResult<Order> {
    let order = db::orders::find_by_id(&state.pool, order_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    transition(state, order, None, next).await
}

/// Customer: cancel one of their own live orders.
///
/// Someone else's order is reported as not found.
pub async fn cancel_order(state: &AppState, user_id: i64, order_id: i64) -> ServiceResult<Order> {
    let order = db::orders::find_by_id(&state.pool, order_id)
        .await?
        .filter(|o| o.user_id == user_id)
        .ok_or_else(|| AppError::new(ErrorCode::OrderNotFound))?;
    transition(state, order, Some(user_id), OrderStatus::Cancelled).await
}

async fn transition(
    state: &AppState,
    mut order: Order,
    owner: Option<i64>,
    next: OrderStatus,
) -> ServiceResult<Order> {
    let invalid = |from: OrderStatus| {
        AppError::with_message(
            ErrorCode::InvalidOrderTransition,
            format!("Cannot move order from {from} to {next}"),
        )
        .with_detail("from", from.as_str())
        .with_detail("to", next.as_str())
    };

    if !order.status.can_transition_to(next) {
        return Err(invalid(order.status).into());
    }

    let now = now_millis();
    if !db::orders::transition(&state.pool, order.id, owner, order.status, next, now).await? {
        // Lost a race; report against the status that won
        let current = db::orders::find_by_id(&state.pool, order.id)
            .await?
            .map(|o| o.status)
            .unwrap_or(order.status);
        return Err(invalid(current).into());
    }

    tracing::info!(order_id = order.id, from = %order.status, to = %next, "Order status changed");
    order.status = next;
    order.updated_at = now;
    Ok(order)
}

/// Admin listing, oldest first
pub async fn list_orders(state: &AppState, view: OrderView) -> ServiceResult<Vec<Order>> {
    let statuses: &[OrderStatus] = match view {
        OrderView::Pending => &[OrderStatus::Pending],
        OrderView::Live => &OrderStatus::LIVE,
    };
    Ok(db::orders::list_by_statuses(&state.pool, statuses).await?)
}

/// The caller's orders, newest first
pub async fn history(state: &AppState, user_id: i64) -> ServiceResult<Vec<OrderHistoryEntry>> {
    let orders = db::orders::list_by_user(&state.pool, user_id).await?;
    Ok(orders.into_iter().map(OrderHistoryEntry::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::users::NewUser;
    use crate::services::catalog::{add_product, delete_product, tests::form};
    use crate::services::images::tests::{PNG, upload};
    use crate::services::test_support::{drain, state};

    async fn seed_user(state: &AppState, id: i64, email: &str) {
        db::users::create(
            &state.pool,
            &NewUser {
                id,
                name: "Asha",
                email,
                hashed_password: "h",
                phone: "9000000000",
                address: "Pune",
                email_otp: 100000 + id,
                now: 0,
            },
        )
        .await
        .unwrap();
    }

    async fn seed_product(state: &AppState) -> i64 {
        add_product(state, &form("Oslo", "sofa"), &[upload("a.png", PNG)])
            .await
            .unwrap()
            .id
    }

    fn code(e: ServiceError) -> ErrorCode {
        AppError::from(e).code
    }

    #[tokio::test]
    async fn one_live_order_per_pair() {
        let (state, mut rx, _dir) = state().await;
        seed_user(&state, 1, "a@x.com").await;
        let product = seed_product(&state).await;

        let first = place_order(&state, 1, product).await.unwrap();
        assert_eq!(first.status, OrderStatus::Pending);
        assert!(first.product_image.is_some());

        let err = place_order(&state, 1, product).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::LiveOrderExists);

        complete_order(&state, first.id).await.unwrap();
        let third = place_order(&state, 1, product).await.unwrap();
        assert_ne!(third.id, first.id);

        let sent = drain(&mut rx);
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().any(|n| matches!(
            n,
            Notification::NewOrderAlert { to, .. } if to == "admin@getfurnitures.test"
        )));
    }

    #[tokio::test]
    async fn terminal_orders_cannot_move() {
        let (state, _rx, _dir) = state().await;
        seed_user(&state, 1, "a@x.com").await;
        let product = seed_product(&state).await;
        let order = place_order(&state, 1, product).await.unwrap();

        set_status(&state, order.id, OrderStatus::Contacted).await.unwrap();
        set_status(&state, order.id, OrderStatus::InProcess).await.unwrap();
        let err = set_status(&state, order.id, OrderStatus::Contacted).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidOrderTransition);

        complete_order(&state, order.id).await.unwrap();
        let err = complete_order(&state, order.id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidOrderTransition);

        let err = complete_order(&state, 424242).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotFound);
    }

    #[tokio::test]
    async fn cancel_is_owner_scoped_and_soft() {
        let (state, _rx, _dir) = state().await;
        seed_user(&state, 1, "a@x.com").await;
        seed_user(&state, 2, "b@x.com").await;
        let product = seed_product(&state).await;
        let order = place_order(&state, 1, product).await.unwrap();

        let err = cancel_order(&state, 2, order.id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::OrderNotFound);

        let cancelled = cancel_order(&state, 1, order.id).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);

        let err = cancel_order(&state, 1, order.id).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::InvalidOrderTransition);

        let history = history(&state, 1).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, OrderStatus::Cancelled);

        // Pair is free again
        place_order(&state, 1, product).await.unwrap();
    }

    #[tokio::test]
    async fn views_and_snapshots() {
        let (state, _rx, _dir) = state().await;
        seed_user(&state, 1, "a@x.com").await;
        let p1 = seed_product(&state).await;
        let p2 = add_product(&state, &form("Kyoto", "bed"), &[upload("k.png", PNG)])
            .await
            .unwrap()
            .id;

        let o1 = place_order(&state, 1, p1).await.unwrap();
        place_order(&state, 1, p2).await.unwrap();
        set_status(&state, o1.id, OrderStatus::Contacted).await.unwrap();

        assert_eq!(list_orders(&state, OrderView::Pending).await.unwrap().len(), 1);
        assert_eq!(list_orders(&state, OrderView::Live).await.unwrap().len(), 2);

        delete_product(&state, p1).await.unwrap();
        let history = history(&state, 1).await.unwrap();
        let kept = history.iter().find(|o| o.id == o1.id).unwrap();
        assert_eq!(kept.model_name, "Oslo");
        assert_eq!(kept.manufacturer_phone, "9876543210");

        let err = place_order(&state, 1, p1).await.unwrap_err();
        assert_eq!(code(err), ErrorCode::ProductNotFound);
    }
}

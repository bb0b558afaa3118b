//! Order Repository
//!
//! The one-live-order rule is held by the partial unique index
//! `idx_orders_one_live`; a losing insert surfaces as [`RepoError::Duplicate`].

use super::{RepoError, RepoResult};
use shared::models::{Order, OrderStatus, PriceRange, ProductImage};
use sqlx::SqlitePool;

const ORDER_COLUMNS: &str = "id, user_id, product_id, user_name, user_phone, user_address, model_name, \
     min_price, max_price, image_filename, image_path, image_mimetype, manufacturer_name, \
     factory_name, manufacturer_phone, status, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    user_name: String,
    user_phone: String,
    user_address: String,
    model_name: String,
    min_price: f64,
    max_price: f64,
    image_filename: Option<String>,
    image_path: Option<String>,
    image_mimetype: Option<String>,
    manufacturer_name: String,
    factory_name: String,
    manufacturer_phone: String,
    status: String,
    created_at: i64,
    updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row
            .status
            .parse()
            .map_err(|e: String| RepoError::Database(format!("order {}: {e}", row.id)))?;
        let product_image = match (row.image_filename, row.image_path, row.image_mimetype) {
            (Some(filename), Some(path), Some(mimetype)) => Some(ProductImage {
                filename,
                path,
                mimetype,
            }),
            _ => None,
        };
        Ok(Order {
            id: row.id,
            user_id: row.user_id,
            product_id: row.product_id,
            user_name: row.user_name,
            user_phone: row.user_phone,
            user_address: row.user_address,
            model_name: row.model_name,
            price_range: PriceRange {
                min: row.min_price,
                max: row.max_price,
            },
            product_image,
            manufacturer_name: row.manufacturer_name,
            factory_name: row.factory_name,
            manufacturer_phone: row.manufacturer_phone,
            status,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn collect(rows: Vec<OrderRow>) -> RepoResult<Vec<Order>> {
    rows.into_iter().map(Order::try_from).collect()
}

/// Insert a new order snapshot
pub async fn insert(pool: &SqlitePool, order: &Order) -> RepoResult<()> {
    let image = order.product_image.as_ref();
    sqlx::query(
        "INSERT INTO orders (id, user_id, product_id, user_name, user_phone, user_address, model_name,
                             min_price, max_price, image_filename, image_path, image_mimetype,
                             manufacturer_name, factory_name, manufacturer_phone, status, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(order.id)
    .bind(order.user_id)
    .bind(order.product_id)
    .bind(&order.user_name)
    .bind(&order.user_phone)
    .bind(&order.user_address)
    .bind(&order.model_name)
    .bind(order.price_range.min)
    .bind(order.price_range.max)
    .bind(image.map(|i| i.filename.as_str()))
    .bind(image.map(|i| i.path.as_str()))
    .bind(image.map(|i| i.mimetype.as_str()))
    .bind(&order.manufacturer_name)
    .bind(&order.factory_name)
    .bind(&order.manufacturer_phone)
    .bind(order.status.as_str())
    .bind(order.created_at)
    .bind(order.updated_at)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Order>> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let row = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    row.map(Order::try_from).transpose()
}

/// All orders of a user, newest first
pub async fn list_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? ORDER BY created_at DESC, id DESC"
    );
    let rows = sqlx::query_as::<_, OrderRow>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    collect(rows)
}

/// Orders in any of `statuses`, oldest first (work queue order)
pub async fn list_by_statuses(
    pool: &SqlitePool,
    statuses: &[OrderStatus],
) -> RepoResult<Vec<Order>> {
    if statuses.is_empty() {
        return Ok(Vec::new());
    }
    let placeholders = vec!["?"; statuses.len()].join(", ");
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE status IN ({placeholders}) ORDER BY created_at ASC, id ASC"
    );
    let mut query = sqlx::query_as::<_, OrderRow>(&sql);
    for status in statuses {
        query = query.bind(status.as_str());
    }
    collect(query.fetch_all(pool).await?)
}

/// Compare-and-set status change.
///
/// Applies only while the order is still in `expected` (and, when given,
/// owned by `owner`). Returns false when nothing matched.
pub async fn transition(
    pool: &SqlitePool,
    id: i64,
    owner: Option<i64>,
    expected: OrderStatus,
    next: OrderStatus,
    now: i64,
) -> RepoResult<bool> {
    let result = sqlx::query(
        "UPDATE orders SET status = ?1, updated_at = ?2
         WHERE id = ?3 AND status = ?4 AND (?5 IS NULL OR user_id = ?5)",
    )
    .bind(next.as_str())
    .bind(now)
    .bind(id)
    .bind(expected.as_str())
    .bind(owner)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

//! Product Repository
//!
//! Products and their images live in two tables; reads stitch them back
//! together in insertion order.

use super::{RepoError, RepoResult};
use shared::models::{Category, PriceRange, Product, ProductCreate, ProductImage};
use sqlx::SqlitePool;
use std::collections::HashMap;

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    model_name: String,
    category: String,
    min_price: f64,
    max_price: f64,
    description: Option<String>,
    manufacturer_name: String,
    manufacturer_phone: String,
    factory_name: String,
    is_available: bool,
    created_at: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct ImageRow {
    product_id: i64,
    filename: String,
    path: String,
    mimetype: String,
}

impl ProductRow {
    fn into_product(self, images: Vec<ProductImage>) -> RepoResult<Product> {
        let category: Category = self
            .category
            .parse()
            .map_err(|e: String| RepoError::Database(format!("product {}: {e}", self.id)))?;
        Ok(Product {
            id: self.id,
            model_name: self.model_name,
            category,
            price_range: PriceRange {
                min: self.min_price,
                max: self.max_price,
            },
            images,
            description: self.description,
            manufacturer_name: self.manufacturer_name,
            manufacturer_phone: self.manufacturer_phone,
            factory_name: self.factory_name,
            is_available: self.is_available,
            created_at: self.created_at,
        })
    }
}

/// Row filter shared by the product and image queries
enum Filter<'a> {
    All,
    Id(i64),
    CategoryOrModel(&'a str),
    ManufacturerPhone(&'a str),
}

impl Filter<'_> {
    fn clause(&self) -> &'static str {
        match self {
            Filter::All => "1 = 1",
            Filter::Id(_) => "p.id = ?1",
            Filter::CategoryOrModel(_) => "(p.category = ?1 OR p.model_name = ?1)",
            Filter::ManufacturerPhone(_) => "p.manufacturer_phone = ?1",
        }
    }

    fn bind<'q, O>(
        &self,
        query: sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>>,
    ) -> sqlx::query::QueryAs<'q, sqlx::Sqlite, O, sqlx::sqlite::SqliteArguments<'q>> {
        match *self {
            Filter::All => query,
            Filter::Id(id) => query.bind(id),
            Filter::CategoryOrModel(term) => query.bind(term.to_string()),
            Filter::ManufacturerPhone(phone) => query.bind(phone.to_string()),
        }
    }
}

async fn load(pool: &SqlitePool, filter: Filter<'_>) -> RepoResult<Vec<Product>> {
    let product_sql = format!(
        "SELECT p.id, p.model_name, p.category, p.min_price, p.max_price, p.description,
                p.manufacturer_name, p.manufacturer_phone, p.factory_name, p.is_available, p.created_at
         FROM products p WHERE {} ORDER BY p.created_at DESC, p.id DESC",
        filter.clause()
    );
    let rows: Vec<ProductRow> = filter
        .bind(sqlx::query_as::<_, ProductRow>(&product_sql))
        .fetch_all(pool)
        .await?;

    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let image_sql = format!(
        "SELECT i.product_id, i.filename, i.path, i.mimetype
         FROM product_images i JOIN products p ON p.id = i.product_id
         WHERE {} ORDER BY i.product_id, i.position",
        filter.clause()
    );
    let image_rows: Vec<ImageRow> = filter
        .bind(sqlx::query_as::<_, ImageRow>(&image_sql))
        .fetch_all(pool)
        .await?;

    let mut images: HashMap<i64, Vec<ProductImage>> = HashMap::new();
    for img in image_rows {
        images.entry(img.product_id).or_default().push(ProductImage {
            filename: img.filename,
            path: img.path,
            mimetype: img.mimetype,
        });
    }

    rows.into_iter()
        .map(|row| {
            let imgs = images.remove(&row.id).unwrap_or_default();
            row.into_product(imgs)
        })
        .collect()
}

/// Insert a product with its images in one transaction
pub async fn create(
    pool: &SqlitePool,
    id: i64,
    data: &ProductCreate,
    images: &[ProductImage],
    now: i64,
) -> RepoResult<Product> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO products (id, model_name, category, min_price, max_price, description,
                               manufacturer_name, manufacturer_phone, factory_name, is_available, created_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(&data.model_name)
    .bind(data.category.as_str())
    .bind(data.price_range.min)
    .bind(data.price_range.max)
    .bind(&data.description)
    .bind(&data.manufacturer_name)
    .bind(&data.manufacturer_phone)
    .bind(&data.factory_name)
    .bind(now)
    .execute(&mut *tx)
    .await?;

    for (position, image) in images.iter().enumerate() {
        sqlx::query(
            "INSERT INTO product_images (product_id, position, filename, path, mimetype) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(position as i64)
        .bind(&image.filename)
        .bind(&image.path)
        .bind(&image.mimetype)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to read back created product".into()))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Product>> {
    Ok(load(pool, Filter::Id(id)).await?.into_iter().next())
}

/// All products, newest first
pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Product>> {
    load(pool, Filter::All).await
}

/// Products whose category or model name equals `term`
pub async fn find_by_category_or_model(pool: &SqlitePool, term: &str) -> RepoResult<Vec<Product>> {
    load(pool, Filter::CategoryOrModel(term)).await
}

pub async fn find_by_manufacturer_phone(
    pool: &SqlitePool,
    phone: &str,
) -> RepoResult<Vec<Product>> {
    load(pool, Filter::ManufacturerPhone(phone)).await
}

/// Delete a product (images cascade). Returns false if it did not exist.
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let result = sqlx::query("DELETE FROM products WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

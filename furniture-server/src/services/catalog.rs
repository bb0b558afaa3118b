//! Product catalog and admin product management

use shared::error::{AppError, ErrorCode};
use shared::models::{CatalogItem, Category, PriceRange, Product, ProductCreate, ProductSummary};
use shared::util::{now_millis, snowflake_id};

use super::images::ImageUpload;
use super::required_text;
use crate::db;
use crate::error::ServiceResult;
use crate::state::AppState;

/// Text fields of the add-product form, as received
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub model_name: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub manufacturer_name: Option<String>,
    pub manufacturer_phone: Option<String>,
    pub factory_name: Option<String>,
    pub description: Option<String>,
}

impl ProductForm {
    /// Record a form field by its wire name. Unknown names are ignored.
    pub fn set(&mut self, name: &str, value: String) {
        let slot = match name {
            "modelName" => &mut self.model_name,
            "category" => &mut self.category,
            "minPrice" => &mut self.min_price,
            "maxPrice" => &mut self.max_price,
            "manufacturerName" => &mut self.manufacturer_name,
            "manufacturerPhone" => &mut self.manufacturer_phone,
            "factoryName" => &mut self.factory_name,
            "description" => &mut self.description,
            _ => return,
        };
        *slot = Some(value);
    }

    fn validate(&self) -> Result<ProductCreate, AppError> {
        fn field(name: &str, value: &Option<String>) -> Result<String, AppError> {
            required_text(name, value.as_deref().unwrap_or_default())
        }

        let model_name = field("modelName", &self.model_name)?;
        let category: Category = field("category", &self.category)?
            .to_lowercase()
            .parse()
            .map_err(|e: String| AppError::with_message(ErrorCode::ProductInvalidCategory, e))?;
        let price_range = PriceRange {
            min: parse_price("minPrice", &field("minPrice", &self.min_price)?)?,
            max: parse_price("maxPrice", &field("maxPrice", &self.max_price)?)?,
        };
        if !price_range.is_valid() {
            return Err(AppError::with_message(
                ErrorCode::ProductInvalidPrice,
                "minPrice must not exceed maxPrice",
            ));
        }

        Ok(ProductCreate {
            model_name,
            category,
            price_range,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            manufacturer_name: field("manufacturerName", &self.manufacturer_name)?,
            manufacturer_phone: field("manufacturerPhone", &self.manufacturer_phone)?,
            factory_name: field("factoryName", &self.factory_name)?,
        })
    }
}

fn parse_price(name: &str, raw: &str) -> Result<f64, AppError> {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v),
        _ => Err(AppError::with_message(
            ErrorCode::ProductInvalidPrice,
            format!("{name} must be a non-negative number"),
        )
        .with_detail("field", name)),
    }
}

/// Validate the form, store the images, then persist the product.
///
/// Stored files are removed again if the insert fails.
pub async fn add_product(
    state: &AppState,
    form: &ProductForm,
    uploads: &[ImageUpload],
) -> ServiceResult<Product> {
    let data = form.validate()?;
    let images = state.images.save_all(uploads).await?;

    let product =
        match db::products::create(&state.pool, snowflake_id(), &data, &images, now_millis()).await
        {
            Ok(p) => p,
            Err(e) => {
                state.images.remove_all(&images).await;
                return Err(e.into());
            }
        };

    tracing::info!(
        product_id = product.id,
        images = product.images.len(),
        "Product added"
    );
    Ok(product)
}

/// Delete a product and, best effort, its image files.
///
/// Orders keep their snapshot of the product.
pub async fn delete_product(state: &AppState, id: i64) -> ServiceResult<()> {
    let product = db::products::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ProductNotFound))?;

    state.images.remove_all(&product.images).await;

    if !db::products::delete(&state.pool, id).await? {
        return Err(AppError::new(ErrorCode::ProductNotFound).into());
    }
    tracing::info!(product_id = id, "Product deleted");
    Ok(())
}

/// Customer catalog, newest first
pub async fn list_catalog(state: &AppState) -> ServiceResult<Vec<CatalogItem>> {
    let products = db::products::find_all(&state.pool).await?;
    Ok(products.into_iter().map(CatalogItem::from).collect())
}

/// Products whose category or model name equals `term`
pub async fn list_by_category(state: &AppState, term: &str) -> ServiceResult<Vec<CatalogItem>> {
    let products = db::products::find_by_category_or_model(&state.pool, term.trim()).await?;
    Ok(products.into_iter().map(CatalogItem::from).collect())
}

/// Admin dashboard listing
pub async fn list_summaries(state: &AppState) -> ServiceResult<Vec<ProductSummary>> {
    let products = db::products::find_all(&state.pool).await?;
    Ok(products.into_iter().map(ProductSummary::from).collect())
}

pub async fn list_by_manufacturer(state: &AppState, phone: &str) -> ServiceResult<Vec<Product>> {
    Ok(db::products::find_by_manufacturer_phone(&state.pool, phone.trim()).await?)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::services::images::tests::{PNG, upload};
    use crate::services::test_support::state;

    pub(crate) fn form(model: &str, category: &str) -> ProductForm {
        let mut form = ProductForm::default();
        for (k, v) in [
            ("modelName", model),
            ("category", category),
            ("minPrice", "1000"),
            ("maxPrice", "2500.50"),
            ("manufacturerName", "Acme"),
            ("manufacturerPhone", "9876543210"),
            ("factoryName", "Acme Works"),
            ("description", "  "),
            ("unrelated", "x"),
        ] {
            form.set(k, v.to_string());
        }
        form
    }

    #[test]
    fn form_validation() {
        let data = form("Oslo", "Sofa").validate().unwrap();
        assert_eq!(data.category, Category::Sofa);
        assert_eq!(data.price_range.max, 2500.5);
        assert_eq!(data.description, None);

        let mut missing = form("Oslo", "sofa");
        missing.factory_name = None;
        assert_eq!(missing.validate().unwrap_err().code, ErrorCode::RequiredField);

        assert_eq!(
            form("Oslo", "lamp").validate().unwrap_err().code,
            ErrorCode::ProductInvalidCategory
        );

        let mut inverted = form("Oslo", "sofa");
        inverted.set("minPrice", "5000".into());
        assert_eq!(inverted.validate().unwrap_err().code, ErrorCode::ProductInvalidPrice);

        let mut nan = form("Oslo", "sofa");
        nan.set("maxPrice", "abc".into());
        assert_eq!(nan.validate().unwrap_err().code, ErrorCode::ProductInvalidPrice);
    }

    #[tokio::test]
    async fn add_list_delete() {
        let (state, _rx, _dir) = state().await;
        let product = add_product(&state, &form("Oslo", "sofa"), &[upload("a.png", PNG)])
            .await
            .unwrap();
        let file = state.images.dir().join(&product.images[0].filename);
        assert!(file.exists());

        add_product(&state, &form("bed", "other"), &[upload("b.png", PNG)])
            .await
            .unwrap();

        assert_eq!(list_catalog(&state).await.unwrap().len(), 2);
        assert_eq!(list_by_category(&state, "sofa").await.unwrap().len(), 1);
        assert_eq!(list_by_category(&state, "bed").await.unwrap().len(), 1);
        assert_eq!(list_by_manufacturer(&state, "9876543210").await.unwrap().len(), 2);

        delete_product(&state, product.id).await.unwrap();
        assert!(!file.exists());
        let ids: Vec<i64> = list_summaries(&state).await.unwrap().iter().map(|p| p.id).collect();
        assert!(!ids.contains(&product.id));

        let err = delete_product(&state, product.id).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::ProductNotFound);
    }

    #[tokio::test]
    async fn zero_images_is_rejected() {
        let (state, _rx, _dir) = state().await;
        let err = add_product(&state, &form("Oslo", "sofa"), &[]).await.unwrap_err();
        assert_eq!(AppError::from(err).code, ErrorCode::NoFileProvided);
        assert!(list_catalog(&state).await.unwrap().is_empty());
    }
}

//! Catalog backed by the hosted backend's Postgres tables.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::{CatalogError, CatalogSource, Category, CategoryIcon};
use crate::domain::aggregates::Product;
use crate::domain::value_objects::{Money, Weight};
use crate::store::Role;

const PRODUCT_COLUMNS: &str = "id, name, description, price, original_price, currency, category_id, brand, rating, \
    review_count, sold, stock, tags, specifications, images, weight_grams, created_at";

/// Only published products are visible, whether listed or fetched by id.
fn active_products_query(predicate: &str) -> String {
    format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE status = 'active'{predicate}")
}

const ROLE_QUERY: &str = "SELECT role FROM profiles WHERE id = $1";

fn role_from_column(role: Option<&str>) -> Role {
    match role.map(|r| r.trim().to_ascii_lowercase()).as_deref() {
        Some("admin") => Role::Admin,
        _ => Role::Customer,
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub original_price: Option<i64>,
    pub currency: String,
    pub category_id: Option<Uuid>,
    pub brand: Option<String>,
    pub rating: Option<f32>,
    pub review_count: i32,
    pub sold: i32,
    pub stock: i32,
    pub tags: Vec<String>,
    pub specifications: Option<serde_json::Value>,
    pub images: Vec<String>,
    pub weight_grams: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: String,
    pub name_en: Option<String>,
    pub slug: String,
    pub parent_id: Option<Uuid>,
}

fn non_negative(value: i32) -> u32 { u32::try_from(value).unwrap_or(0) }

impl TryFrom<ProductRow> for Product {
    type Error = CatalogError;

    fn try_from(row: ProductRow) -> Result<Self, Self::Error> {
        let id = row.id.to_string();
        if row.stock < 0 {
            return Err(CatalogError::Malformed { id, reason: format!("negative stock {}", row.stock) });
        }
        let specifications: BTreeMap<String, String> = match row.specifications {
            Some(serde_json::Value::Object(map)) => map
                .into_iter()
                .map(|(k, v)| match v {
                    serde_json::Value::String(s) => (k, s),
                    other => (k, other.to_string()),
                })
                .collect(),
            _ => BTreeMap::new(),
        };
        let product = Product {
            id: id.clone(),
            name: row.name,
            description: row.description.unwrap_or_default(),
            price: Money::new(Decimal::from(row.price), &row.currency),
            original_price: row.original_price.map(|p| Money::new(Decimal::from(p), &row.currency)),
            category: row.category_id.map(|c| c.to_string()).unwrap_or_default(),
            brand: row.brand.unwrap_or_default(),
            rating: row.rating.unwrap_or(0.0),
            review_count: non_negative(row.review_count),
            sold: non_negative(row.sold),
            stock: non_negative(row.stock),
            tags: row.tags,
            specifications,
            images: row.images,
            weight: row.weight_grams.map(|g| Weight::grams(non_negative(g))),
            created_at: row.created_at,
        };
        product.validate().map_err(|e| CatalogError::Malformed { id, reason: e.to_string() })?;
        Ok(product)
    }
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id.to_string(),
            name_en: row.name_en.unwrap_or_else(|| row.name.clone()),
            name: row.name,
            icon: CategoryIcon::from_slug(&row.slug),
            slug: row.slug,
            parent_id: row.parent_id.map(|p| p.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PostgresCatalog {
    pool: PgPool,
}

impl PostgresCatalog {
    pub fn new(pool: PgPool) -> Self { Self { pool } }

    pub async fn connect(database_url: &str) -> Result<Self, CatalogError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(Duration::from_secs(5))
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &PgPool { &self.pool }
}

/// Converts rows, dropping (and logging) the ones that break catalog invariants.
fn collect_valid(rows: Vec<ProductRow>) -> Vec<Product> {
    rows.into_iter()
        .filter_map(|row| match Product::try_from(row) {
            Ok(p) => Some(p),
            Err(e) => {
                warn!(error = %e, "skipping catalog row");
                None
            }
        })
        .collect()
}

#[async_trait]
impl CatalogSource for PostgresCatalog {
    fn name(&self) -> &'static str { "postgres" }

    #[instrument(skip(self), err)]
    async fn products(&self) -> Result<Vec<Product>, CatalogError> {
        let sql = active_products_query(" ORDER BY created_at DESC");
        let rows = sqlx::query_as::<_, ProductRow>(&sql).fetch_all(&self.pool).await?;
        Ok(collect_valid(rows))
    }

    #[instrument(skip(self), err)]
    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        let Ok(uuid) = Uuid::parse_str(id) else { return Ok(None) };
        let sql = active_products_query(" AND id = $1");
        let row = sqlx::query_as::<_, ProductRow>(&sql).bind(uuid).fetch_optional(&self.pool).await?;
        row.map(Product::try_from).transpose()
    }

    #[instrument(skip(self), err)]
    async fn categories(&self) -> Result<Vec<Category>, CatalogError> {
        let rows = sqlx::query_as::<_, CategoryRow>("SELECT id, name, name_en, slug, parent_id FROM categories ORDER BY name")
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    #[instrument(skip(self), err)]
    async fn role_for(&self, user_id: &str) -> Result<Role, CatalogError> {
        let Ok(uuid) = Uuid::parse_str(user_id) else { return Ok(Role::Customer) };
        let role = sqlx::query_scalar::<_, Option<String>>(ROLE_QUERY).bind(uuid).fetch_optional(&self.pool).await?;
        Ok(role_from_column(role.flatten().as_deref()))
    }

    async fn ping(&self) -> Result<(), CatalogError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> ProductRow {
        ProductRow {
            id: Uuid::nil(), name: "Loa JBL".into(), description: None, price: 2_490_000, original_price: Some(2_990_000),
            currency: "VND".into(), category_id: None, brand: Some("JBL".into()), rating: Some(4.6), review_count: 10,
            sold: 5, stock: 3, tags: vec!["loa".into()], specifications: Some(serde_json::json!({"Pin": "12 giờ", "IP": 67})),
            images: vec![], weight_grams: Some(550), created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_mapping() {
        let p = Product::try_from(row()).unwrap();
        assert!(p.is_on_sale());
        assert_eq!(p.specifications.get("Pin").map(String::as_str), Some("12 giờ"));
        assert_eq!(p.specifications.get("IP").map(String::as_str), Some("67"));
        assert_eq!(p.weight, Some(Weight::grams(550)));
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let negative = ProductRow { stock: -1, ..row() };
        let inverted = ProductRow { price: 3_000_000, ..row() };
        assert!(Product::try_from(negative.clone()).is_err());
        assert_eq!(collect_valid(vec![negative, inverted, row()]).len(), 1);
    }

    #[test]
    fn test_queries_only_see_active_products() {
        for sql in [active_products_query(" ORDER BY created_at DESC"), active_products_query(" AND id = $1")] {
            assert!(sql.contains("WHERE status = 'active'"), "{sql}");
        }
        assert!(active_products_query(" AND id = $1").ends_with("WHERE status = 'active' AND id = $1"));
    }

    #[test]
    fn test_role_column() {
        assert_eq!(role_from_column(Some("admin")), Role::Admin);
        assert_eq!(role_from_column(Some(" Admin ")), Role::Admin);
        assert_eq!(role_from_column(Some("customer")), Role::Customer);
        assert_eq!(role_from_column(None), Role::Customer);
    }

    #[test]
    fn test_category_mapping() {
        let c = Category::from(CategoryRow { id: Uuid::nil(), name: "Âm thanh".into(), name_en: None, slug: "audio".into(), parent_id: None });
        assert_eq!(c.icon, CategoryIcon::Audio);
        assert_eq!(c.name_en, "Âm thanh");
    }
}

//! Catalog data sources.
//!
//! The storefront reads products and categories through [`CatalogSource`].
//! Which implementation backs it is decided once at startup by [`connect`].

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{Config, DataSourceKind};
use crate::domain::aggregates::Product;
use crate::store::Role;

pub mod fixtures;
pub mod postgres;

pub use fixtures::FixtureCatalog;
pub use postgres::PostgresCatalog;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog backend unavailable: {0}")]
    Unavailable(String),
    #[error("malformed catalog row {id}: {reason}")]
    Malformed { id: String, reason: String },
}

impl From<sqlx::Error> for CatalogError {
    fn from(e: sqlx::Error) -> Self { Self::Unavailable(e.to_string()) }
}

/// Icon shown next to a category. Resolved from the slug instead of looking
/// components up by name at render time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryIcon {
    Phone,
    Laptop,
    Tablet,
    Audio,
    Watch,
    Accessory,
    Camera,
    Home,
    #[default]
    Generic,
}

impl CategoryIcon {
    pub fn from_slug(slug: &str) -> Self {
        match slug.trim().to_lowercase().as_str() {
            "phone" | "phones" | "dien-thoai" | "smartphone" => Self::Phone,
            "laptop" | "laptops" | "may-tinh" => Self::Laptop,
            "tablet" | "tablets" | "may-tinh-bang" => Self::Tablet,
            "audio" | "headphones" | "tai-nghe" | "loa" => Self::Audio,
            "watch" | "smartwatch" | "dong-ho" => Self::Watch,
            "accessory" | "accessories" | "phu-kien" => Self::Accessory,
            "camera" | "cameras" | "may-anh" => Self::Camera,
            "home" | "smart-home" | "nha-thong-minh" => Self::Home,
            _ => Self::Generic,
        }
    }

    pub fn icon_name(&self) -> &'static str {
        match self {
            Self::Phone => "smartphone",
            Self::Laptop => "laptop",
            Self::Tablet => "tablet",
            Self::Audio => "headphones",
            Self::Watch => "watch",
            Self::Accessory => "cable",
            Self::Camera => "camera",
            Self::Home => "home",
            Self::Generic => "package",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub name_en: String,
    pub slug: String,
    pub icon: CategoryIcon,
    pub parent_id: Option<String>,
}

impl Category {
    pub fn new(id: &str, name: &str, name_en: &str, slug: &str) -> Self {
        Self {
            id: id.to_string(), name: name.to_string(), name_en: name_en.to_string(), slug: slug.to_string(),
            icon: CategoryIcon::from_slug(slug), parent_id: None,
        }
    }
}

#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Short name for logs and health output.
    fn name(&self) -> &'static str;

    /// Full catalog snapshot.
    async fn products(&self) -> Result<Vec<Product>, CatalogError>;

    async fn product(&self, id: &str) -> Result<Option<Product>, CatalogError> {
        Ok(self.products().await?.into_iter().find(|p| p.id == id))
    }

    async fn categories(&self) -> Result<Vec<Category>, CatalogError>;

    /// Role the backend grants `user_id`. Unknown users are customers.
    async fn role_for(&self, user_id: &str) -> Result<Role, CatalogError>;

    async fn ping(&self) -> Result<(), CatalogError>;
}

/// Builds the configured data source.
pub async fn connect(config: &Config) -> Result<Arc<dyn CatalogSource>, CatalogError> {
    match &config.data_source {
        DataSourceKind::Fixture => Ok(Arc::new(FixtureCatalog::sample().with_admins(config.fixture_admins.clone()))),
        DataSourceKind::Postgres { database_url } => Ok(Arc::new(PostgresCatalog::connect(database_url).await?)),
    }
}

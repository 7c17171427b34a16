//! HTTP surface: a thin axum layer over the search engine, shipping
//! calculator and client-state store.

use axum::routing::{get, post, put};
use axum::Router;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::{self, CatalogSource};
use crate::config::Config;
use crate::notify::EventPublisher;
use crate::search::{Debouncer, SearchEngine, Suggester, SUGGESTION_DEBOUNCE};
use crate::shipping::ShippingCalculator;
use crate::store::{open_storage, AppStore};

pub mod error;
pub mod handlers;

pub use error::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogSource>,
    pub store: Arc<Mutex<AppStore>>,
    pub engine: Arc<SearchEngine>,
    pub shipping: Arc<ShippingCalculator>,
    pub events: EventPublisher,
    suggest_debounce: Duration,
    debouncers: Arc<Mutex<HashMap<String, Debouncer>>>,
}

impl AppState {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        store: AppStore,
        engine: SearchEngine,
        shipping: ShippingCalculator,
        events: EventPublisher,
    ) -> Self {
        Self {
            catalog, store: Arc::new(Mutex::new(store)), engine: Arc::new(engine), shipping: Arc::new(shipping), events,
            suggest_debounce: SUGGESTION_DEBOUNCE, debouncers: Arc::default(),
        }
    }

    pub fn with_suggestion_debounce(mut self, delay: Duration) -> Self { self.suggest_debounce = delay; self }

    /// The session's suggestion debouncer; all requests of one session share it.
    pub async fn debouncer(&self, session: &str) -> Debouncer {
        self.debouncers.lock().await
            .entry(session.to_string())
            .or_insert_with(|| Debouncer::new(self.suggest_debounce))
            .clone()
    }

    /// Wires every collaborator from configuration.
    pub async fn from_config(config: &Config) -> crate::Result<Self> {
        let catalog = catalog::connect(config).await?;
        let store = AppStore::new(open_storage(&config.state)?);
        let engine = SearchEngine::new(Suggester::default().with_limit(config.suggestion_limit), config.search_page_size);
        let shipping = ShippingCalculator::new(&config.shipping_origin, config.free_shipping_threshold.clone(), config.default_unit_weight)?;
        let events = EventPublisher::connect(config.nats_url.as_deref()).await;
        Ok(Self::new(catalog, store, engine, shipping, events).with_suggestion_debounce(config.suggestion_debounce))
    }
}

pub fn router(state: AppState) -> Router {
    use handlers::*;

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/products", get(search))
        .route("/api/v1/products/:id", get(get_product))
        .route("/api/v1/categories", get(list_categories))
        .route("/api/v1/search", get(search))
        .route("/api/v1/search/fuzzy", get(fuzzy))
        .route("/api/v1/search/suggestions", get(suggestions))
        .route("/api/v1/cart/:session", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items/:product_id", put(update_cart_item).delete(remove_cart_item))
        .route("/api/v1/shipping/:session/quotes", post(shipping_quotes))
        .route("/api/v1/checkout/:session", post(checkout))
        .route("/api/v1/orders/:session", get(list_orders))
        .route("/api/v1/session/:session", get(get_session).put(put_session).delete(delete_session))
        .route("/api/v1/wishlist/:session", get(get_wishlist))
        .route("/api/v1/wishlist/:session/:product_id", post(toggle_wishlist))
        .route("/api/v1/admin/:session/dashboard", get(admin_dashboard))
        .route("/api/v1/admin/:session/products", get(admin_products))
        .route("/api/v1/admin/:session/orders/:order_id/status", put(admin_update_order_status))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CorsLayer::permissive()))
        .with_state(state)
}

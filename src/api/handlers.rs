//! Route handlers. Every handler validates its session id, runs the domain
//! operation under the store lock, releases the lock, then publishes events.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::error::ApiError;
use super::AppState;
use crate::analytics::{DashboardStats, DEFAULT_LOW_STOCK_THRESHOLD};
use crate::domain::aggregates::{Address, Cart, CartItem, Order, OrderStatus, PlaceOrder};
use crate::domain::events::{CartEvent, DomainEvent};
use crate::domain::value_objects::Money;
use crate::i18n::{no_results_hints, Locale};
use crate::search::{fuzzy_search, lenient_count, ScoredProduct, SearchParams, SearchResult};
use crate::shipping::{CarrierCode, Destination, ShippingOptions};
use crate::store::UserSession;
use crate::StorefrontError;

type ApiResult<T> = Result<T, ApiError>;

const MAX_FUZZY_RESULTS: usize = 50;

fn valid_session(raw: &str) -> ApiResult<&str> {
    let ok = (1..=64).contains(&raw.len()) && raw.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if ok { Ok(raw) } else { Err(ApiError::bad_session()) }
}

fn locale(headers: &HeaderMap) -> Locale {
    headers.get(header::ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok()).map(Locale::from_accept_language).unwrap_or_default()
}

/// Resolves the signed-in user and asks the catalog backend for their role,
/// so revoking admin rights takes effect without signing out.
async fn require_admin(s: &AppState, session: &str) -> ApiResult<UserSession> {
    let Some(mut user) = s.store.lock().await.user(session)?.cloned() else {
        return Err(ApiError::session_required());
    };
    user.role = s.catalog.role_for(&user.user_id).await.map_err(StorefrontError::from)?;
    if user.is_admin() { Ok(user) } else { Err(ApiError::forbidden()) }
}

// ---- health -------------------------------------------------------------

pub async fn health(State(s): State<AppState>) -> impl IntoResponse {
    let source = s.catalog.name();
    match s.catalog.ping().await {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({"status": "healthy", "service": "vnshop", "data_source": source}))),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({"status": "degraded", "service": "vnshop", "data_source": source, "error": e.to_string()})),
        ),
    }
}

// ---- catalog & search ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    #[serde(flatten)]
    pub result: SearchResult,
    pub sort_label: &'static str,
    /// Present only when nothing matched.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub hints: Vec<&'static str>,
}

async fn run_search(s: &AppState, params: SearchParams, locale: Locale) -> ApiResult<SearchResponse> {
    let products = s.catalog.products().await.map_err(StorefrontError::from)?;
    let filters = params.into_filters(s.engine.default_limit());
    let result = s.engine.search(&products, &filters);
    let hints = if result.is_empty() { no_results_hints(locale).to_vec() } else { vec![] };
    Ok(SearchResponse { sort_label: result.filters.sort.label(locale), hints, result })
}

pub async fn search(
    State(s): State<AppState>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let Query(params) = params?;
    Ok(Json(run_search(&s, params, locale(&headers)).await?))
}

pub async fn get_product(State(s): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<crate::domain::aggregates::Product>> {
    let product = s.catalog.product(&id).await.map_err(StorefrontError::from)?;
    product.map(Json).ok_or_else(|| StorefrontError::ProductNotFound(id).into())
}

pub async fn list_categories(State(s): State<AppState>) -> ApiResult<impl IntoResponse> {
    let categories = s.catalog.categories().await.map_err(StorefrontError::from)?;
    let body: Vec<serde_json::Value> = categories.iter().map(|c| serde_json::json!({
        "id": c.id, "name": c.name, "name_en": c.name_en, "slug": c.slug,
        "icon": c.icon, "icon_name": c.icon.icon_name(), "parent_id": c.parent_id,
    })).collect();
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct FuzzyParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<String>,
}

pub async fn fuzzy(State(s): State<AppState>, params: Result<Query<FuzzyParams>, QueryRejection>) -> ApiResult<Json<Vec<ScoredProduct>>> {
    let Query(p) = params?;
    let products = s.catalog.products().await.map_err(StorefrontError::from)?;
    let limit = lenient_count(p.limit.as_deref()).unwrap_or(s.engine.default_limit()) as usize;
    let limit = limit.clamp(1, MAX_FUZZY_RESULTS);
    Ok(Json(fuzzy_search(&products, &p.q, limit)))
}

#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub q: String,
    /// Typing clients send their session so a burst of keystrokes is answered once.
    pub session: Option<String>,
}

pub async fn suggestions(
    State(s): State<AppState>,
    params: Result<Query<SuggestParams>, QueryRejection>,
) -> ApiResult<Json<serde_json::Value>> {
    let Query(p) = params?;
    let query = p.q.trim();
    let Some(session) = p.session.as_deref() else {
        return Ok(Json(serde_json::json!({ "query": query, "suggestions": s.engine.suggester().suggest(query) })));
    };
    let debouncer = s.debouncer(valid_session(session)?).await;
    // A newer request from the same session answers instead of this one.
    let body = match debouncer.run(|| s.engine.suggester().suggest(query)).await {
        Some(suggestions) => serde_json::json!({ "query": query, "suggestions": suggestions, "superseded": false }),
        None => serde_json::json!({ "query": query, "suggestions": [], "superseded": true }),
    };
    Ok(Json(body))
}

// ---- cart ---------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct CartView {
    pub items: Vec<CartItem>,
    pub line_count: usize,
    pub item_count: u32,
    pub subtotal: Money,
    pub free_shipping: bool,
    /// How much more to spend before shipping is waived.
    pub free_shipping_remaining: Money,
}

impl CartView {
    fn new(cart: &Cart, s: &AppState) -> Self {
        let subtotal = cart.subtotal();
        let threshold = s.shipping.free_shipping_threshold();
        let remaining = (threshold.amount() - subtotal.amount()).max(rust_decimal::Decimal::ZERO);
        Self {
            items: cart.items().to_vec(),
            line_count: cart.line_count(),
            item_count: cart.item_count(),
            free_shipping: s.shipping.qualifies_for_free_shipping(&subtotal),
            free_shipping_remaining: Money::new(remaining, subtotal.currency()),
            subtotal,
        }
    }
}

pub async fn get_cart(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<CartView>> {
    let session = valid_session(&session)?;
    let mut store = s.store.lock().await;
    let cart = store.cart(session)?;
    Ok(Json(CartView::new(cart, &s)))
}

fn one() -> u32 { 1 }

#[derive(Debug, Deserialize, Validate)]
pub struct AddToCartRequest {
    #[validate(length(min = 1, max = 64))]
    pub product_id: String,
    #[serde(default = "one")]
    #[validate(range(min = 1, max = 99))]
    pub quantity: u32,
}

pub async fn add_to_cart(
    State(s): State<AppState>,
    Path(session): Path<String>,
    payload: Result<Json<AddToCartRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CartView>)> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    r.validate()?;
    let product = s.catalog.product(&r.product_id).await.map_err(StorefrontError::from)?
        .ok_or_else(|| StorefrontError::ProductNotFound(r.product_id.clone()))?;
    let item = CartItem::from_product(&product, r.quantity);
    let (_, cart) = s.store.lock().await.update_cart(session, |c| c.add_in_stock(item, product.stock))?;
    s.events.publish(&DomainEvent::Cart(CartEvent::ItemAdded {
        session_id: session.to_string(), product_id: product.id.clone(), quantity: r.quantity,
    })).await;
    Ok((StatusCode::CREATED, Json(CartView::new(&cart, &s))))
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuantityRequest {
    #[validate(range(max = 99))]
    pub quantity: u32,
}

pub async fn update_cart_item(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
    payload: Result<Json<UpdateQuantityRequest>, JsonRejection>,
) -> ApiResult<Json<CartView>> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    r.validate()?;
    // Delisted products can still be removed with quantity 0.
    let stock = s.catalog.product(&product_id).await.map_err(StorefrontError::from)?.map_or(0, |p| p.stock);
    let (_, cart) = s.store.lock().await.update_cart(session, |c| c.set_in_stock(&product_id, r.quantity, stock))?;
    Ok(Json(CartView::new(&cart, &s)))
}

pub async fn remove_cart_item(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
) -> ApiResult<Json<CartView>> {
    let session = valid_session(&session)?;
    let (_, cart) = s.store.lock().await.update_cart(session, |c| c.remove_item(&product_id))?;
    s.events.publish(&DomainEvent::Cart(CartEvent::ItemRemoved { session_id: session.to_string(), product_id })).await;
    Ok(Json(CartView::new(&cart, &s)))
}

pub async fn clear_cart(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<StatusCode> {
    let session = valid_session(&session)?;
    s.store.lock().await.clear_cart(session)?;
    s.events.publish(&DomainEvent::Cart(CartEvent::Cleared { session_id: session.to_string() })).await;
    Ok(StatusCode::NO_CONTENT)
}

// ---- shipping & checkout ------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct QuoteRequest {
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub district: String,
}

pub async fn shipping_quotes(
    State(s): State<AppState>,
    Path(session): Path<String>,
    payload: Result<Json<QuoteRequest>, JsonRejection>,
) -> ApiResult<Json<ShippingOptions>> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    let cart = s.store.lock().await.cart(session)?.clone();
    let options = s.shipping
        .quote(cart.items(), &cart.subtotal(), &Destination::new(&r.province, &r.district))
        .map_err(StorefrontError::from)?;
    Ok(Json(options))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckoutRequest {
    /// Falls back to the signed-in user's email.
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub recipient: String,
    #[validate(length(min = 9, max = 15))]
    pub phone: String,
    #[validate(length(min = 1, max = 200))]
    pub street: String,
    #[serde(default)]
    pub ward: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub district: String,
    #[validate(length(min = 1, max = 100))]
    pub province: String,
    #[serde(default)]
    pub carrier: Option<CarrierCode>,
    #[validate(length(max = 500))]
    pub note: Option<String>,
}

pub async fn checkout(
    State(s): State<AppState>,
    Path(session): Path<String>,
    payload: Result<Json<CheckoutRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    r.validate()?;
    if !r.phone.chars().all(|c| c.is_ascii_digit() || c == '+' || c == ' ') {
        return Err(ApiError::invalid_input("phone must contain digits only"));
    }

    let (order, events) = {
        let mut store = s.store.lock().await;
        let email = match (&r.email, store.user(session)?) {
            (Some(email), _) => email.clone(),
            (None, Some(user)) => user.email.clone(),
            (None, None) => return Err(ApiError::invalid_input("email is required")),
        };
        let cart = store.cart(session)?.clone();
        if cart.is_empty() {
            return Err(StorefrontError::from(crate::domain::aggregates::OrderError::NoItems).into());
        }
        let address = Address {
            recipient: r.recipient.trim().to_string(), phone: r.phone.trim().to_string(), street: r.street.trim().to_string(),
            ward: r.ward.clone().filter(|w| !w.trim().is_empty()), district: r.district.trim().to_string(), province: r.province.trim().to_string(),
        };
        let options = s.shipping.quote(cart.items(), &cart.subtotal(), &address.destination()).map_err(StorefrontError::from)?;
        let quote = options.select(r.carrier).map_err(StorefrontError::from)?;
        let mut order = Order::place(PlaceOrder {
            session_id: session, email: &email, cart: &cart, address: address.clone(),
            quote, shipping_fee: options.effective_fee(quote), note: r.note.clone(),
        }).map_err(StorefrontError::from)?;
        order.confirm(Utc::now()).map_err(StorefrontError::from)?;
        let mut events = order.take_events();
        store.record_order(session, order.clone())?;
        events.push(DomainEvent::Cart(CartEvent::Cleared { session_id: session.to_string() }));
        (order, events)
    };

    tracing::info!(order_number = order.order_number(), total = %order.total(), carrier = %order.carrier(), "order placed");
    s.events.publish_all(events).await;
    Ok((StatusCode::CREATED, Json(order)))
}

pub async fn list_orders(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<Vec<Order>>> {
    let session = valid_session(&session)?;
    Ok(Json(s.store.lock().await.orders_for(session)?))
}

// ---- user session -------------------------------------------------------

pub async fn get_session(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<Option<UserSession>>> {
    let session = valid_session(&session)?;
    Ok(Json(s.store.lock().await.user(session)?.cloned()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignInRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(max = 100))]
    pub display_name: Option<String>,
}

pub async fn put_session(
    State(s): State<AppState>,
    Path(session): Path<String>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> ApiResult<Json<UserSession>> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    r.validate()?;
    let role = s.catalog.role_for(&r.user_id).await.map_err(StorefrontError::from)?;
    let user = UserSession { user_id: r.user_id, email: r.email, display_name: r.display_name, role };
    s.store.lock().await.sign_in(session, user.clone())?;
    Ok(Json(user))
}

pub async fn delete_session(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<StatusCode> {
    let session = valid_session(&session)?;
    s.store.lock().await.sign_out(session)?;
    Ok(StatusCode::NO_CONTENT)
}

// ---- wishlist -----------------------------------------------------------

pub async fn get_wishlist(State(s): State<AppState>, Path(session): Path<String>) -> ApiResult<Json<Vec<crate::domain::aggregates::Product>>> {
    let session = valid_session(&session)?;
    let ids = s.store.lock().await.wishlist(session)?.product_ids().to_vec();
    let products = s.catalog.products().await.map_err(StorefrontError::from)?;
    let listed = ids.iter().filter_map(|id| products.iter().find(|p| &p.id == id).cloned()).collect();
    Ok(Json(listed))
}

pub async fn toggle_wishlist(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, String)>,
) -> ApiResult<impl IntoResponse> {
    let session = valid_session(&session)?;
    if s.catalog.product(&product_id).await.map_err(StorefrontError::from)?.is_none() {
        return Err(StorefrontError::ProductNotFound(product_id).into());
    }
    let wishlisted = s.store.lock().await.toggle_wishlist(session, &product_id)?;
    Ok(Json(serde_json::json!({ "product_id": product_id, "wishlisted": wishlisted })))
}

// ---- admin --------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DashboardParams {
    pub low_stock: Option<String>,
}

pub async fn admin_dashboard(
    State(s): State<AppState>,
    Path(session): Path<String>,
    params: Result<Query<DashboardParams>, QueryRejection>,
) -> ApiResult<Json<DashboardStats>> {
    let session = valid_session(&session)?;
    let Query(p) = params?;
    require_admin(&s, session).await?;
    let orders = s.store.lock().await.orders()?.to_vec();
    let products = s.catalog.products().await.map_err(StorefrontError::from)?;
    Ok(Json(DashboardStats::compute(&orders, &products, lenient_count(p.low_stock.as_deref()).unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD))))
}

pub async fn admin_products(
    State(s): State<AppState>,
    Path(session): Path<String>,
    headers: HeaderMap,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResponse>> {
    let session = valid_session(&session)?;
    let Query(params) = params?;
    require_admin(&s, session).await?;
    Ok(Json(run_search(&s, params, locale(&headers)).await?))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

pub async fn admin_update_order_status(
    State(s): State<AppState>,
    Path((session, order_id)): Path<(String, Uuid)>,
    payload: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> ApiResult<Json<Order>> {
    let session = valid_session(&session)?;
    let Json(r) = payload?;
    let admin = require_admin(&s, session).await?;
    tracing::info!(admin = %admin.user_id, %order_id, status = r.status.as_str(), "updating order status");
    let (events, order) = s.store.lock().await.update_order(order_id, |o| {
        o.transition_to(r.status, Utc::now())?;
        Ok(o.take_events())
    })?;
    s.events.publish_all(events).await;
    Ok(Json(order))
}

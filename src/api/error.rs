//! JSON error responses shared by every handler.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tracing::error;

use crate::catalog::CatalogError;
use crate::domain::aggregates::{CartError, OrderError};
use crate::i18n::{Locale, Message};
use crate::shipping::ShippingError;
use crate::StorefrontError;

/// Error body: `{ error, message, message_en, detail? }`; `message` is Vietnamese.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: Message,
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: Message) -> Self {
        Self { status, code, message, detail: None }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self { self.detail = Some(detail.into()); self }

    pub fn invalid_input(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "invalid_input", Message::InvalidInput).with_detail(detail)
    }

    pub fn bad_session() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid_session", Message::InvalidInput)
    }

    pub fn session_required() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "session_required", Message::SessionRequired)
    }

    pub fn forbidden() -> Self { Self::new(StatusCode::FORBIDDEN, "forbidden", Message::Forbidden) }

    pub fn status(&self) -> StatusCode { self.status }
    pub fn code(&self) -> &'static str { self.code }
}

impl From<StorefrontError> for ApiError {
    fn from(err: StorefrontError) -> Self {
        use StatusCode as S;
        let api = match &err {
            StorefrontError::ProductNotFound(_) => Self::new(S::NOT_FOUND, "product_not_found", Message::ProductNotFound),
            StorefrontError::OrderNotFound(_) => Self::new(S::NOT_FOUND, "order_not_found", Message::OrderNotFound),
            StorefrontError::Cart(CartError::ItemNotFound) => Self::new(S::NOT_FOUND, "cart_item_not_found", Message::CartItemNotFound),
            StorefrontError::Cart(CartError::InvalidQuantity) | StorefrontError::Cart(CartError::QuantityLimit(_)) => {
                Self::new(S::UNPROCESSABLE_ENTITY, "invalid_quantity", Message::InvalidQuantity)
            }
            StorefrontError::Cart(CartError::OutOfStock { .. }) => Self::new(S::CONFLICT, "out_of_stock", Message::OutOfStock),
            StorefrontError::Order(OrderError::NoItems) => Self::new(S::UNPROCESSABLE_ENTITY, "empty_cart", Message::EmptyCart),
            StorefrontError::Order(OrderError::InvalidTransition { .. }) => {
                Self::new(S::CONFLICT, "invalid_transition", Message::OrderTransitionNotAllowed)
            }
            StorefrontError::Shipping(ShippingError::UnknownDestination(_)) => {
                Self::new(S::UNPROCESSABLE_ENTITY, "unknown_destination", Message::UnknownDestination)
            }
            StorefrontError::Shipping(ShippingError::NoQuotes) => {
                Self::new(S::UNPROCESSABLE_ENTITY, "missing_destination", Message::MissingDestination)
            }
            StorefrontError::Shipping(ShippingError::CarrierNotOffered(_)) => {
                Self::new(S::UNPROCESSABLE_ENTITY, "carrier_unavailable", Message::CarrierUnavailable)
            }
            StorefrontError::Cart(CartError::CurrencyMismatch)
            | StorefrontError::Order(OrderError::CurrencyMismatch)
            | StorefrontError::Money(_)
            | StorefrontError::Product(_) => Self::new(S::UNPROCESSABLE_ENTITY, "invalid_input", Message::InvalidInput),
            StorefrontError::Catalog(CatalogError::Unavailable(_)) | StorefrontError::Catalog(CatalogError::Malformed { .. }) => {
                Self::new(S::SERVICE_UNAVAILABLE, "backend_unavailable", Message::BackendUnavailable)
            }
            StorefrontError::Shipping(ShippingError::UnknownOrigin(_))
            | StorefrontError::Storage(_)
            | StorefrontError::Config(_) => Self::new(S::INTERNAL_SERVER_ERROR, "internal_error", Message::Unexpected),
        };
        if api.status.is_server_error() {
            error!(error = %err, code = api.code, "request failed");
        }
        api.with_detail(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self { Self::invalid_input(rejection.body_text()) }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self { Self::invalid_input(rejection.body_text()) }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self { Self::invalid_input(errors.to_string()) }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({
            "error": self.code,
            "message": self.message.text(Locale::Vi),
            "message_en": self.message.text(Locale::En),
        });
        // Internal failures keep their cause in the logs only.
        if let (Some(detail), false) = (self.detail, self.status.is_server_error()) {
            body["detail"] = json!(detail);
        }
        (self.status, axum::Json(body)).into_response()
    }
}

//! Vietnamese-first message catalog.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    /// Picks the first supported language of an `Accept-Language` header, Vietnamese otherwise.
    pub fn from_accept_language(header: &str) -> Self {
        header
            .split(',')
            .filter_map(|part| part.split(';').next())
            .map(|tag| tag.trim().to_ascii_lowercase())
            .find_map(|tag| match tag.split('-').next() {
                Some("vi") => Some(Self::Vi),
                Some("en") => Some(Self::En),
                _ => None,
            })
            .unwrap_or_default()
    }
}

/// User-facing messages. Every variant has both translations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Message {
    ProductNotFound,
    OrderNotFound,
    CartItemNotFound,
    EmptyCart,
    InvalidQuantity,
    OutOfStock,
    InvalidInput,
    MissingDestination,
    UnknownDestination,
    CarrierUnavailable,
    OrderTransitionNotAllowed,
    SessionRequired,
    Forbidden,
    BackendUnavailable,
    Unexpected,
}

impl Message {
    pub fn text(&self, locale: Locale) -> &'static str {
        use Message::*;
        match (self, locale) {
            (ProductNotFound, Locale::Vi) => "Không tìm thấy sản phẩm",
            (ProductNotFound, Locale::En) => "Product not found",
            (OrderNotFound, Locale::Vi) => "Không tìm thấy đơn hàng",
            (OrderNotFound, Locale::En) => "Order not found",
            (CartItemNotFound, Locale::Vi) => "Sản phẩm không có trong giỏ hàng",
            (CartItemNotFound, Locale::En) => "Item is not in the cart",
            (EmptyCart, Locale::Vi) => "Giỏ hàng đang trống",
            (EmptyCart, Locale::En) => "Your cart is empty",
            (InvalidQuantity, Locale::Vi) => "Số lượng không hợp lệ",
            (InvalidQuantity, Locale::En) => "Invalid quantity",
            (OutOfStock, Locale::Vi) => "Sản phẩm không đủ số lượng trong kho",
            (OutOfStock, Locale::En) => "Not enough stock for this item",
            (InvalidInput, Locale::Vi) => "Thông tin không hợp lệ, vui lòng kiểm tra lại",
            (InvalidInput, Locale::En) => "Invalid input, please check the form",
            (MissingDestination, Locale::Vi) => "Vui lòng chọn tỉnh/thành phố và quận/huyện để xem phí vận chuyển",
            (MissingDestination, Locale::En) => "Choose a province and district to see shipping options",
            (UnknownDestination, Locale::Vi) => "Chưa hỗ trợ giao hàng đến địa chỉ này",
            (UnknownDestination, Locale::En) => "We cannot ship to this address yet",
            (CarrierUnavailable, Locale::Vi) => "Đơn vị vận chuyển không khả dụng",
            (CarrierUnavailable, Locale::En) => "This carrier is not available",
            (OrderTransitionNotAllowed, Locale::Vi) => "Không thể cập nhật trạng thái đơn hàng",
            (OrderTransitionNotAllowed, Locale::En) => "The order status cannot be changed",
            (SessionRequired, Locale::Vi) => "Vui lòng đăng nhập để tiếp tục",
            (SessionRequired, Locale::En) => "Please sign in to continue",
            (Forbidden, Locale::Vi) => "Bạn không có quyền truy cập",
            (Forbidden, Locale::En) => "You do not have access",
            (BackendUnavailable, Locale::Vi) => "Không thể kết nối máy chủ, vui lòng thử lại",
            (BackendUnavailable, Locale::En) => "Could not reach the server, please try again",
            (Unexpected, Locale::Vi) => "Đã có lỗi xảy ra, vui lòng thử lại",
            (Unexpected, Locale::En) => "Something went wrong, please try again",
        }
    }
}

/// Actionable hints for an empty search result.
pub fn no_results_hints(locale: Locale) -> &'static [&'static str] {
    match locale {
        Locale::Vi => &[
            "Kiểm tra lại chính tả từ khóa",
            "Thử dùng từ khóa ngắn gọn hoặc phổ biến hơn",
            "Bỏ bớt bộ lọc đang áp dụng",
        ],
        Locale::En => &[
            "Check the spelling of your search",
            "Try shorter or more general keywords",
            "Remove some of the active filters",
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_language() {
        assert_eq!(Locale::from_accept_language("en-US,en;q=0.9,vi;q=0.8"), Locale::En);
        assert_eq!(Locale::from_accept_language("vi-VN"), Locale::Vi);
        assert_eq!(Locale::from_accept_language("fr-FR, de"), Locale::Vi);
        assert_eq!(Locale::from_accept_language(""), Locale::Vi);
    }

    #[test]
    fn test_hints_are_bilingual() {
        assert_eq!(no_results_hints(Locale::Vi).len(), no_results_hints(Locale::En).len());
        assert_eq!(Message::EmptyCart.text(Locale::En), "Your cart is empty");
    }
}

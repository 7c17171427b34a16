//! Explicit client-state store.
//!
//! Carts, signed-in users and wishlists are keyed by client session id, and
//! orders are kept in one list for the back-office. State is read lazily from
//! [`StateStorage`] and every mutation is applied to a copy, persisted, and
//! only then committed in memory, so a failed write leaves state untouched.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::StateBackend;
use crate::domain::aggregates::{Cart, CartError, Order, Wishlist};
use crate::{Result, StorefrontError};

pub mod storage;

pub use storage::{FileStorage, MemoryStorage, StateStorage, StorageError};

const ORDERS_KEY: &str = "vnshop.orders";

fn cart_key(session: &str) -> String { format!("vnshop.cart.{session}") }
fn user_key(session: &str) -> String { format!("vnshop.user.{session}") }
fn wishlist_key(session: &str) -> String { format!("vnshop.wishlist.{session}") }

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

/// Minimal mirror of the hosted backend's auth session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSession {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub role: Role,
}

impl UserSession {
    pub fn is_admin(&self) -> bool { self.role == Role::Admin }
}

pub fn open_storage(backend: &StateBackend) -> std::result::Result<Arc<dyn StateStorage>, StorageError> {
    Ok(match backend {
        StateBackend::Memory => Arc::new(MemoryStorage::new()),
        StateBackend::Directory(dir) => Arc::new(FileStorage::open(dir)?),
    })
}

pub struct AppStore {
    storage: Arc<dyn StateStorage>,
    carts: HashMap<String, Cart>,
    users: HashMap<String, Option<UserSession>>,
    wishlists: HashMap<String, Wishlist>,
    orders: Option<Vec<Order>>,
}

impl AppStore {
    pub fn new(storage: Arc<dyn StateStorage>) -> Self {
        Self { storage, carts: HashMap::new(), users: HashMap::new(), wishlists: HashMap::new(), orders: None }
    }

    pub fn in_memory() -> Self { Self::new(Arc::new(MemoryStorage::new())) }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.storage.load(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw).map_err(StorageError::from)?)),
            None => Ok(None),
        }
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value).map_err(StorageError::from)?;
        self.storage.save(key, &raw)?;
        debug!(key, bytes = raw.len(), "persisted client state");
        Ok(())
    }

    // ---- cart ------------------------------------------------------------

    pub fn cart(&mut self, session: &str) -> Result<&Cart> {
        if !self.carts.contains_key(session) {
            let cart = self.load(&cart_key(session))?.unwrap_or_default();
            self.carts.insert(session.to_string(), cart);
        }
        Ok(&self.carts[session])
    }

    /// Runs `f` against a copy of the cart; the copy is persisted and committed only if `f` succeeds.
    pub fn update_cart<R>(&mut self, session: &str, f: impl FnOnce(&mut Cart) -> std::result::Result<R, CartError>) -> Result<(R, Cart)> {
        let mut next = self.cart(session)?.clone();
        let out = f(&mut next)?;
        self.persist(&cart_key(session), &next)?;
        self.carts.insert(session.to_string(), next.clone());
        Ok((out, next))
    }

    pub fn clear_cart(&mut self, session: &str) -> Result<Cart> {
        self.update_cart(session, |c| { c.clear(); Ok(()) }).map(|(_, c)| c)
    }

    // ---- user session ----------------------------------------------------

    pub fn user(&mut self, session: &str) -> Result<Option<&UserSession>> {
        if !self.users.contains_key(session) {
            let user: Option<UserSession> = self.load(&user_key(session))?;
            self.users.insert(session.to_string(), user);
        }
        Ok(self.users[session].as_ref())
    }

    pub fn sign_in(&mut self, session: &str, user: UserSession) -> Result<()> {
        self.persist(&user_key(session), &user)?;
        self.users.insert(session.to_string(), Some(user));
        Ok(())
    }

    pub fn sign_out(&mut self, session: &str) -> Result<()> {
        self.storage.remove(&user_key(session))?;
        self.users.insert(session.to_string(), None);
        Ok(())
    }

    // ---- wishlist --------------------------------------------------------

    pub fn wishlist(&mut self, session: &str) -> Result<&Wishlist> {
        if !self.wishlists.contains_key(session) {
            let list = self.load(&wishlist_key(session))?.unwrap_or_default();
            self.wishlists.insert(session.to_string(), list);
        }
        Ok(&self.wishlists[session])
    }

    pub fn toggle_wishlist(&mut self, session: &str, product_id: &str) -> Result<bool> {
        let mut next = self.wishlist(session)?.clone();
        let added = next.toggle(product_id);
        self.persist(&wishlist_key(session), &next)?;
        self.wishlists.insert(session.to_string(), next);
        Ok(added)
    }

    // ---- orders ----------------------------------------------------------

    pub fn orders(&mut self) -> Result<&[Order]> {
        if self.orders.is_none() {
            self.orders = Some(self.load(ORDERS_KEY)?.unwrap_or_default());
        }
        Ok(self.orders.as_deref().unwrap_or_default())
    }

    pub fn orders_for(&mut self, session: &str) -> Result<Vec<Order>> {
        let mut mine: Vec<Order> = self.orders()?.iter().filter(|o| o.session_id() == session).cloned().collect();
        mine.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        Ok(mine)
    }

    /// Records a placed order and empties the session's cart.
    pub fn record_order(&mut self, session: &str, order: Order) -> Result<()> {
        let previous = self.orders()?.to_vec();
        let mut next = previous.clone();
        next.push(order);
        self.persist(ORDERS_KEY, &next)?;
        if let Err(e) = self.clear_cart(session) {
            warn!(error = %e, session, "clearing cart after checkout failed, rolling back order");
            if let Err(rollback) = self.persist(ORDERS_KEY, &previous) {
                warn!(error = %rollback, "order rollback failed");
            }
            return Err(e);
        }
        self.orders = Some(next);
        Ok(())
    }

    /// Applies `f` to a copy of the order and persists the result.
    pub fn update_order<R>(&mut self, order_id: Uuid, f: impl FnOnce(&mut Order) -> Result<R>) -> Result<(R, Order)> {
        let mut next = self.orders()?.to_vec();
        let order = next.iter_mut().find(|o| o.id() == order_id).ok_or_else(|| StorefrontError::OrderNotFound(order_id.to_string()))?;
        let out = f(order)?;
        let updated = order.clone();
        self.persist(ORDERS_KEY, &next)?;
        self.orders = Some(next);
        Ok((out, updated))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::aggregates::{Address, CartItem, OrderStatus, PlaceOrder};
    use crate::domain::value_objects::Money;
    use crate::shipping::{CarrierCode, ShippingQuote};

    fn item(id: &str, qty: u32) -> CartItem {
        CartItem { product_id: id.into(), name: id.into(), unit_price: Money::vnd(100_000), weight: None, image: None, quantity: qty }
    }

    /// Fails every write after the first `allowed` ones.
    struct FlakyStorage { inner: MemoryStorage, allowed: std::sync::atomic::AtomicUsize }

    impl StateStorage for FlakyStorage {
        fn load(&self, key: &str) -> std::result::Result<Option<String>, StorageError> { self.inner.load(key) }
        fn save(&self, key: &str, value: &str) -> std::result::Result<(), StorageError> {
            use std::sync::atomic::Ordering;
            if self.allowed.load(Ordering::SeqCst) == 0 {
                return Err(StorageError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")));
            }
            self.allowed.fetch_sub(1, Ordering::SeqCst);
            self.inner.save(key, value)
        }
        fn remove(&self, key: &str) -> std::result::Result<(), StorageError> { self.inner.remove(key) }
    }

    #[test]
    fn test_cart_survives_restart() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        let mut store = AppStore::new(storage.clone());
        store.update_cart("s1", |c| c.add_item(item("p1", 2))).unwrap();

        let mut reopened = AppStore::new(storage);
        assert_eq!(reopened.cart("s1").unwrap().quantity_of("p1"), 2);
        assert!(reopened.cart("other").unwrap().is_empty());
    }

    #[test]
    fn test_failed_write_leaves_state_unchanged() {
        let storage = Arc::new(FlakyStorage { inner: MemoryStorage::new(), allowed: 1.into() });
        let mut store = AppStore::new(storage);
        store.update_cart("s1", |c| c.add_item(item("p1", 1))).unwrap();
        assert!(store.update_cart("s1", |c| c.add_item(item("p2", 1))).is_err());
        let cart = store.cart("s1").unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(cart.quantity_of("p2"), 0);
    }

    #[test]
    fn test_cart_error_does_not_persist() {
        let mut store = AppStore::in_memory();
        let err = store.update_cart("s1", |c| c.remove_item("nope")).unwrap_err();
        assert!(matches!(err, StorefrontError::Cart(CartError::ItemNotFound)));
    }

    #[test]
    fn test_user_session_round_trip() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        let mut store = AppStore::new(storage.clone());
        let user = UserSession { user_id: "u1".into(), email: "an@shop.vn".into(), display_name: Some("An".into()), role: Role::Admin };
        store.sign_in("s1", user.clone()).unwrap();
        assert_eq!(AppStore::new(storage.clone()).user("s1").unwrap(), Some(&user));
        store.sign_out("s1").unwrap();
        assert_eq!(AppStore::new(storage).user("s1").unwrap(), None);
    }

    #[test]
    fn test_wishlist_toggle_persists() {
        let storage: Arc<dyn StateStorage> = Arc::new(MemoryStorage::new());
        let mut store = AppStore::new(storage.clone());
        assert!(store.toggle_wishlist("s1", "p1").unwrap());
        assert!(AppStore::new(storage).wishlist("s1").unwrap().contains("p1"));
        assert!(!store.toggle_wishlist("s1", "p1").unwrap());
    }

    #[test]
    fn test_record_and_update_order() {
        let mut store = AppStore::in_memory();
        let (_, cart) = store.update_cart("s1", |c| c.add_item(item("p1", 2))).unwrap();
        let quote = ShippingQuote { carrier: CarrierCode::Ghtk, carrier_name: "GHTK".into(), cost: Money::vnd(22_000), estimated_days: 3, tracking: true };
        let order = Order::place(PlaceOrder {
            session_id: "s1", email: "a@b.vn", cart: &cart, address: Address::default(),
            quote: &quote, shipping_fee: Money::vnd(22_000), note: None,
        }).unwrap();
        let id = order.id();
        store.record_order("s1", order).unwrap();
        assert!(store.cart("s1").unwrap().is_empty());
        assert_eq!(store.orders_for("s1").unwrap().len(), 1);
        assert!(store.orders_for("s2").unwrap().is_empty());

        let (_, updated) = store.update_order(id, |o| Ok(o.confirm(chrono::Utc::now())?)).unwrap();
        assert_eq!(updated.status(), OrderStatus::Confirmed);
        assert!(store.update_order(Uuid::nil(), |_| Ok(())).is_err());
    }
}

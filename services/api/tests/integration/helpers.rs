use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use kainan_api::domain::repository::{
    NotificationDispatcher, OrderRepository, OtpRepository, UserRepository,
};
use kainan_api::domain::types::{
    Address, AddressSnapshot, AdminOrderRow, CartItem, Order, OtpChallenge, Rider, User,
};
use kainan_api::error::ApiError;
use kainan_domain::order::OrderStatus;
use kainan_domain::otp::OtpPurpose;
use kainan_domain::pagination::PageRequest;

/// Shared in-memory backing store; repo handles clone the inner Arcs so a
/// test can inspect state after a usecase ran.
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub users: Arc<Mutex<Vec<User>>>,
    pub otps: Arc<Mutex<Vec<OtpChallenge>>>,
    pub orders: Arc<Mutex<Vec<Order>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed_user(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn seed_order(&self, order: Order) {
        self.orders.lock().unwrap().push(order);
    }

    pub fn user_repo(&self) -> MemoryUserRepo {
        MemoryUserRepo {
            users: Arc::clone(&self.users),
        }
    }

    pub fn otp_repo(&self) -> MemoryOtpRepo {
        MemoryOtpRepo {
            otps: Arc::clone(&self.otps),
        }
    }

    pub fn order_repo(&self) -> MemoryOrderRepo {
        MemoryOrderRepo {
            orders: Arc::clone(&self.orders),
            users: Arc::clone(&self.users),
        }
    }
}

// ── MemoryUserRepo ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryUserRepo {
    pub users: Arc<Mutex<Vec<User>>>,
}

impl UserRepository for MemoryUserRepo {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> Result<Option<User>, ApiError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username || u.email == email || u.phone == phone)
            .cloned())
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        self.users.lock().unwrap().push(user.clone());
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.first_name = first_name.to_owned();
            u.last_name = last_name.to_owned();
            u.phone = phone.to_owned();
            u.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.password_hash = password_hash.to_owned();
            u.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_cart(&self, id: Uuid, cart: &[CartItem]) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.cart = cart.to_vec();
            u.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn update_addresses(&self, id: Uuid, addresses: &[Address]) -> Result<(), ApiError> {
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == id) {
            u.addresses = addresses.to_vec();
            u.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != id);
        Ok(users.len() < before)
    }
}

// ── MemoryOtpRepo ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryOtpRepo {
    pub otps: Arc<Mutex<Vec<OtpChallenge>>>,
}

impl OtpRepository for MemoryOtpRepo {
    async fn find_latest(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, ApiError> {
        Ok(self
            .otps
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.identifier == identifier && c.purpose == purpose)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn create_replacing_active(&self, challenge: &OtpChallenge) -> Result<(), ApiError> {
        let mut otps = self.otps.lock().unwrap();
        let now = Utc::now();
        for c in otps.iter_mut() {
            if c.identifier == challenge.identifier
                && c.purpose == challenge.purpose
                && c.consumed_at.is_none()
            {
                c.consumed_at = Some(now);
            }
        }
        otps.push(challenge.clone());
        Ok(())
    }

    async fn record_attempt(&self, id: Uuid) -> Result<(), ApiError> {
        let mut otps = self.otps.lock().unwrap();
        if let Some(c) = otps.iter_mut().find(|c| c.id == id) {
            c.attempts += 1;
        }
        Ok(())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, ApiError> {
        let mut otps = self.otps.lock().unwrap();
        match otps.iter_mut().find(|c| c.id == id && c.consumed_at.is_none()) {
            Some(c) => {
                c.consumed_at = Some(Utc::now());
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        self.otps.lock().unwrap().retain(|c| c.id != id);
        Ok(())
    }
}

// ── MemoryOrderRepo ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct MemoryOrderRepo {
    pub orders: Arc<Mutex<Vec<Order>>>,
    pub users: Arc<Mutex<Vec<User>>>,
}

impl OrderRepository for MemoryOrderRepo {
    async fn create_clearing_cart(&self, order: &Order) -> Result<(), ApiError> {
        self.orders.lock().unwrap().push(order.clone());
        let mut users = self.users.lock().unwrap();
        if let Some(u) = users.iter_mut().find(|u| u.id == order.user_id) {
            u.cart.clear();
        }
        Ok(())
    }

    async fn create(&self, order: &Order) -> Result<(), ApiError> {
        self.orders.lock().unwrap().push(order.clone());
        Ok(())
    }

    async fn number_exists(&self, order_number: &str) -> Result<bool, ApiError> {
        Ok(self
            .orders
            .lock()
            .unwrap()
            .iter()
            .any(|o| o.order_number == order_number))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError> {
        Ok(self.orders.lock().unwrap().iter().find(|o| o.id == id).cloned())
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.user_id == user_id && !o.user_received)
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders)
    }

    async fn list_admin(
        &self,
        placed_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        page: PageRequest,
    ) -> Result<Vec<AdminOrderRow>, ApiError> {
        let users = self.users.lock().unwrap();
        let mut orders: Vec<Order> = self
            .orders
            .lock()
            .unwrap()
            .iter()
            .filter(|o| o.status != OrderStatus::Cancelled)
            .filter(|o| match placed_range {
                Some((start, end)) => o.placed_at >= start && o.placed_at < end,
                None => true,
            })
            .cloned()
            .collect();
        orders.sort_by_key(|o| std::cmp::Reverse(o.created_at));
        Ok(orders
            .into_iter()
            .skip(page.offset() as usize)
            .take(page.per_page as usize)
            .map(|order| {
                let username = users
                    .iter()
                    .find(|u| u.id == order.user_id)
                    .map(|u| u.username.clone())
                    .unwrap_or_else(|| "Unknown".to_owned());
                AdminOrderRow { order, username }
            })
            .collect())
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<(), ApiError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(o) = orders.iter_mut().find(|o| o.id == id) {
            o.status = status;
            o.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_rider(&self, id: Uuid, rider: &Rider) -> Result<(), ApiError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(o) = orders.iter_mut().find(|o| o.id == id) {
            o.rider = Some(rider.clone());
            o.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn set_delivery_address(
        &self,
        id: Uuid,
        address: &AddressSnapshot,
    ) -> Result<(), ApiError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(o) = orders.iter_mut().find(|o| o.id == id) {
            o.delivery_address = address.clone();
            o.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_received(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        let mut orders = self.orders.lock().unwrap();
        if let Some(o) = orders.iter_mut().find(|o| o.id == id) {
            o.user_received = true;
            o.received_at = Some(at);
            o.updated_at = Utc::now();
        }
        Ok(())
    }
}

// ── RecordingDispatcher ──────────────────────────────────────────────────────

/// Dispatcher fake that records sent codes (or fails every send).
#[derive(Clone, Default)]
pub struct RecordingDispatcher {
    pub sent: Arc<Mutex<Vec<(String, OtpPurpose, String)>>>,
    pub fail: bool,
}

impl RecordingDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    /// Code carried by the most recent send.
    pub fn last_code(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, _, code)| code.clone())
    }
}

impl NotificationDispatcher for RecordingDispatcher {
    async fn send_otp(
        &self,
        recipient: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), ApiError> {
        if self.fail {
            return Err(ApiError::Unavailable);
        }
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_owned(), purpose, code.to_owned()));
        Ok(())
    }
}

// ── Fixtures ─────────────────────────────────────────────────────────────────

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn test_user(email: &str, username: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::now_v7(),
        first_name: "Alice".into(),
        last_name: "Reyes".into(),
        username: username.into(),
        email: email.into(),
        phone: format!("+639{:09}", username.len()),
        password_hash: kainan_api::util::hash_secret("secret123").unwrap(),
        is_admin: false,
        is_banned: false,
        addresses: vec![],
        cart: vec![],
        created_at: now,
        updated_at: now,
    }
}

pub fn test_address(is_default: bool) -> Address {
    Address {
        id: Uuid::new_v4(),
        recipient: "Alice Reyes".into(),
        contact: "09170000000".into(),
        street: "123 Mabini St, Poblacion".into(),
        landmark: "beside the bakery".into(),
        is_default,
    }
}

pub fn test_cart_item(name: &str, line_total: &str) -> CartItem {
    CartItem {
        id: Uuid::new_v4(),
        product_name: name.into(),
        size: "Medium".into(),
        addons: String::new(),
        quantity: 1,
        line_total: line_total.parse().unwrap(),
        image_key: String::new(),
    }
}

/// A user ready to order: one default address, two cart lines.
pub fn shopper(email: &str, username: &str) -> User {
    let mut user = test_user(email, username);
    user.addresses = vec![test_address(true)];
    user.cart = vec![
        test_cart_item("Halo-halo", "120.00"),
        test_cart_item("Siopao", "30.00"),
    ];
    user
}

pub fn test_order(user_id: Uuid, status: OrderStatus) -> Order {
    let now = Utc::now();
    let subtotal: Decimal = "150.00".parse().unwrap();
    let shipping_fee: Decimal = "30.00".parse().unwrap();
    Order {
        id: Uuid::now_v7(),
        user_id,
        order_number: format!("ORD-20260806-{}", &Uuid::new_v4().simple().to_string()[..4]),
        items: vec![kainan_api::domain::types::OrderItem {
            product_name: "Halo-halo".into(),
            size: "Medium".into(),
            addons: String::new(),
            quantity: 1,
            line_total: subtotal,
            image_key: String::new(),
        }],
        payment_method: "COD".into(),
        placed_at: now,
        status,
        subtotal,
        shipping_fee,
        total: subtotal + shipping_fee,
        delivery_address: AddressSnapshot {
            recipient: "Alice Reyes".into(),
            contact: "09170000000".into(),
            street: "123 Mabini St, Poblacion".into(),
            landmark: String::new(),
        },
        rider: None,
        user_received: false,
        received_at: None,
        created_at: now,
        updated_at: now,
    }
}

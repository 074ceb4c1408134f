#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use kainan_domain::order::OrderStatus;
use kainan_domain::otp::OtpPurpose;
use kainan_domain::pagination::PageRequest;

use crate::domain::types::{
    Address, AddressSnapshot, AdminOrderRow, CartItem, Order, OtpChallenge, Rider, User,
};
use crate::error::ApiError;

/// Repository for user accounts (the credential store).
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError>;

    /// Find any account colliding on username, email or phone.
    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> Result<Option<User>, ApiError>;

    async fn create(&self, user: &User) -> Result<(), ApiError>;

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<(), ApiError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError>;

    /// Replace the whole cart (it is an embedded document).
    async fn update_cart(&self, id: Uuid, cart: &[CartItem]) -> Result<(), ApiError>;

    /// Replace the whole address book.
    async fn update_addresses(&self, id: Uuid, addresses: &[Address]) -> Result<(), ApiError>;

    /// Delete an account. Returns `true` if a row was deleted.
    async fn delete(&self, id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for one-time code challenges.
pub trait OtpRepository: Send + Sync {
    /// Most recent challenge for the (identifier, purpose) pair, consumed
    /// or not — the caller distinguishes consumed/expired states.
    async fn find_latest(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, ApiError>;

    /// Consume any prior active challenge for the pair and insert the new
    /// one in the same transaction.
    async fn create_replacing_active(&self, challenge: &OtpChallenge) -> Result<(), ApiError>;

    /// Increment the attempt counter. Called on every verify try.
    async fn record_attempt(&self, id: Uuid) -> Result<(), ApiError>;

    /// Consume a challenge with a single update guarded by the
    /// not-yet-consumed predicate. Returns `false` if a concurrent call
    /// already consumed it.
    async fn consume(&self, id: Uuid) -> Result<bool, ApiError>;

    /// Remove a challenge (rollback path when dispatch fails).
    async fn delete(&self, id: Uuid) -> Result<(), ApiError>;
}

/// Repository for placed orders.
pub trait OrderRepository: Send + Sync {
    /// Insert the order and clear the owner's cart in one transaction.
    async fn create_clearing_cart(&self, order: &Order) -> Result<(), ApiError>;

    /// Insert the order without touching the cart (direct placement).
    async fn create(&self, order: &Order) -> Result<(), ApiError>;

    async fn number_exists(&self, order_number: &str) -> Result<bool, ApiError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError>;

    /// Orders the owner still tracks: everything not yet confirmed received,
    /// newest first.
    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError>;

    /// Admin listing: excludes cancelled orders, optionally filtered to
    /// `placed_at` in `[start, end)`, joined with the owner's username.
    async fn list_admin(
        &self,
        placed_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        page: PageRequest,
    ) -> Result<Vec<AdminOrderRow>, ApiError>;

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<(), ApiError>;

    async fn set_rider(&self, id: Uuid, rider: &Rider) -> Result<(), ApiError>;

    async fn set_delivery_address(
        &self,
        id: Uuid,
        address: &AddressSnapshot,
    ) -> Result<(), ApiError>;

    async fn mark_received(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError>;
}

/// Port for the outbound notification channel carrying OTP codes.
pub trait NotificationDispatcher: Send + Sync {
    /// Deliver a plaintext one-time code to the identifier's inbox.
    /// Failures surface as `Unavailable`.
    async fn send_otp(
        &self,
        recipient: &str,
        purpose: OtpPurpose,
        code: &str,
    ) -> Result<(), ApiError>;
}

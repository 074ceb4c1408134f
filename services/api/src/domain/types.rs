use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kainan_domain::order::OrderStatus;
use kainan_domain::otp::OtpPurpose;

/// OTP code length in digits.
pub const OTP_CODE_LEN: usize = 6;

/// OTP challenge time-to-live in seconds.
pub const OTP_TTL_SECS: i64 = 300;

/// Verify attempts allowed per challenge; the challenge is forcibly
/// consumed once the counter reaches this ceiling.
pub const OTP_MAX_ATTEMPTS: i32 = 5;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Saved delivery address in a user's address book.
///
/// Serialized form (camelCase) is both the JSONB storage layout and the
/// wire format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: Uuid,
    pub recipient: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    pub is_default: bool,
}

/// A line in a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: Uuid,
    pub product_name: String,
    pub size: String,
    #[serde(default)]
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    #[serde(default)]
    pub image_key: String,
}

/// Customer (or admin) account with its embedded shopping state.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub is_banned: bool,
    pub addresses: Vec<Address>,
    pub cart: Vec<CartItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Delivery address an order snapshots: the default one, or the first
    /// saved address when none is marked default.
    pub fn delivery_address(&self) -> Option<&Address> {
        self.addresses
            .iter()
            .find(|a| a.is_default)
            .or_else(|| self.addresses.first())
    }

    /// Sum of cart line totals.
    pub fn cart_subtotal(&self) -> Decimal {
        self.cart.iter().map(|i| i.line_total).sum()
    }
}

/// One-time code challenge bound to an identifier and purpose.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub id: Uuid,
    pub identifier: String,
    pub purpose: OtpPurpose,
    pub code_hash: String,
    pub expires_at: DateTime<Utc>,
    pub attempts: i32,
    pub consumed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl OtpChallenge {
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }
}

/// Order line frozen from the cart at placement time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub product_name: String,
    pub size: String,
    #[serde(default)]
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    #[serde(default)]
    pub image_key: String,
}

impl OrderItem {
    /// Freeze a cart line into an order line.
    pub fn from_cart(item: &CartItem) -> Self {
        Self {
            product_name: item.product_name.clone(),
            size: item.size.clone(),
            addons: item.addons.clone(),
            quantity: item.quantity,
            line_total: item.line_total,
            image_key: item.image_key.clone(),
        }
    }
}

/// Delivery address frozen at placement time, independent of the user's
/// live address book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressSnapshot {
    pub recipient: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub landmark: String,
}

impl AddressSnapshot {
    pub fn from_address(address: &Address) -> Self {
        Self {
            recipient: address.recipient.clone(),
            contact: address.contact.clone(),
            street: address.street.clone(),
            landmark: address.landmark.clone(),
        }
    }
}

/// Rider assigned to deliver an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rider {
    pub name: String,
    pub contact: String,
}

/// Placed order.
///
/// Items, totals and the delivery-address snapshot are immutable after
/// creation (the owner may amend the address only while `Processing`);
/// status and rider are the mutable overlay.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: Uuid,
    pub user_id: Uuid,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    pub placed_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub delivery_address: AddressSnapshot,
    pub rider: Option<Rider>,
    pub user_received: bool,
    pub received_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Admin listing row: an order joined with its owner's username.
#[derive(Debug, Clone)]
pub struct AdminOrderRow {
    pub order: Order,
    pub username: String,
}

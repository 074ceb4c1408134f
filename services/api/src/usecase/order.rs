use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use kainan_domain::order::OrderStatus;

use crate::domain::repository::{OrderRepository, UserRepository};
use crate::domain::types::{AddressSnapshot, Order, OrderItem};
use crate::error::ApiError;
use crate::usecase::order_number::make_unique_number;

// ── PlaceOrder (cart-to-order conversion) ────────────────────────────────────

pub struct PlaceOrderInput {
    pub payment_method: String,
    pub shipping_fee: Decimal,
}

pub struct PlaceOrderUseCase<U: UserRepository, O: OrderRepository> {
    pub users: U,
    pub orders: O,
}

impl<U: UserRepository, O: OrderRepository> PlaceOrderUseCase<U, O> {
    pub async fn execute(&self, user_id: Uuid, input: PlaceOrderInput) -> Result<Order, ApiError> {
        if input.payment_method.trim().is_empty() || input.shipping_fee < Decimal::ZERO {
            return Err(ApiError::MissingData);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if user.cart.is_empty() {
            return Err(ApiError::EmptyCart);
        }
        let delivery_address = user.delivery_address().ok_or(ApiError::NoAddress)?;

        let subtotal = user.cart_subtotal();
        let items: Vec<OrderItem> = user.cart.iter().map(OrderItem::from_cart).collect();
        let now = Utc::now();
        let order_number = make_unique_number(&self.orders, now).await?;

        let order = Order {
            id: Uuid::now_v7(),
            user_id: user.id,
            order_number,
            items,
            payment_method: input.payment_method.trim().to_owned(),
            placed_at: now,
            status: OrderStatus::Processing,
            subtotal,
            shipping_fee: input.shipping_fee,
            total: subtotal + input.shipping_fee,
            delivery_address: AddressSnapshot::from_address(delivery_address),
            rider: None,
            user_received: false,
            received_at: None,
            created_at: now,
            updated_at: now,
        };

        // One transaction: the order is never visible with the cart intact.
        self.orders.create_clearing_cart(&order).await?;
        Ok(order)
    }
}

// ── PlaceDirectOrder (caller-supplied items, cart untouched) ─────────────────

pub struct DirectItemInput {
    pub product_name: String,
    pub size: String,
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    pub image_key: String,
}

pub struct PlaceDirectOrderInput {
    pub payment_method: String,
    pub shipping_fee: Decimal,
    pub items: Vec<DirectItemInput>,
}

pub struct PlaceDirectOrderUseCase<U: UserRepository, O: OrderRepository> {
    pub users: U,
    pub orders: O,
}

impl<U: UserRepository, O: OrderRepository> PlaceDirectOrderUseCase<U, O> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: PlaceDirectOrderInput,
    ) -> Result<Order, ApiError> {
        if input.payment_method.trim().is_empty()
            || input.shipping_fee < Decimal::ZERO
            || input.items.is_empty()
        {
            return Err(ApiError::MissingData);
        }
        let invalid = input.items.iter().any(|i| {
            i.product_name.trim().is_empty()
                || i.size.trim().is_empty()
                || i.quantity < 1
                || i.line_total < Decimal::ZERO
        });
        if invalid {
            return Err(ApiError::MissingData);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;
        let delivery_address = user.delivery_address().ok_or(ApiError::NoAddress)?;

        let items: Vec<OrderItem> = input
            .items
            .iter()
            .map(|i| OrderItem {
                product_name: i.product_name.trim().to_owned(),
                size: i.size.trim().to_owned(),
                addons: i.addons.clone(),
                quantity: i.quantity,
                line_total: i.line_total,
                image_key: i.image_key.clone(),
            })
            .collect();
        let subtotal: Decimal = items.iter().map(|i| i.line_total).sum();
        let now = Utc::now();
        let order_number = make_unique_number(&self.orders, now).await?;

        let order = Order {
            id: Uuid::now_v7(),
            user_id: user.id,
            order_number,
            items,
            payment_method: input.payment_method.trim().to_owned(),
            placed_at: now,
            status: OrderStatus::Processing,
            subtotal,
            shipping_fee: input.shipping_fee,
            total: subtotal + input.shipping_fee,
            delivery_address: AddressSnapshot::from_address(delivery_address),
            rider: None,
            user_received: false,
            received_at: None,
            created_at: now,
            updated_at: now,
        };

        self.orders.create(&order).await?;
        Ok(order)
    }
}

// ── ListMyOrders ─────────────────────────────────────────────────────────────

pub struct ListMyOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListMyOrdersUseCase<O> {
    pub async fn execute(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
        self.orders.list_active_by_user(user_id).await
    }
}

/// Load an order and check the caller owns it; a foreign order is
/// indistinguishable from a missing one.
async fn find_owned<O: OrderRepository>(
    orders: &O,
    order_id: Uuid,
    user_id: Uuid,
) -> Result<Order, ApiError> {
    let order = orders
        .find_by_id(order_id)
        .await?
        .ok_or(ApiError::OrderNotFound)?;
    if order.user_id != user_id {
        return Err(ApiError::OrderNotFound);
    }
    Ok(order)
}

// ── CancelOrder (owner) ──────────────────────────────────────────────────────

pub struct CancelOrderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> CancelOrderUseCase<O> {
    pub async fn execute(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, ApiError> {
        let mut order = find_owned(&self.orders, order_id, user_id).await?;
        if !order.status.cancellable() {
            return Err(ApiError::CannotCancel);
        }
        self.orders
            .set_status(order.id, OrderStatus::Cancelled)
            .await?;
        order.status = OrderStatus::Cancelled;
        Ok(order)
    }
}

// ── AmendOrderAddress (owner, Processing only) ───────────────────────────────

pub struct AmendOrderAddressInput {
    pub recipient: String,
    pub contact: String,
    pub street: String,
    pub landmark: String,
}

pub struct AmendOrderAddressUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> AmendOrderAddressUseCase<O> {
    pub async fn execute(
        &self,
        order_id: Uuid,
        user_id: Uuid,
        input: AmendOrderAddressInput,
    ) -> Result<AddressSnapshot, ApiError> {
        if input.recipient.trim().is_empty()
            || input.contact.trim().is_empty()
            || input.street.trim().is_empty()
        {
            return Err(ApiError::MissingData);
        }

        let order = find_owned(&self.orders, order_id, user_id).await?;
        if order.status != OrderStatus::Processing {
            return Err(ApiError::InvalidForStatus);
        }

        let snapshot = AddressSnapshot {
            recipient: input.recipient.trim().to_owned(),
            contact: input.contact.trim().to_owned(),
            street: input.street.trim().to_owned(),
            landmark: input.landmark.trim().to_owned(),
        };
        self.orders
            .set_delivery_address(order.id, &snapshot)
            .await?;
        Ok(snapshot)
    }
}

// ── ConfirmReceived (owner, Delivered only) ──────────────────────────────────

pub struct ConfirmReceivedUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ConfirmReceivedUseCase<O> {
    pub async fn execute(&self, order_id: Uuid, user_id: Uuid) -> Result<Order, ApiError> {
        let mut order = find_owned(&self.orders, order_id, user_id).await?;
        if order.status != OrderStatus::Delivered {
            return Err(ApiError::InvalidForStatus);
        }
        let now = Utc::now();
        self.orders.mark_received(order.id, now).await?;
        order.user_received = true;
        order.received_at = Some(now);
        Ok(order)
    }
}

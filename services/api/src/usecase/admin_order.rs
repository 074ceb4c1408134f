use chrono::{DateTime, Utc};
use uuid::Uuid;

use kainan_domain::order::OrderStatus;
use kainan_domain::pagination::PageRequest;

use crate::domain::repository::OrderRepository;
use crate::domain::types::{AdminOrderRow, Order, Rider};
use crate::error::ApiError;

// ── ListOrders (admin tracking view) ─────────────────────────────────────────

pub struct ListOrdersUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> ListOrdersUseCase<O> {
    pub async fn execute(
        &self,
        placed_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        page: PageRequest,
    ) -> Result<Vec<AdminOrderRow>, ApiError> {
        self.orders.list_admin(placed_range, page.clamped()).await
    }
}

// ── UpdateOrderStatus ────────────────────────────────────────────────────────

pub struct UpdateOrderStatusInput {
    pub order_id: Uuid,
    /// Requested status, as the wire string.
    pub status: String,
}

pub struct UpdateOrderStatusUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> UpdateOrderStatusUseCase<O> {
    pub async fn execute(&self, input: UpdateOrderStatusInput) -> Result<Order, ApiError> {
        let status =
            OrderStatus::from_str_opt(input.status.trim()).ok_or(ApiError::InvalidStatus)?;

        let mut order = self
            .orders
            .find_by_id(input.order_id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;

        // Delivered and Cancelled are absorbing.
        if order.status.is_terminal() {
            return Err(ApiError::TerminalState);
        }

        self.orders.set_status(order.id, status).await?;
        order.status = status;
        Ok(order)
    }
}

// ── AssignRider ──────────────────────────────────────────────────────────────

pub struct AssignRiderInput {
    pub order_id: Uuid,
    pub name: String,
    pub contact: String,
}

pub struct AssignRiderUseCase<O: OrderRepository> {
    pub orders: O,
}

impl<O: OrderRepository> AssignRiderUseCase<O> {
    pub async fn execute(&self, input: AssignRiderInput) -> Result<Rider, ApiError> {
        let name = input.name.trim().to_owned();
        let contact = input.contact.trim().to_owned();
        if name.is_empty() || contact.is_empty() {
            return Err(ApiError::MissingData);
        }

        let order = self
            .orders
            .find_by_id(input.order_id)
            .await?
            .ok_or(ApiError::OrderNotFound)?;

        if !order.status.accepts_rider() {
            return Err(ApiError::InvalidForStatus);
        }

        let rider = Rider { name, contact };
        self.orders.set_rider(order.id, &rider).await?;
        Ok(rider)
    }
}

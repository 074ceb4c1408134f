use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kainan_domain::order::OrderStatus;

use crate::domain::types::{AddressSnapshot, Order, OrderItem, Rider};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::order::{
    AmendOrderAddressInput, AmendOrderAddressUseCase, CancelOrderUseCase, ConfirmReceivedUseCase,
    DirectItemInput, ListMyOrdersUseCase, PlaceDirectOrderInput, PlaceDirectOrderUseCase,
    PlaceOrderInput, PlaceOrderUseCase,
};

/// Full order view.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: String,
    pub order_number: String,
    pub items: Vec<OrderItem>,
    pub payment_method: String,
    #[serde(serialize_with = "kainan_core::serde::to_rfc3339_ms")]
    pub placed_at: chrono::DateTime<chrono::Utc>,
    pub status: OrderStatus,
    pub subtotal: Decimal,
    pub shipping_fee: Decimal,
    pub total: Decimal,
    pub delivery_address: AddressSnapshot,
    pub rider: Option<Rider>,
    pub user_received: bool,
    #[serde(serialize_with = "kainan_core::serde::to_rfc3339_ms_opt")]
    pub received_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl OrderResponse {
    pub fn from_order(order: Order) -> Self {
        Self {
            id: order.id.to_string(),
            order_number: order.order_number,
            items: order.items,
            payment_method: order.payment_method,
            placed_at: order.placed_at,
            status: order.status,
            subtotal: order.subtotal,
            shipping_fee: order.shipping_fee,
            total: order.total,
            delivery_address: order.delivery_address,
            rider: order.rider,
            user_received: order.user_received,
            received_at: order.received_at,
        }
    }
}

// ── POST /orders ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub payment_method: String,
    #[serde(default)]
    pub shipping_fee: Decimal,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlacedResponse {
    pub order_id: String,
    pub order_number: String,
}

pub async fn place_order(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<PlaceOrderRequest>,
) -> Result<(StatusCode, Json<PlacedResponse>), ApiError> {
    let usecase = PlaceOrderUseCase {
        users: state.user_repo(),
        orders: state.order_repo(),
    };
    let order = usecase
        .execute(
            identity.user_id,
            PlaceOrderInput {
                payment_method: body.payment_method,
                shipping_fee: body.shipping_fee,
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PlacedResponse {
            order_id: order.id.to_string(),
            order_number: order.order_number,
        }),
    ))
}

// ── POST /orders/direct ──────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectItemRequest {
    pub product_name: String,
    pub size: String,
    #[serde(default)]
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    #[serde(default)]
    pub image_key: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceDirectOrderRequest {
    pub payment_method: String,
    #[serde(default)]
    pub shipping_fee: Decimal,
    pub items: Vec<DirectItemRequest>,
}

pub async fn place_direct_order(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<PlaceDirectOrderRequest>,
) -> Result<(StatusCode, Json<PlacedResponse>), ApiError> {
    let usecase = PlaceDirectOrderUseCase {
        users: state.user_repo(),
        orders: state.order_repo(),
    };
    let order = usecase
        .execute(
            identity.user_id,
            PlaceDirectOrderInput {
                payment_method: body.payment_method,
                shipping_fee: body.shipping_fee,
                items: body
                    .items
                    .into_iter()
                    .map(|i| DirectItemInput {
                        product_name: i.product_name,
                        size: i.size,
                        addons: i.addons,
                        quantity: i.quantity,
                        line_total: i.line_total,
                        image_key: i.image_key,
                    })
                    .collect(),
            },
        )
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(PlacedResponse {
            order_id: order.id.to_string(),
            order_number: order.order_number,
        }),
    ))
}

// ── GET /orders ──────────────────────────────────────────────────────────────

pub async fn list_my_orders(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<Vec<OrderResponse>>, ApiError> {
    let usecase = ListMyOrdersUseCase {
        orders: state.order_repo(),
    };
    let orders = usecase.execute(identity.user_id).await?;
    Ok(Json(orders.into_iter().map(OrderResponse::from_order).collect()))
}

// ── PATCH /orders/{order_id}/cancel ──────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub order_id: String,
    pub status: OrderStatus,
}

pub async fn cancel_order(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<StatusResponse>, ApiError> {
    let usecase = CancelOrderUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(order_id, identity.user_id).await?;
    Ok(Json(StatusResponse {
        order_id: order.id.to_string(),
        status: order.status,
    }))
}

// ── PATCH /orders/{order_id}/address ─────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendAddressRequest {
    pub recipient: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub landmark: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AmendedAddressResponse {
    pub order_id: String,
    pub delivery_address: AddressSnapshot,
}

pub async fn amend_address(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<AmendAddressRequest>,
) -> Result<Json<AmendedAddressResponse>, ApiError> {
    let usecase = AmendOrderAddressUseCase {
        orders: state.order_repo(),
    };
    let delivery_address = usecase
        .execute(
            order_id,
            identity.user_id,
            AmendOrderAddressInput {
                recipient: body.recipient,
                contact: body.contact,
                street: body.street,
                landmark: body.landmark,
            },
        )
        .await?;
    Ok(Json(AmendedAddressResponse {
        order_id: order_id.to_string(),
        delivery_address,
    }))
}

// ── PATCH /orders/{order_id}/received ────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedResponse {
    pub order_id: String,
    pub user_received: bool,
    #[serde(serialize_with = "kainan_core::serde::to_rfc3339_ms_opt")]
    pub received_at: Option<chrono::DateTime<chrono::Utc>>,
}

pub async fn confirm_received(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<Json<ReceivedResponse>, ApiError> {
    let usecase = ConfirmReceivedUseCase {
        orders: state.order_repo(),
    };
    let order = usecase.execute(order_id, identity.user_id).await?;
    Ok(Json(ReceivedResponse {
        order_id: order.id.to_string(),
        user_received: order.user_received,
        received_at: order.received_at,
    }))
}

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kainan_domain::pagination::PageRequest;

use crate::domain::types::Rider;
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::admin_order::{
    AssignRiderInput, AssignRiderUseCase, ListOrdersUseCase, UpdateOrderStatusInput,
    UpdateOrderStatusUseCase,
};
use crate::usecase::admin_user::DeleteUserUseCase;

use super::orders::{OrderResponse, StatusResponse};

// ── GET /admin/orders ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ListOrdersQuery {
    /// Range over `placed_at`, as unix milliseconds: `[start, end)`.
    pub start: Option<i64>,
    pub end: Option<i64>,
    #[serde(rename = "per-page")]
    pub per_page: Option<u32>,
    pub page: Option<u32>,
}

#[derive(Serialize)]
pub struct AdminOrderResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub username: String,
}

pub async fn list_orders(
    identity: Identity,
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<AdminOrderResponse>>, ApiError> {
    identity.require_admin()?;

    let placed_range = match (query.start, query.end) {
        (Some(start), Some(end)) => {
            let start = DateTime::from_timestamp_millis(start).ok_or(ApiError::MissingData)?;
            let end = DateTime::from_timestamp_millis(end).ok_or(ApiError::MissingData)?;
            Some((start, end))
        }
        _ => None,
    };
    let page = PageRequest {
        per_page: query.per_page.unwrap_or_else(|| PageRequest::default().per_page),
        page: query.page.unwrap_or_else(|| PageRequest::default().page),
    };

    let usecase = ListOrdersUseCase {
        orders: state.order_repo(),
    };
    let rows = usecase.execute(placed_range, page).await?;
    Ok(Json(
        rows.into_iter()
            .map(|row| AdminOrderResponse {
                order: OrderResponse::from_order(row.order),
                username: row.username,
            })
            .collect(),
    ))
}

// ── PATCH /admin/orders/{order_id}/status ────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

pub async fn update_order_status(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    identity.require_admin()?;

    let usecase = UpdateOrderStatusUseCase {
        orders: state.order_repo(),
    };
    let order = usecase
        .execute(UpdateOrderStatusInput {
            order_id,
            status: body.status,
        })
        .await?;
    Ok(Json(StatusResponse {
        order_id: order.id.to_string(),
        status: order.status,
    }))
}

// ── PATCH /admin/orders/{order_id}/rider ─────────────────────────────────────

#[derive(Deserialize)]
pub struct AssignRiderRequest {
    pub name: String,
    pub contact: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiderResponse {
    pub order_id: String,
    pub rider: Rider,
}

pub async fn assign_rider(
    identity: Identity,
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(body): Json<AssignRiderRequest>,
) -> Result<Json<RiderResponse>, ApiError> {
    identity.require_admin()?;

    let usecase = AssignRiderUseCase {
        orders: state.order_repo(),
    };
    let rider = usecase
        .execute(AssignRiderInput {
            order_id,
            name: body.name,
            contact: body.contact,
        })
        .await?;
    Ok(Json(RiderResponse {
        order_id: order_id.to_string(),
        rider,
    }))
}

// ── DELETE /admin/users/{user_id} ────────────────────────────────────────────

pub async fn delete_user(
    identity: Identity,
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    identity.require_admin()?;

    let usecase = DeleteUserUseCase {
        users: state.user_repo(),
    };
    usecase.execute(user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

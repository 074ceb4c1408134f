use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::{Address, CartItem, User};
use crate::error::ApiError;
use crate::identity::Identity;
use crate::state::AppState;
use crate::usecase::me::{
    AddAddressInput, AddAddressUseCase, AddCartItemInput, AddCartItemUseCase, ChangePasswordInput,
    ChangePasswordUseCase, GetProfileUseCase, RemoveCartItemUseCase, UpdateProfileInput,
    UpdateProfileUseCase,
};

use super::auth::{OkResponse, UserResponse};

/// Full profile view: account fields plus the embedded address book and
/// cart. The password hash is never serialized.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub username: String,
    pub email: String,
    pub phone: String,
    pub is_admin: bool,
    pub addresses: Vec<Address>,
    pub cart: Vec<CartItem>,
    #[serde(serialize_with = "kainan_core::serde::to_rfc3339_ms")]
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl ProfileResponse {
    fn from_user(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            first_name: user.first_name,
            last_name: user.last_name,
            username: user.username,
            email: user.email,
            phone: user.phone,
            is_admin: user.is_admin,
            addresses: user.addresses,
            cart: user.cart,
            created_at: user.created_at,
        }
    }
}

// ── GET /me ──────────────────────────────────────────────────────────────────

pub async fn get_me(
    identity: Identity,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let usecase = GetProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase.execute(identity.user_id).await?;
    Ok(Json(ProfileResponse::from_user(user)))
}

// ── PATCH /me/profile ────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

#[derive(Serialize)]
pub struct UserEnvelope {
    pub user: UserResponse,
}

pub async fn update_profile(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let usecase = UpdateProfileUseCase {
        users: state.user_repo(),
    };
    let user = usecase
        .execute(
            identity.user_id,
            UpdateProfileInput {
                first_name: body.first_name,
                last_name: body.last_name,
                phone: body.phone,
            },
        )
        .await?;
    Ok(Json(UserEnvelope {
        user: UserResponse::from_user(&user),
    }))
}

// ── PATCH /me/password ───────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

pub async fn change_password(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<ChangePasswordRequest>,
) -> Result<Json<OkResponse>, ApiError> {
    let usecase = ChangePasswordUseCase {
        users: state.user_repo(),
    };
    usecase
        .execute(
            identity.user_id,
            ChangePasswordInput {
                old_password: body.old_password,
                new_password: body.new_password,
            },
        )
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

// ── POST /me/address ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddAddressRequest {
    pub recipient: String,
    pub contact: String,
    pub street: String,
    #[serde(default)]
    pub landmark: String,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Serialize)]
pub struct AddressesResponse {
    pub addresses: Vec<Address>,
}

pub async fn add_address(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddAddressRequest>,
) -> Result<(StatusCode, Json<AddressesResponse>), ApiError> {
    let usecase = AddAddressUseCase {
        users: state.user_repo(),
    };
    let addresses = usecase
        .execute(
            identity.user_id,
            AddAddressInput {
                recipient: body.recipient,
                contact: body.contact,
                street: body.street,
                landmark: body.landmark,
                is_default: body.is_default,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(AddressesResponse { addresses })))
}

// ── POST /me/cart ────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCartItemRequest {
    pub product_name: String,
    pub size: String,
    #[serde(default)]
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    #[serde(default)]
    pub image_key: String,
}

#[derive(Serialize)]
pub struct CartResponse {
    pub cart: Vec<CartItem>,
}

pub async fn add_cart_item(
    identity: Identity,
    State(state): State<AppState>,
    Json(body): Json<AddCartItemRequest>,
) -> Result<(StatusCode, Json<CartResponse>), ApiError> {
    let usecase = AddCartItemUseCase {
        users: state.user_repo(),
    };
    let cart = usecase
        .execute(
            identity.user_id,
            AddCartItemInput {
                product_name: body.product_name,
                size: body.size,
                addons: body.addons,
                quantity: body.quantity,
                line_total: body.line_total,
                image_key: body.image_key,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(CartResponse { cart })))
}

// ── DELETE /me/cart/{cart_item_id} ───────────────────────────────────────────

pub async fn remove_cart_item(
    identity: Identity,
    State(state): State<AppState>,
    Path(cart_item_id): Path<Uuid>,
) -> Result<Json<CartResponse>, ApiError> {
    let usecase = RemoveCartItemUseCase {
        users: state.user_repo(),
    };
    let cart = usecase.execute(identity.user_id, cart_item_id).await?;
    Ok(Json(CartResponse { cart }))
}

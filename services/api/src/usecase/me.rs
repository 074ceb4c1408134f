use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::repository::UserRepository;
use crate::domain::types::{Address, CartItem, MIN_PASSWORD_LEN, User};
use crate::error::ApiError;
use crate::util::{hash_secret, verify_secret};

// ── GetProfile ───────────────────────────────────────────────────────────────

pub struct GetProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> GetProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── UpdateProfile ────────────────────────────────────────────────────────────

pub struct UpdateProfileInput {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

pub struct UpdateProfileUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> UpdateProfileUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, input: UpdateProfileInput) -> Result<User, ApiError> {
        let first_name = input.first_name.trim();
        let last_name = input.last_name.trim();
        let phone = input.phone.trim();
        if first_name.is_empty() || last_name.is_empty() || phone.is_empty() {
            return Err(ApiError::MissingData);
        }

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        self.users
            .update_profile(user_id, first_name, last_name, phone)
            .await?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}

// ── ChangePassword ───────────────────────────────────────────────────────────

pub struct ChangePasswordInput {
    pub old_password: String,
    pub new_password: String,
}

pub struct ChangePasswordUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> ChangePasswordUseCase<U> {
    pub async fn execute(&self, user_id: Uuid, input: ChangePasswordInput) -> Result<(), ApiError> {
        if input.old_password.is_empty() {
            return Err(ApiError::MissingData);
        }
        if input.new_password.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::PasswordTooShort);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        if !verify_secret(&input.old_password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        let password_hash =
            hash_secret(&input.new_password).map_err(|e| anyhow::anyhow!("hash password: {e}"))?;
        self.users.update_password_hash(user.id, &password_hash).await
    }
}

// ── AddAddress ───────────────────────────────────────────────────────────────

pub struct AddAddressInput {
    pub recipient: String,
    pub contact: String,
    pub street: String,
    pub landmark: String,
    pub is_default: bool,
}

pub struct AddAddressUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> AddAddressUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: AddAddressInput,
    ) -> Result<Vec<Address>, ApiError> {
        if input.recipient.trim().is_empty()
            || input.contact.trim().is_empty()
            || input.street.trim().is_empty()
        {
            return Err(ApiError::MissingData);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let mut addresses = user.addresses;
        if input.is_default {
            // At most one default at a time.
            for address in &mut addresses {
                address.is_default = false;
            }
        }
        addresses.push(Address {
            id: Uuid::new_v4(),
            recipient: input.recipient.trim().to_owned(),
            contact: input.contact.trim().to_owned(),
            street: input.street.trim().to_owned(),
            landmark: input.landmark.trim().to_owned(),
            is_default: input.is_default,
        });

        self.users.update_addresses(user_id, &addresses).await?;
        Ok(addresses)
    }
}

// ── AddCartItem ──────────────────────────────────────────────────────────────

pub struct AddCartItemInput {
    pub product_name: String,
    pub size: String,
    pub addons: String,
    pub quantity: u32,
    pub line_total: Decimal,
    pub image_key: String,
}

pub struct AddCartItemUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> AddCartItemUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        input: AddCartItemInput,
    ) -> Result<Vec<CartItem>, ApiError> {
        if input.product_name.trim().is_empty()
            || input.size.trim().is_empty()
            || input.quantity < 1
            || input.line_total < Decimal::ZERO
        {
            return Err(ApiError::MissingData);
        }

        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let mut cart = user.cart;
        cart.push(CartItem {
            id: Uuid::new_v4(),
            product_name: input.product_name.trim().to_owned(),
            size: input.size.trim().to_owned(),
            addons: input.addons,
            quantity: input.quantity,
            line_total: input.line_total,
            image_key: input.image_key,
        });

        self.users.update_cart(user_id, &cart).await?;
        Ok(cart)
    }
}

// ── RemoveCartItem ───────────────────────────────────────────────────────────

pub struct RemoveCartItemUseCase<U: UserRepository> {
    pub users: U,
}

impl<U: UserRepository> RemoveCartItemUseCase<U> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        cart_item_id: Uuid,
    ) -> Result<Vec<CartItem>, ApiError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)?;

        let before = user.cart.len();
        let cart: Vec<CartItem> = user
            .cart
            .into_iter()
            .filter(|i| i.id != cart_item_id)
            .collect();
        if cart.len() == before {
            return Err(ApiError::CartItemNotFound);
        }

        self.users.update_cart(user_id, &cart).await?;
        Ok(cart)
    }
}

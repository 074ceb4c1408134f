use std::collections::{HashMap, HashSet};

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection,
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait, sea_query::Expr,
};
use uuid::Uuid;

use kainan_domain::order::OrderStatus;
use kainan_domain::otp::OtpPurpose;
use kainan_domain::pagination::PageRequest;
use kainan_schema::{orders, otp_challenges, users};

use crate::domain::repository::{OrderRepository, OtpRepository, UserRepository};
use crate::domain::types::{
    Address, AddressSnapshot, AdminOrderRow, CartItem, Order, OtpChallenge, Rider, User,
};
use crate::error::ApiError;

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find user by id")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .context("find user by email")?;
        model.map(user_from_model).transpose()
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await
            .context("find user by username")?;
        model.map(user_from_model).transpose()
    }

    async fn find_conflicting(
        &self,
        username: &str,
        email: &str,
        phone: &str,
    ) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(
                Condition::any()
                    .add(users::Column::Username.eq(username))
                    .add(users::Column::Email.eq(email))
                    .add(users::Column::Phone.eq(phone)),
            )
            .one(&self.db)
            .await
            .context("find conflicting user")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &User) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(user.id),
            first_name: Set(user.first_name.clone()),
            last_name: Set(user.last_name.clone()),
            username: Set(user.username.clone()),
            email: Set(user.email.clone()),
            phone: Set(user.phone.clone()),
            password_hash: Set(user.password_hash.clone()),
            is_admin: Set(user.is_admin),
            is_banned: Set(user.is_banned),
            addresses: Set(serde_json::to_value(&user.addresses).context("encode addresses")?),
            cart: Set(serde_json::to_value(&user.cart).context("encode cart")?),
            created_at: Set(user.created_at),
            updated_at: Set(user.updated_at),
        }
        .insert(&self.db)
        .await
        .context("create user")?;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: Uuid,
        first_name: &str,
        last_name: &str,
        phone: &str,
    ) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            phone: Set(phone.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update user profile")?;
        Ok(())
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            password_hash: Set(password_hash.to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update password hash")?;
        Ok(())
    }

    async fn update_cart(&self, id: Uuid, cart: &[CartItem]) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            cart: Set(serde_json::to_value(cart).context("encode cart")?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update cart")?;
        Ok(())
    }

    async fn update_addresses(&self, id: Uuid, addresses: &[Address]) -> Result<(), ApiError> {
        users::ActiveModel {
            id: Set(id),
            addresses: Set(serde_json::to_value(addresses).context("encode addresses")?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("update addresses")?;
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, ApiError> {
        let result = users::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    let addresses: Vec<Address> =
        serde_json::from_value(model.addresses).context("decode addresses")?;
    let cart: Vec<CartItem> = serde_json::from_value(model.cart).context("decode cart")?;
    Ok(User {
        id: model.id,
        first_name: model.first_name,
        last_name: model.last_name,
        username: model.username,
        email: model.email,
        phone: model.phone,
        password_hash: model.password_hash,
        is_admin: model.is_admin,
        is_banned: model.is_banned,
        addresses,
        cart,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

// ── OTP repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn find_latest(
        &self,
        identifier: &str,
        purpose: OtpPurpose,
    ) -> Result<Option<OtpChallenge>, ApiError> {
        let model = otp_challenges::Entity::find()
            .filter(otp_challenges::Column::Identifier.eq(identifier))
            .filter(otp_challenges::Column::Purpose.eq(purpose.as_str()))
            .order_by_desc(otp_challenges::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("find latest otp challenge")?;
        model.map(challenge_from_model).transpose()
    }

    async fn create_replacing_active(&self, challenge: &OtpChallenge) -> Result<(), ApiError> {
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                let challenge = challenge.clone();
                Box::pin(async move {
                    // Supersede any still-active challenge for the pair.
                    otp_challenges::Entity::update_many()
                        .col_expr(otp_challenges::Column::ConsumedAt, Expr::value(Utc::now()))
                        .filter(
                            otp_challenges::Column::Identifier.eq(challenge.identifier.clone()),
                        )
                        .filter(otp_challenges::Column::Purpose.eq(challenge.purpose.as_str()))
                        .filter(otp_challenges::Column::ConsumedAt.is_null())
                        .exec(txn)
                        .await?;
                    insert_challenge(txn, &challenge).await?;
                    Ok(())
                })
            })
            .await
            .context("create otp challenge replacing active")?;
        Ok(())
    }

    async fn record_attempt(&self, id: Uuid) -> Result<(), ApiError> {
        otp_challenges::Entity::update_many()
            .col_expr(
                otp_challenges::Column::Attempts,
                Expr::col(otp_challenges::Column::Attempts).add(1),
            )
            .filter(otp_challenges::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .context("record otp attempt")?;
        Ok(())
    }

    async fn consume(&self, id: Uuid) -> Result<bool, ApiError> {
        // Single guarded update: of two concurrent redeems only one can
        // match the `consumed_at IS NULL` predicate.
        let result = otp_challenges::Entity::update_many()
            .col_expr(otp_challenges::Column::ConsumedAt, Expr::value(Utc::now()))
            .filter(otp_challenges::Column::Id.eq(id))
            .filter(otp_challenges::Column::ConsumedAt.is_null())
            .exec(&self.db)
            .await
            .context("consume otp challenge")?;
        Ok(result.rows_affected > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<(), ApiError> {
        otp_challenges::Entity::delete_by_id(id)
            .exec(&self.db)
            .await
            .context("delete otp challenge")?;
        Ok(())
    }
}

async fn insert_challenge(
    txn: &DatabaseTransaction,
    challenge: &OtpChallenge,
) -> Result<(), sea_orm::DbErr> {
    otp_challenges::ActiveModel {
        id: Set(challenge.id),
        identifier: Set(challenge.identifier.clone()),
        purpose: Set(challenge.purpose.as_str().to_owned()),
        code_hash: Set(challenge.code_hash.clone()),
        expires_at: Set(challenge.expires_at),
        attempts: Set(challenge.attempts),
        consumed_at: Set(challenge.consumed_at),
        created_at: Set(challenge.created_at),
    }
    .insert(txn)
    .await?;
    Ok(())
}

fn challenge_from_model(model: otp_challenges::Model) -> Result<OtpChallenge, ApiError> {
    let purpose = OtpPurpose::from_str_opt(&model.purpose)
        .ok_or_else(|| anyhow::anyhow!("unknown otp purpose {:?}", model.purpose))?;
    Ok(OtpChallenge {
        id: model.id,
        identifier: model.identifier,
        purpose,
        code_hash: model.code_hash,
        expires_at: model.expires_at,
        attempts: model.attempts,
        consumed_at: model.consumed_at,
        created_at: model.created_at,
    })
}

// ── Order repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOrderRepository {
    pub db: DatabaseConnection,
}

impl OrderRepository for DbOrderRepository {
    async fn create_clearing_cart(&self, order: &Order) -> Result<(), ApiError> {
        // Encode outside the transaction closure so it only deals in DbErr.
        let order_model = order_active_model(order)?;
        let user_id = order.user_id;
        self.db
            .transaction::<_, (), sea_orm::DbErr>(|txn| {
                Box::pin(async move {
                    order_model.insert(txn).await?;
                    users::ActiveModel {
                        id: Set(user_id),
                        cart: Set(serde_json::json!([])),
                        updated_at: Set(Utc::now()),
                        ..Default::default()
                    }
                    .update(txn)
                    .await?;
                    Ok(())
                })
            })
            .await
            .context("create order clearing cart")?;
        Ok(())
    }

    async fn create(&self, order: &Order) -> Result<(), ApiError> {
        order_active_model(order)?
            .insert(&self.db)
            .await
            .context("create order")?;
        Ok(())
    }

    async fn number_exists(&self, order_number: &str) -> Result<bool, ApiError> {
        let count = orders::Entity::find()
            .filter(orders::Column::OrderNumber.eq(order_number))
            .count(&self.db)
            .await
            .context("check order number")?;
        Ok(count > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, ApiError> {
        let model = orders::Entity::find_by_id(id)
            .one(&self.db)
            .await
            .context("find order by id")?;
        model.map(order_from_model).transpose()
    }

    async fn list_active_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, ApiError> {
        let models = orders::Entity::find()
            .filter(orders::Column::UserId.eq(user_id))
            .filter(orders::Column::UserReceived.eq(false))
            .order_by_desc(orders::Column::CreatedAt)
            .all(&self.db)
            .await
            .context("list orders by user")?;
        models.into_iter().map(order_from_model).collect()
    }

    async fn list_admin(
        &self,
        placed_range: Option<(DateTime<Utc>, DateTime<Utc>)>,
        page: PageRequest,
    ) -> Result<Vec<AdminOrderRow>, ApiError> {
        let mut query = orders::Entity::find()
            .filter(orders::Column::Status.ne(OrderStatus::Cancelled.as_str()));
        if let Some((start, end)) = placed_range {
            query = query
                .filter(orders::Column::PlacedAt.gte(start))
                .filter(orders::Column::PlacedAt.lt(end));
        }
        let models = query
            .order_by_desc(orders::Column::CreatedAt)
            .offset(page.offset())
            .limit(u64::from(page.per_page))
            .all(&self.db)
            .await
            .context("list admin orders")?;

        // Second query for usernames; the listing tolerates a deleted owner.
        let user_ids: Vec<Uuid> = models
            .iter()
            .map(|m| m.user_id)
            .collect::<HashSet<_>>()
            .into_iter()
            .collect();
        let names: HashMap<Uuid, String> = users::Entity::find()
            .filter(users::Column::Id.is_in(user_ids))
            .all(&self.db)
            .await
            .context("list order owners")?
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        models
            .into_iter()
            .map(|model| {
                let username = names
                    .get(&model.user_id)
                    .cloned()
                    .unwrap_or_else(|| "Unknown".to_owned());
                Ok(AdminOrderRow {
                    order: order_from_model(model)?,
                    username,
                })
            })
            .collect()
    }

    async fn set_status(&self, id: Uuid, status: OrderStatus) -> Result<(), ApiError> {
        orders::ActiveModel {
            id: Set(id),
            status: Set(status.as_str().to_owned()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set order status")?;
        Ok(())
    }

    async fn set_rider(&self, id: Uuid, rider: &Rider) -> Result<(), ApiError> {
        orders::ActiveModel {
            id: Set(id),
            rider: Set(Some(serde_json::to_value(rider).context("encode rider")?)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set order rider")?;
        Ok(())
    }

    async fn set_delivery_address(
        &self,
        id: Uuid,
        address: &AddressSnapshot,
    ) -> Result<(), ApiError> {
        orders::ActiveModel {
            id: Set(id),
            delivery_address: Set(serde_json::to_value(address).context("encode address")?),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("set order delivery address")?;
        Ok(())
    }

    async fn mark_received(&self, id: Uuid, at: DateTime<Utc>) -> Result<(), ApiError> {
        orders::ActiveModel {
            id: Set(id),
            user_received: Set(true),
            received_at: Set(Some(at)),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .update(&self.db)
        .await
        .context("mark order received")?;
        Ok(())
    }
}

fn order_active_model(order: &Order) -> Result<orders::ActiveModel, ApiError> {
    Ok(orders::ActiveModel {
        id: Set(order.id),
        user_id: Set(order.user_id),
        order_number: Set(order.order_number.clone()),
        items: Set(serde_json::to_value(&order.items).context("encode order items")?),
        payment_method: Set(order.payment_method.clone()),
        placed_at: Set(order.placed_at),
        status: Set(order.status.as_str().to_owned()),
        subtotal: Set(order.subtotal),
        shipping_fee: Set(order.shipping_fee),
        total: Set(order.total),
        delivery_address: Set(
            serde_json::to_value(&order.delivery_address).context("encode delivery address")?
        ),
        rider: Set(order
            .rider
            .as_ref()
            .map(serde_json::to_value)
            .transpose()
            .context("encode rider")?),
        user_received: Set(order.user_received),
        received_at: Set(order.received_at),
        created_at: Set(order.created_at),
        updated_at: Set(order.updated_at),
    })
}

fn order_from_model(model: orders::Model) -> Result<Order, ApiError> {
    let status = OrderStatus::from_str_opt(&model.status)
        .ok_or_else(|| anyhow::anyhow!("unknown order status {:?}", model.status))?;
    let items: Vec<crate::domain::types::OrderItem> =
        serde_json::from_value(model.items).context("decode order items")?;
    let delivery_address: AddressSnapshot =
        serde_json::from_value(model.delivery_address).context("decode delivery address")?;
    let rider: Option<Rider> = model
        .rider
        .map(serde_json::from_value)
        .transpose()
        .context("decode rider")?;
    Ok(Order {
        id: model.id,
        user_id: model.user_id,
        order_number: model.order_number,
        items,
        payment_method: model.payment_method,
        placed_at: model.placed_at,
        status,
        subtotal: model.subtotal,
        shipping_fee: model.shipping_fee,
        total: model.total,
        delivery_address,
        rider,
        user_received: model.user_received,
        received_at: model.received_at,
        created_at: model.created_at,
        updated_at: model.updated_at,
    })
}

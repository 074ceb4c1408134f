use sea_orm::entity::prelude::*;

/// One-time code challenge bound to an identifier and purpose.
/// Expires after 5 minutes; at most one active challenge per
/// (identifier, purpose) — issuing a new one consumes priors.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "otp_challenges")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub identifier: String,
    pub purpose: String,
    pub code_hash: String,
    pub expires_at: chrono::DateTime<chrono::Utc>,
    pub attempts: i32,
    pub consumed_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

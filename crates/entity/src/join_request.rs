use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pending request from `username` to join an organization.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_join_requests")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    /// Unix timestamp (seconds).
    pub requested_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Directed follower edge: `follower` follows `followee`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "follows")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub follower: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub followee: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

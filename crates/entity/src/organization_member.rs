use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Organization membership mapping.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organization_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub organization_id: String,

    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    /// Unix timestamp (seconds).
    pub joined_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

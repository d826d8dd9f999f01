use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Event scheduled by an organization.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "events")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub organization_id: String,
    pub creator: String,
    pub title: String,
    pub description: String,

    /// Unix timestamp (seconds).
    pub starts_at: i64,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

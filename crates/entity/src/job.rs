use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Job board posting.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "jobs")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub creator: String,
    pub title: String,
    pub description: String,

    /// Free-form compensation, e.g. "$90,000 - $110,000/year".
    pub pay: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Fixed-window request counter shared by every worker isolate.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "throttle_buckets")]
pub struct Model {
    /// `throttle_<scope>_<ident>`.
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,

    /// Unix timestamp (seconds) at which the current window opened.
    pub window_start: i64,

    pub hits: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

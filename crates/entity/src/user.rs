use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account record. The username is the stable identifier referenced by every other table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,

    /// URL of the profile picture, if one was set.
    pub profile_image: Option<String>,

    /// PBKDF2-SHA256 output.
    #[serde(skip_serializing)]
    pub password_hash: Vec<u8>,
    #[serde(skip_serializing)]
    pub salt: Vec<u8>,
    #[serde(skip_serializing)]
    pub password_iterations: i64,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

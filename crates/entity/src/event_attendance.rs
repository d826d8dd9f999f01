use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A member's answer to an event invitation. Stored as a single character.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(1))")]
pub enum Rsvp {
    #[sea_orm(string_value = "Y")]
    #[serde(rename = "Y")]
    Going,

    #[sea_orm(string_value = "N")]
    #[serde(rename = "N")]
    NotGoing,

    #[default]
    #[sea_orm(string_value = "M")]
    #[serde(rename = "M")]
    Undecided,
}

impl Rsvp {
    pub fn label(self) -> &'static str {
        match self {
            Rsvp::Going => "Going",
            Rsvp::NotGoing => "Not going",
            Rsvp::Undecided => "Undecided",
        }
    }
}

/// One row per (event, user); the pair is unique at the storage layer.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "event_attendance")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub event_id: String,
    pub username: String,
    pub rsvp: Rsvp,

    /// Unix timestamp (seconds).
    pub created_at: i64,

    /// Unix timestamp (seconds).
    pub updated_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

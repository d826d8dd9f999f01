use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "job_applications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub job_id: String,

    /// Account that submitted the application.
    pub applicant: String,

    pub applicant_name: String,
    pub applicant_email: String,
    pub applicant_phone: String,
    pub requested_pay: Option<String>,

    #[sea_orm(column_type = "Text")]
    pub resume_text: String,

    /// Unix timestamp (seconds).
    pub created_at: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Code of the activity awarded for scanning an event QR code.
pub const MEETUP_ATTENDANCE: &str = "MEETUP_ATTENDANCE";

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "activity_types")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  #[sea_orm(unique)]
  pub code: String,
  pub name: String,
  pub description: Option<String>,
  pub xp_value: i64,
  pub is_active: bool,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::user_activity::Entity")]
  Activities,
}

impl Related<super::user_activity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Activities.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "users")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub name: String,
  pub email: String,
  pub is_admin: bool,
  pub created_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::user_activity::Entity")]
  Activities,
  #[sea_orm(has_one = "super::xp_cache::Entity")]
  XpCache,
}

impl Related<super::user_activity::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Activities.def()
  }
}

impl Related<super::xp_cache::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::XpCache.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

//! Event entity - organizer-defined meetups with a rotating check-in code

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const MIN_ROTATION_SECONDS: i32 = 10;
pub const MAX_ROTATION_SECONDS: i32 = 300;
pub const DEFAULT_ROTATION_SECONDS: i32 = 30;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[sea_orm(table_name = "events")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub name: String,
  pub description: Option<String>,
  pub location: Option<String>,
  pub starts_at: DateTime,
  pub ends_at: DateTime,
  pub qr_rotation_seconds: i32,
  /// Set together with `qr_expires_at`, never alone.
  pub current_qr_secret: Option<String>,
  pub qr_expires_at: Option<DateTime>,
  pub created_by: String,
  pub created_at: DateTime,
  pub updated_at: DateTime,
}

impl Model {
  /// Inclusive on both ends of the window.
  pub fn is_active_at(&self, now: DateTime) -> bool {
    self.starts_at <= now && now <= self.ends_at
  }

  /// The current secret, if one is set and has not yet expired.
  pub fn live_secret_at(&self, now: DateTime) -> Option<(&str, DateTime)> {
    match (&self.current_qr_secret, self.qr_expires_at) {
      (Some(secret), Some(expires_at)) if expires_at > now => {
        Some((secret.as_str(), expires_at))
      }
      _ => None,
    }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::CreatedBy",
    to = "super::user::Column::Id"
  )]
  Creator,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Creator.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

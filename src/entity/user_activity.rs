//! UserActivity entity - the append-only XP ledger

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_activities")]
pub struct Model {
  #[sea_orm(primary_key, auto_increment = false)]
  pub id: String,
  pub user_id: String,
  pub activity_type_id: String,
  pub reference_id: Option<String>,
  pub reference_type: Option<String>,
  /// Snapshot of the activity type's value when the award was made
  pub xp_awarded: i64,
  pub created_at: DateTime,
}

impl Model {
  pub fn reference(&self) -> Option<Reference> {
    Reference::from_columns(
      self.reference_id.as_deref(),
      self.reference_type.as_deref(),
    )
  }
}

/// What triggered an award. Stored as a `(reference_id, reference_type)`
/// column pair that is either fully NULL or fully set.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reference {
  None,
  Event(String),
}

impl Reference {
  pub const EVENT: &'static str = "event";

  pub fn columns(&self) -> (Option<String>, Option<String>) {
    match self {
      Reference::None => (None, None),
      Reference::Event(id) => (Some(id.clone()), Some(Self::EVENT.to_owned())),
    }
  }

  /// `None` when the column pair is half-set or names an unknown kind.
  pub fn from_columns(id: Option<&str>, ty: Option<&str>) -> Option<Self> {
    match (id, ty) {
      (None, None) => Some(Reference::None),
      (Some(id), Some(Self::EVENT)) => Some(Reference::Event(id.to_owned())),
      _ => None,
    }
  }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "super::user::Entity",
    from = "Column::UserId",
    to = "super::user::Column::Id"
  )]
  User,
  #[sea_orm(
    belongs_to = "super::activity_type::Entity",
    from = "Column::ActivityTypeId",
    to = "super::activity_type::Column::Id"
  )]
  ActivityType,
}

impl Related<super::user::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::User.def()
  }
}

impl Related<super::activity_type::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::ActivityType.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

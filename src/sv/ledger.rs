//! Append-only XP ledger with at-most-once awards per (user, reference).

use sea_orm::sea_query::OnConflict;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  entity::{Reference, user, user_activity},
  prelude::*,
  sv,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Granted {
  pub xp_awarded: i64,
  pub activity_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Attendee {
  pub user_id: String,
  pub user_name: String,
  pub user_email: String,
  pub checked_in_at: DateTime,
  pub xp_awarded: i64,
}

pub struct Ledger<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Ledger<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Records one award of `code` to `user_id`.
  ///
  /// The row is written with a single `INSERT .. ON CONFLICT DO NOTHING`
  /// against the unique (user, reference) index, so concurrent attempts for
  /// the same reference race inside the database and exactly one wins.
  /// `Reference::None` never conflicts.
  pub async fn award(
    &self,
    user_id: &str,
    code: &str,
    reference: Reference,
  ) -> Result<Result<Granted, Denied>> {
    let Some(ty) = sv::ActivityType::new(self.db).by_code(code).await? else {
      return Ok(Err(Denied::ActivityTypeNotFound));
    };
    if !ty.is_active {
      return Ok(Err(Denied::ActivityTypeInactive));
    }

    let activity_id = Uuid::new_v4().to_string();
    let (reference_id, reference_type) = reference.columns();

    let row = user_activity::ActiveModel {
      id: Set(activity_id.clone()),
      user_id: Set(user_id.to_owned()),
      activity_type_id: Set(ty.id),
      reference_id: Set(reference_id),
      reference_type: Set(reference_type),
      xp_awarded: Set(ty.xp_value),
      created_at: Set(now()),
    };

    let inserted = user_activity::Entity::insert(row)
      .on_conflict(
        OnConflict::columns([
          user_activity::Column::UserId,
          user_activity::Column::ReferenceId,
          user_activity::Column::ReferenceType,
        ])
        .do_nothing()
        .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;

    if inserted == 0 {
      return Ok(Err(Denied::AlreadyAwarded));
    }

    sv::Xp::new(self.db).invalidate(user_id).await?;

    info!(user_id, code, xp = ty.xp_value, %activity_id, "XP awarded");
    Ok(Ok(Granted { xp_awarded: ty.xp_value, activity_id }))
  }

  /// Newest first.
  pub async fn by_user(
    &self,
    user_id: &str,
  ) -> Result<Vec<user_activity::Model>> {
    let rows = user_activity::Entity::find()
      .filter(user_activity::Column::UserId.eq(user_id))
      .order_by_desc(user_activity::Column::CreatedAt)
      .all(self.db)
      .await?;
    Ok(rows)
  }

  /// Users holding an award that references `event_id`, in check-in order.
  pub async fn attendees(&self, event_id: &str) -> Result<Vec<Attendee>> {
    let rows = user_activity::Entity::find()
      .filter(user_activity::Column::ReferenceId.eq(event_id))
      .filter(user_activity::Column::ReferenceType.eq(Reference::EVENT))
      .order_by_asc(user_activity::Column::CreatedAt)
      .find_also_related(user::Entity)
      .all(self.db)
      .await?;

    let attendees = rows
      .into_iter()
      .filter_map(|(activity, user)| {
        let user = user?;
        Some(Attendee {
          user_id: user.id,
          user_name: user.name,
          user_email: user.email,
          checked_in_at: activity.created_at,
          xp_awarded: activity.xp_awarded,
        })
      })
      .collect();

    Ok(attendees)
  }
}

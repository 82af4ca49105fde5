//! Cache-aside XP totals over the activity ledger.
//!
//! The cache row is deleted on every award and rebuilt on the next read.
//! Nothing writes through it.

use std::collections::BTreeSet;

use sea_orm::sea_query::{Expr, OnConflict};

use crate::{
  entity::{user_activity, xp_cache},
  prelude::*,
};

pub struct Xp<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Xp<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn total(&self, user_id: &str) -> Result<i64> {
    if let Some(cached) =
      xp_cache::Entity::find_by_id(user_id).one(self.db).await?
    {
      return Ok(cached.total_xp);
    }

    self.recalculate(user_id).await
  }

  /// Sums the ledger and overwrites the cache row, whatever it held.
  pub async fn recalculate(&self, user_id: &str) -> Result<i64> {
    let total_xp = self.ledger_sum(user_id).await?;

    let cache = xp_cache::ActiveModel {
      user_id: Set(user_id.to_owned()),
      total_xp: Set(total_xp),
      last_calculated_at: Set(now()),
    };

    xp_cache::Entity::insert(cache)
      .on_conflict(
        OnConflict::column(xp_cache::Column::UserId)
          .update_columns([
            xp_cache::Column::TotalXp,
            xp_cache::Column::LastCalculatedAt,
          ])
          .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;

    debug!(user_id, total_xp, "XP cache recalculated");
    Ok(total_xp)
  }

  pub async fn invalidate(&self, user_id: &str) -> Result<()> {
    xp_cache::Entity::delete_by_id(user_id).exec(self.db).await?;
    Ok(())
  }

  /// Rebuilds the cache of every user that has ledger rows or a cache row.
  /// Returns how many users were processed.
  pub async fn recalculate_all(&self) -> Result<usize> {
    let mut users: BTreeSet<String> = user_activity::Entity::find()
      .select_only()
      .column(user_activity::Column::UserId)
      .distinct()
      .into_tuple::<String>()
      .all(self.db)
      .await?
      .into_iter()
      .collect();

    users.extend(
      xp_cache::Entity::find()
        .select_only()
        .column(xp_cache::Column::UserId)
        .into_tuple::<String>()
        .all(self.db)
        .await?,
    );

    for user_id in &users {
      self.recalculate(user_id).await?;
    }

    Ok(users.len())
  }

  async fn ledger_sum(&self, user_id: &str) -> Result<i64> {
    // SUM over zero rows is NULL
    let total: Option<Option<i64>> = user_activity::Entity::find()
      .select_only()
      .column_as(Expr::col(user_activity::Column::XpAwarded).sum(), "total")
      .filter(user_activity::Column::UserId.eq(user_id))
      .into_tuple()
      .one(self.db)
      .await?;

    Ok(total.flatten().unwrap_or(0))
  }
}

//! Check-in orchestration: validate a scanned code and award attendance XP
//! exactly once per user and event.

use std::collections::HashMap;

use serde::Serialize;

use crate::{
  entity::{Reference, activity_type::MEETUP_ATTENDANCE, event},
  prelude::*,
  sv::{self, qr},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckedIn {
  pub xp_awarded: i64,
  pub event_name: String,
  pub total_xp: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCheckin {
  pub activity_id: String,
  pub event_id: String,
  pub event_name: String,
  pub xp_awarded: i64,
  pub checked_in_at: DateTime,
}

pub struct Checkin<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Checkin<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn check_in(
    &self,
    user_id: Option<&str>,
    event_id: &str,
    code: &str,
  ) -> Result<Result<CheckedIn, Rejection>> {
    self.check_in_at(user_id, event_id, code, now()).await
  }

  /// Checks run in a fixed order so that callers without a session learn
  /// nothing about the event.
  pub async fn check_in_at(
    &self,
    user_id: Option<&str>,
    event_id: &str,
    code: &str,
    now: DateTime,
  ) -> Result<Result<CheckedIn, Rejection>> {
    let Some(user_id) = user_id else {
      return Ok(Err(Rejection::NotAuthenticated));
    };

    let Some(event) = sv::Event::new(self.db).by_id(event_id).await? else {
      return Ok(Err(Rejection::EventNotFound));
    };

    if !event.is_active_at(now) {
      return Ok(Err(Rejection::EventNotActive));
    }

    if let Err(rejection) = qr::verify(&event, code, now) {
      return Ok(Err(rejection));
    }

    let reference = Reference::Event(event.id.clone());
    let granted = match sv::Ledger::new(self.db)
      .award(user_id, MEETUP_ATTENDANCE, reference)
      .await?
    {
      Ok(granted) => granted,
      Err(Denied::AlreadyAwarded) => {
        return Ok(Err(Rejection::AlreadyCheckedIn));
      }
      Err(denied) => {
        return Err(Error::Internal(format!(
          "{MEETUP_ATTENDANCE} award refused for event {event_id}: {denied}"
        )));
      }
    };

    let total_xp = sv::Xp::new(self.db).total(user_id).await?;

    Ok(Ok(CheckedIn {
      xp_awarded: granted.xp_awarded,
      event_name: event.name,
      total_xp,
    }))
  }

  /// Event check-ins of `user_id`, newest first.
  pub async fn history(&self, user_id: &str) -> Result<Vec<UserCheckin>> {
    let mut checkins = Vec::new();

    for activity in sv::Ledger::new(self.db).by_user(user_id).await? {
      match activity.reference() {
        Some(Reference::Event(event_id)) => checkins.push((activity, event_id)),
        Some(Reference::None) => {}
        None => {
          return Err(Error::Internal(format!(
            "activity {} has a malformed reference",
            activity.id
          )));
        }
      }
    }

    if checkins.is_empty() {
      return Ok(Vec::new());
    }

    let ids: Vec<&str> = checkins.iter().map(|(_, id)| id.as_str()).collect();
    let names: HashMap<String, String> = event::Entity::find()
      .filter(event::Column::Id.is_in(ids))
      .all(self.db)
      .await?
      .into_iter()
      .map(|event| (event.id, event.name))
      .collect();

    let history = checkins
      .into_iter()
      .map(|(activity, event_id)| UserCheckin {
        activity_id: activity.id,
        event_name: names
          .get(&event_id)
          .cloned()
          .unwrap_or_else(|| "Unknown Event".to_owned()),
        event_id,
        xp_awarded: activity.xp_awarded,
        checked_in_at: activity.created_at,
      })
      .collect();

    Ok(history)
  }
}

#[cfg(test)]
mod tests {
  use futures::future;
  use sea_orm::sea_query::Expr;

  use super::*;
  use crate::{
    entity::activity_type,
    sv::testing::{self, at},
  };

  const BASE: &str = "https://club.example";

  async fn live_code(
    db: &DatabaseConnection,
    event_id: &str,
    now: DateTime,
  ) -> String {
    sv::Qr::new(db).active_token_at(event_id, BASE, now).await.unwrap();
    sv::Event::new(db)
      .by_id(event_id)
      .await
      .unwrap()
      .unwrap()
      .current_qr_secret
      .unwrap()
  }

  #[tokio::test]
  async fn test_checkin_scenario() {
    let db = testing::db().await;
    testing::user(&db, "u").await;
    let event = testing::event(&db, "E").await;
    let sv = Checkin::new(&db);

    let now = at(19, 0, 0);
    let code = live_code(&db, &event.id, now).await;

    let done = sv.check_in_at(Some("u"), &event.id, &code, now).await.unwrap();
    assert_eq!(
      done,
      Ok(CheckedIn { xp_awarded: 100, event_name: "E".into(), total_xp: 100 })
    );

    let retry = sv
      .check_in_at(Some("u"), &event.id, &code, now + TimeDelta::seconds(1))
      .await
      .unwrap();
    assert_eq!(retry, Err(Rejection::AlreadyCheckedIn));

    // 31s later the display rotates; the old code no longer matches.
    let later = now + TimeDelta::seconds(31);
    let fresh = live_code(&db, &event.id, later).await;
    assert_ne!(fresh, code);

    testing::user(&db, "v").await;
    let stale = sv.check_in_at(Some("v"), &event.id, &code, later).await.unwrap();
    assert_eq!(stale, Err(Rejection::InvalidCode));
  }

  #[tokio::test]
  async fn test_rejections_in_order() {
    let db = testing::db().await;
    testing::user(&db, "u").await;
    let event = testing::event(&db, "E").await;
    let sv = Checkin::new(&db);
    let now = at(19, 0, 0);

    assert_eq!(
      sv.check_in_at(None, "missing", "x", now).await.unwrap(),
      Err(Rejection::NotAuthenticated)
    );
    assert_eq!(
      sv.check_in_at(Some("u"), "missing", "x", now).await.unwrap(),
      Err(Rejection::EventNotFound)
    );

    let code = live_code(&db, &event.id, now).await;
    assert_eq!(
      sv.check_in_at(Some("u"), &event.id, &code, at(21, 0, 1)).await.unwrap(),
      Err(Rejection::EventNotActive)
    );
    assert_eq!(
      sv.check_in_at(Some("u"), &event.id, "wrong", now).await.unwrap(),
      Err(Rejection::InvalidCode)
    );
  }

  #[tokio::test]
  async fn test_correct_but_expired_code() {
    let db = testing::db().await;
    testing::user(&db, "u").await;
    let event = testing::event(&db, "E").await;
    let now = at(19, 0, 0);
    let code = live_code(&db, &event.id, now).await;

    // A display that cached the code past its expiry, before any rotation.
    let res = Checkin::new(&db)
      .check_in_at(Some("u"), &event.id, &code, now + TimeDelta::seconds(45))
      .await
      .unwrap();
    assert_eq!(res, Err(Rejection::CodeExpired));
  }

  #[tokio::test]
  async fn test_window_edges() {
    let db = testing::db().await;
    testing::user(&db, "start").await;
    testing::user(&db, "end").await;
    let event = testing::event(&db, "E").await;
    let sv = Checkin::new(&db);

    let code = live_code(&db, &event.id, event.starts_at).await;
    let res = sv
      .check_in_at(Some("start"), &event.id, &code, event.starts_at)
      .await
      .unwrap();
    assert!(res.is_ok());

    let code = live_code(&db, &event.id, event.ends_at).await;
    let res = sv
      .check_in_at(Some("end"), &event.id, &code, event.ends_at)
      .await
      .unwrap();
    assert!(res.is_ok());
  }

  #[tokio::test]
  async fn test_misconfigured_catalog_is_fatal() {
    let db = testing::db().await;
    testing::user(&db, "u").await;
    let event = testing::event(&db, "E").await;
    let now = at(19, 0, 0);
    let code = live_code(&db, &event.id, now).await;

    activity_type::Entity::update_many()
      .col_expr(activity_type::Column::IsActive, Expr::value(false))
      .exec(&db)
      .await
      .unwrap();

    let res =
      Checkin::new(&db).check_in_at(Some("u"), &event.id, &code, now).await;
    assert!(matches!(res, Err(Error::Internal(_))));
  }

  #[tokio::test]
  async fn test_concurrent_checkins_award_once() {
    let dir = tempfile::tempdir().unwrap();
    let url =
      format!("sqlite://{}?mode=rwc", dir.path().join("checkin.db").display());
    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    testing::user(&db, "u").await;
    let event = testing::event(&db, "E").await;
    let now = at(19, 0, 0);
    let code = live_code(&db, &event.id, now).await;

    let attempts = (0..8).map(|_| {
      let (db, event_id, code) = (db.clone(), event.id.clone(), code.clone());
      tokio::spawn(async move {
        Checkin::new(&db).check_in_at(Some("u"), &event_id, &code, now).await
      })
    });

    let outcomes: Vec<_> = future::join_all(attempts)
      .await
      .into_iter()
      .map(|joined| joined.unwrap().unwrap())
      .collect();

    assert_eq!(outcomes.iter().filter(|o| o.is_ok()).count(), 1);
    assert!(
      outcomes
        .iter()
        .filter(|o| o.is_err())
        .all(|o| *o == Err(Rejection::AlreadyCheckedIn))
    );
    assert_eq!(sv::Xp::new(&db).total("u").await.unwrap(), 100);
  }

  #[tokio::test]
  async fn test_history_names_events() {
    let db = testing::db().await;
    testing::user(&db, "u").await;
    let kept = testing::event(&db, "Kept").await;
    let gone = testing::event(&db, "Gone").await;
    let sv = Checkin::new(&db);
    let now = at(19, 0, 0);

    for event in [&kept, &gone] {
      let code = live_code(&db, &event.id, now).await;
      sv.check_in_at(Some("u"), &event.id, &code, now)
        .await
        .unwrap()
        .unwrap();
    }
    sv::Ledger::new(&db)
      .award("u", MEETUP_ATTENDANCE, Reference::None)
      .await
      .unwrap()
      .unwrap();
    sv::Event::new(&db).delete(&gone.id).await.unwrap();

    let mut history = sv.history("u").await.unwrap();
    history.sort_by(|a, b| a.event_name.cmp(&b.event_name));

    let names: Vec<_> = history.iter().map(|c| c.event_name.as_str()).collect();
    assert_eq!(names, ["Kept", "Unknown Event"]);
    assert_eq!(history[1].event_id, gone.id);
    assert!(history.iter().all(|c| c.xp_awarded == 100));
  }
}

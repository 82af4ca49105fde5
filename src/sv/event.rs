use serde::Deserialize;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
  entity::event::{
    self, DEFAULT_ROTATION_SECONDS, MAX_ROTATION_SECONDS, MIN_ROTATION_SECONDS,
  },
  prelude::*,
};

type Utc3339 = chrono::DateTime<Utc>;

fn default_rotation() -> i32 {
  DEFAULT_ROTATION_SECONDS
}

/// Body of `POST /events`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "ends_after_start"))]
pub struct EventForm {
  #[validate(length(min = 1, max = 200))]
  pub name: String,
  #[validate(length(max = 2000))]
  pub description: Option<String>,
  #[validate(length(max = 500))]
  pub location: Option<String>,
  pub starts_at: Utc3339,
  pub ends_at: Utc3339,
  #[serde(default = "default_rotation")]
  #[validate(range(min = MIN_ROTATION_SECONDS, max = MAX_ROTATION_SECONDS))]
  pub qr_rotation_seconds: i32,
}

fn ends_after_start(form: &EventForm) -> Result<(), ValidationError> {
  check_window(form.starts_at.naive_utc(), form.ends_at.naive_utc())
}

fn check_window(
  starts_at: DateTime,
  ends_at: DateTime,
) -> Result<(), ValidationError> {
  if ends_at > starts_at {
    Ok(())
  } else {
    Err(
      ValidationError::new("ends_at")
        .with_message("End time must be after start time".into()),
    )
  }
}

/// Body of `PATCH /events/{id}`. The merged event must still end after it
/// starts.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct EventPatch {
  #[validate(length(min = 1, max = 200))]
  pub name: Option<String>,
  #[validate(length(max = 2000))]
  pub description: Option<String>,
  #[validate(length(max = 500))]
  pub location: Option<String>,
  pub starts_at: Option<Utc3339>,
  pub ends_at: Option<Utc3339>,
  #[validate(range(min = MIN_ROTATION_SECONDS, max = MAX_ROTATION_SECONDS))]
  pub qr_rotation_seconds: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
  pub name: String,
  pub description: Option<String>,
  pub location: Option<String>,
  pub starts_at: DateTime,
  pub ends_at: DateTime,
  pub qr_rotation_seconds: i32,
}

impl From<EventForm> for NewEvent {
  fn from(form: EventForm) -> Self {
    Self {
      name: form.name,
      description: form.description,
      location: form.location,
      starts_at: form.starts_at.naive_utc(),
      ends_at: form.ends_at.naive_utc(),
      qr_rotation_seconds: form.qr_rotation_seconds,
    }
  }
}

pub struct Event<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Event<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn create(
    &self,
    form: EventForm,
    created_by: &str,
  ) -> Result<event::Model> {
    form.validate()?;
    self.insert(form.into(), created_by, now()).await
  }

  pub(crate) async fn insert(
    &self,
    new: NewEvent,
    created_by: &str,
    now: DateTime,
  ) -> Result<event::Model> {
    let event = event::ActiveModel {
      id: Set(Uuid::new_v4().to_string()),
      name: Set(new.name),
      description: Set(new.description),
      location: Set(new.location),
      starts_at: Set(new.starts_at),
      ends_at: Set(new.ends_at),
      qr_rotation_seconds: Set(new.qr_rotation_seconds),
      current_qr_secret: Set(None),
      qr_expires_at: Set(None),
      created_by: Set(created_by.to_owned()),
      created_at: Set(now),
      updated_at: Set(now),
    };

    let event = event.insert(self.db).await?;
    info!(event_id = %event.id, name = %event.name, "Event created");
    Ok(event)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<event::Model>> {
    Ok(event::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn all(&self) -> Result<Vec<event::Model>> {
    let events = event::Entity::find()
      .order_by_asc(event::Column::StartsAt)
      .all(self.db)
      .await?;
    Ok(events)
  }

  /// Events whose window contains `now`, ends inclusive.
  pub async fn active_at(&self, now: DateTime) -> Result<Vec<event::Model>> {
    let events = event::Entity::find()
      .filter(event::Column::StartsAt.lte(now))
      .filter(event::Column::EndsAt.gte(now))
      .order_by_asc(event::Column::StartsAt)
      .all(self.db)
      .await?;
    Ok(events)
  }

  pub async fn update(
    &self,
    id: &str,
    patch: EventPatch,
  ) -> Result<event::Model> {
    patch.validate()?;

    let event = self.by_id(id).await?.ok_or(Error::EventNotFound)?;

    let starts_at =
      patch.starts_at.map(|t| t.naive_utc()).unwrap_or(event.starts_at);
    let ends_at = patch.ends_at.map(|t| t.naive_utc()).unwrap_or(event.ends_at);
    check_window(starts_at, ends_at)
      .map_err(|err| Error::Validation(err.to_string()))?;

    let mut model: event::ActiveModel = event.into();
    if let Some(name) = patch.name {
      model.name = Set(name);
    }
    if let Some(description) = patch.description {
      model.description = Set(Some(description));
    }
    if let Some(location) = patch.location {
      model.location = Set(Some(location));
    }
    if let Some(seconds) = patch.qr_rotation_seconds {
      model.qr_rotation_seconds = Set(seconds);
    }
    model.starts_at = Set(starts_at);
    model.ends_at = Set(ends_at);
    model.updated_at = Set(now());

    Ok(model.update(self.db).await?)
  }

  /// `false` when there was nothing to delete.
  pub async fn delete(&self, id: &str) -> Result<bool> {
    let res = event::Entity::delete_by_id(id).exec(self.db).await?;
    if res.rows_affected > 0 {
      info!(event_id = id, "Event deleted");
    }
    Ok(res.rows_affected > 0)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::testing::{self, at};

  fn form(json: json::Value) -> EventForm {
    json::from_value(json).unwrap()
  }

  #[tokio::test]
  async fn test_create_event_defaults_rotation() {
    let db = testing::db().await;
    let admin = testing::admin(&db, "a1").await;

    let event = Event::new(&db)
      .create(
        form(json::json!({
          "name": "Rust meetup",
          "startsAt": "2026-03-14T18:00:00Z",
          "endsAt": "2026-03-14T21:00:00Z",
        })),
        &admin.id,
      )
      .await
      .unwrap();

    assert_eq!(event.qr_rotation_seconds, 30);
    assert_eq!(event.starts_at, at(18, 0, 0));
    assert!(event.current_qr_secret.is_none());
    assert!(event.qr_expires_at.is_none());
  }

  #[tokio::test]
  async fn test_create_rejects_bad_forms() {
    let db = testing::db().await;
    let admin = testing::admin(&db, "a1").await;
    let sv = Event::new(&db);

    let backwards = form(json::json!({
      "name": "Backwards",
      "startsAt": "2026-03-14T21:00:00Z",
      "endsAt": "2026-03-14T18:00:00Z",
    }));
    let empty_name = form(json::json!({
      "name": "",
      "startsAt": "2026-03-14T18:00:00Z",
      "endsAt": "2026-03-14T21:00:00Z",
    }));
    let fast_rotation = form(json::json!({
      "name": "Fast",
      "startsAt": "2026-03-14T18:00:00Z",
      "endsAt": "2026-03-14T21:00:00Z",
      "qrRotationSeconds": 5,
    }));

    for bad in [backwards, empty_name, fast_rotation] {
      assert!(matches!(
        sv.create(bad, &admin.id).await,
        Err(Error::Validation(_))
      ));
    }
    assert!(sv.all().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_update_checks_merged_window() {
    let db = testing::db().await;
    let event = testing::event(&db, "Meetup").await;
    let sv = Event::new(&db);

    let res = sv
      .update(&event.id, EventPatch {
        ends_at: Some(at(17, 0, 0).and_utc()),
        ..Default::default()
      })
      .await;
    assert!(matches!(res, Err(Error::Validation(_))));

    let updated = sv
      .update(&event.id, EventPatch {
        name: Some("Renamed".into()),
        ends_at: Some(at(22, 0, 0).and_utc()),
        ..Default::default()
      })
      .await
      .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.ends_at, at(22, 0, 0));
    assert_eq!(updated.starts_at, event.starts_at);
  }

  #[tokio::test]
  async fn test_update_missing_event() {
    let db = testing::db().await;

    let res = Event::new(&db).update("nope", EventPatch::default()).await;
    assert!(matches!(res, Err(Error::EventNotFound)));
  }

  #[tokio::test]
  async fn test_active_at_is_inclusive() {
    let db = testing::db().await;
    let event = testing::event(&db, "Meetup").await;
    let sv = Event::new(&db);

    assert_eq!(sv.active_at(at(18, 0, 0)).await.unwrap().len(), 1);
    assert_eq!(sv.active_at(at(21, 0, 0)).await.unwrap().len(), 1);
    assert!(sv.active_at(at(21, 0, 1)).await.unwrap().is_empty());
    assert_eq!(sv.all().await.unwrap()[0].id, event.id);
  }

  #[tokio::test]
  async fn test_delete_event() {
    let db = testing::db().await;
    let event = testing::event(&db, "Meetup").await;
    let sv = Event::new(&db);

    assert!(sv.delete(&event.id).await.unwrap());
    assert!(!sv.delete(&event.id).await.unwrap());
    assert!(sv.by_id(&event.id).await.unwrap().is_none());
  }
}

use serde::Deserialize;
use validator::Validate;

use crate::{entity::activity_type, prelude::*};

/// Admin edit of a catalog entry. Absent fields are left untouched.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ActivityTypePatch {
  #[validate(length(min = 1, max = 100))]
  pub name: Option<String>,
  #[validate(length(max = 500))]
  pub description: Option<String>,
  #[validate(range(min = 0))]
  pub xp_value: Option<i64>,
  pub is_active: Option<bool>,
}

pub struct ActivityType<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> ActivityType<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_code(
    &self,
    code: &str,
  ) -> Result<Option<activity_type::Model>> {
    let ty = activity_type::Entity::find()
      .filter(activity_type::Column::Code.eq(code))
      .one(self.db)
      .await?;
    Ok(ty)
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<activity_type::Model>> {
    Ok(activity_type::Entity::find_by_id(id).one(self.db).await?)
  }

  pub async fn all(&self) -> Result<Vec<activity_type::Model>> {
    let types = activity_type::Entity::find()
      .order_by_asc(activity_type::Column::Code)
      .all(self.db)
      .await?;
    Ok(types)
  }

  pub async fn update(
    &self,
    id: &str,
    patch: ActivityTypePatch,
  ) -> Result<activity_type::Model> {
    patch.validate()?;

    let ty = self.by_id(id).await?.ok_or(Error::ActivityTypeNotFound)?;
    let mut model: activity_type::ActiveModel = ty.into();

    if let Some(name) = patch.name {
      model.name = Set(name);
    }
    if let Some(description) = patch.description {
      model.description = Set(Some(description));
    }
    if let Some(xp_value) = patch.xp_value {
      model.xp_value = Set(xp_value);
    }
    if let Some(is_active) = patch.is_active {
      model.is_active = Set(is_active);
    }
    model.updated_at = Set(now());

    let ty = model.update(self.db).await?;
    info!(
      code = %ty.code,
      xp = ty.xp_value,
      active = ty.is_active,
      "Activity type updated"
    );
    Ok(ty)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{entity::activity_type::MEETUP_ATTENDANCE, sv::testing};

  #[tokio::test]
  async fn test_meetup_attendance_is_seeded() {
    let db = testing::db().await;

    let ty = ActivityType::new(&db)
      .by_code(MEETUP_ATTENDANCE)
      .await
      .unwrap()
      .expect("seeded by migration");

    assert_eq!(ty.xp_value, 100);
    assert!(ty.is_active);
  }

  #[tokio::test]
  async fn test_update_activity_type() {
    let db = testing::db().await;
    let sv = ActivityType::new(&db);
    let ty = sv.by_code(MEETUP_ATTENDANCE).await.unwrap().unwrap();

    let updated = sv
      .update(&ty.id, ActivityTypePatch {
        xp_value: Some(250),
        is_active: Some(false),
        ..Default::default()
      })
      .await
      .unwrap();

    assert_eq!(updated.xp_value, 250);
    assert!(!updated.is_active);
    assert_eq!(updated.name, ty.name);
  }

  #[tokio::test]
  async fn test_update_rejects_negative_xp() {
    let db = testing::db().await;
    let sv = ActivityType::new(&db);
    let ty = sv.by_code(MEETUP_ATTENDANCE).await.unwrap().unwrap();

    let res = sv
      .update(&ty.id, ActivityTypePatch {
        xp_value: Some(-5),
        ..Default::default()
      })
      .await;

    assert!(matches!(res, Err(Error::Validation(_))));
  }

  #[tokio::test]
  async fn test_update_unknown_type() {
    let db = testing::db().await;

    let res = ActivityType::new(&db)
      .update("nope", ActivityTypePatch::default())
      .await;

    assert!(matches!(res, Err(Error::ActivityTypeNotFound)));
  }
}

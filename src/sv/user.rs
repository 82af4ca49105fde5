use sea_orm::sea_query::OnConflict;

use crate::{entity::user, prelude::*};

pub struct User<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> User<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Inserts a user with an explicit admin flag. Sessions register through
  /// `get_or_create` instead.
  #[cfg(test)]
  pub async fn create(
    &self,
    id: &str,
    name: &str,
    email: &str,
    is_admin: bool,
  ) -> Result<user::Model> {
    let user = user::ActiveModel {
      id: Set(id.to_owned()),
      name: Set(name.to_owned()),
      email: Set(email.to_owned()),
      is_admin: Set(is_admin),
      created_at: Set(now()),
    };

    Ok(user.insert(self.db).await?)
  }

  /// Mirrors an identity-provider account on first sight. Later sessions
  /// refresh the display name and email.
  ///
  /// Registration is a single upsert keyed by id, so concurrent first
  /// requests of one account all resolve to the same row. Emails are not
  /// unique; the provider's subject is the only identity.
  pub async fn get_or_create(
    &self,
    id: &str,
    name: &str,
    email: &str,
  ) -> Result<user::Model> {
    if let Some(user) = self.by_id(id).await?
      && user.name == name
      && user.email == email
    {
      return Ok(user);
    }

    let user = user::ActiveModel {
      id: Set(id.to_owned()),
      name: Set(name.to_owned()),
      email: Set(email.to_owned()),
      is_admin: Set(false),
      created_at: Set(now()),
    };

    user::Entity::insert(user)
      .on_conflict(
        OnConflict::column(user::Column::Id)
          .update_columns([user::Column::Name, user::Column::Email])
          .to_owned(),
      )
      .exec_without_returning(self.db)
      .await?;
    debug!(user_id = id, "Session user registered or refreshed");

    self.by_id(id).await?.ok_or_else(|| {
      Error::Internal(format!("user {id} missing right after upsert"))
    })
  }

  pub async fn by_id(&self, id: &str) -> Result<Option<user::Model>> {
    Ok(user::Entity::find_by_id(id).one(self.db).await?)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::sv::testing;

  #[tokio::test]
  async fn test_get_or_create_registers_once() {
    let db = testing::db().await;
    let sv = User::new(&db);

    let first = sv.get_or_create("u1", "Ada", "ada@example.com").await.unwrap();
    let again = sv.get_or_create("u1", "Ada", "ada@example.com").await.unwrap();

    assert_eq!(first, again);
    assert!(!first.is_admin);
  }

  #[tokio::test]
  async fn test_get_or_create_refreshes_profile() {
    let db = testing::db().await;
    let sv = User::new(&db);

    sv.get_or_create("u1", "Ada", "ada@example.com").await.unwrap();
    let user =
      sv.get_or_create("u1", "Ada L.", "ada@lovelace.dev").await.unwrap();

    assert_eq!(user.name, "Ada L.");
    assert_eq!(sv.by_id("u1").await.unwrap().unwrap().email, "ada@lovelace.dev");
  }

  #[tokio::test]
  async fn test_refresh_keeps_admin_flag() {
    let db = testing::db().await;
    testing::admin(&db, "boss").await;

    let user = User::new(&db)
      .get_or_create("boss", "The Boss", "boss@club.example")
      .await
      .unwrap();

    assert!(user.is_admin);
    assert_eq!(user.name, "The Boss");
  }

  #[tokio::test]
  async fn test_accounts_may_share_an_email() {
    let db = testing::db().await;
    let sv = User::new(&db);

    sv.get_or_create("old", "Ann", "ann@example.com").await.unwrap();
    let new = sv.get_or_create("new", "Ann", "ann@example.com").await.unwrap();
    assert_eq!(new.id, "new");

    sv.get_or_create("other", "Bo", "bo@example.com").await.unwrap();
    let moved =
      sv.get_or_create("other", "Bo", "ann@example.com").await.unwrap();
    assert_eq!(moved.email, "ann@example.com");
  }

  #[tokio::test]
  async fn test_concurrent_first_sessions_register_once() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("users.db");
    let url = format!("sqlite://{}?mode=rwc", path.display());
    let db = Database::connect(&url).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    for round in 0..10 {
      let id = format!("new{round}");
      let attempts = (0..4).map(|_| {
        let (db, id) = (db.clone(), id.clone());
        tokio::spawn(async move {
          User::new(&db).get_or_create(&id, "Newcomer", "new@example.com").await
        })
      });

      for joined in futures::future::join_all(attempts).await {
        let user = joined.unwrap().unwrap();
        assert_eq!(user.id, id);
      }
    }

    let users = user::Entity::find().all(&db).await.unwrap();
    assert_eq!(users.len(), 10);
  }
}

pub mod activity_type;
pub mod checkin;
pub mod event;
pub mod ledger;
pub mod qr;
pub mod user;
pub mod xp;

pub use activity_type::ActivityType;
pub use checkin::Checkin;
pub use event::Event;
pub use ledger::Ledger;
pub use qr::Qr;
pub use user::User;
pub use xp::Xp;

#[cfg(test)]
pub mod testing {
  use chrono::NaiveDate;

  use crate::{entity::*, prelude::*, sv};

  /// Fresh in-memory database with the full schema and seed data.
  pub async fn db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db
  }

  pub fn at(h: u32, m: u32, s: u32) -> DateTime {
    NaiveDate::from_ymd_opt(2026, 3, 14).unwrap().and_hms_opt(h, m, s).unwrap()
  }

  pub async fn user(db: &DatabaseConnection, id: &str) -> user::Model {
    sv::User::new(db)
      .create(id, &format!("User {id}"), &format!("{id}@example.com"), false)
      .await
      .unwrap()
  }

  pub async fn admin(db: &DatabaseConnection, id: &str) -> user::Model {
    sv::User::new(db)
      .create(id, &format!("Admin {id}"), &format!("{id}@example.com"), true)
      .await
      .unwrap()
  }

  /// An 18:00-21:00 event with a 30 second rotation.
  pub async fn event(db: &DatabaseConnection, name: &str) -> event::Model {
    let creator = match sv::User::new(db).by_id("organizer").await.unwrap() {
      Some(user) => user,
      None => admin(db, "organizer").await,
    };

    sv::Event::new(db)
      .insert(
        sv::event::NewEvent {
          name: name.to_owned(),
          description: None,
          location: Some("Hackerspace".to_owned()),
          starts_at: at(18, 0, 0),
          ends_at: at(21, 0, 0),
          qr_rotation_seconds: event::DEFAULT_ROTATION_SECONDS,
        },
        &creator.id,
        at(9, 0, 0),
      )
      .await
      .unwrap()
  }
}

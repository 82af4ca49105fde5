pub use sea_orm_migration::prelude::*;

mod m20260101_000001_create_users;
mod m20260101_000002_create_activity_types;
mod m20260101_000003_create_events;
mod m20260101_000004_create_user_activities;
mod m20260101_000005_create_user_xp_cache;
mod m20260102_000006_seed_activity_types;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
  fn migrations() -> Vec<Box<dyn MigrationTrait>> {
    vec![
      Box::new(m20260101_000001_create_users::Migration),
      Box::new(m20260101_000002_create_activity_types::Migration),
      Box::new(m20260101_000003_create_events::Migration),
      Box::new(m20260101_000004_create_user_activities::Migration),
      Box::new(m20260101_000005_create_user_xp_cache::Migration),
      Box::new(m20260102_000006_seed_activity_types::Migration),
    ]
  }
}

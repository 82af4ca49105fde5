use sea_orm_migration::prelude::*;

use super::m20260101_000001_create_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(UserXpCache::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserXpCache::UserId)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(
            ColumnDef::new(UserXpCache::TotalXp)
              .big_integer()
              .not_null()
              .default(0),
          )
          .col(
            ColumnDef::new(UserXpCache::LastCalculatedAt)
              .date_time()
              .not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_xp_cache_user")
              .from(UserXpCache::Table, UserXpCache::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(UserXpCache::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum UserXpCache {
  Table,
  UserId,
  TotalXp,
  LastCalculatedAt,
}

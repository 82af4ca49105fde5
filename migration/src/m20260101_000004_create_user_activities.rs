use sea_orm_migration::prelude::*;

use super::{
  m20260101_000001_create_users::Users,
  m20260101_000002_create_activity_types::ActivityTypes,
};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(UserActivities::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(UserActivities::Id)
              .string()
              .not_null()
              .primary_key(),
          )
          .col(ColumnDef::new(UserActivities::UserId).string().not_null())
          .col(
            ColumnDef::new(UserActivities::ActivityTypeId).string().not_null(),
          )
          .col(ColumnDef::new(UserActivities::ReferenceId).string().null())
          .col(ColumnDef::new(UserActivities::ReferenceType).string().null())
          .col(
            ColumnDef::new(UserActivities::XpAwarded).big_integer().not_null(),
          )
          .col(
            ColumnDef::new(UserActivities::CreatedAt).date_time().not_null(),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_activities_user")
              .from(UserActivities::Table, UserActivities::UserId)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .foreign_key(
            ForeignKey::create()
              .name("fk_user_activities_type")
              .from(UserActivities::Table, UserActivities::ActivityTypeId)
              .to(ActivityTypes::Table, ActivityTypes::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    // At most one award per (user, reference). NULL references never collide.
    manager
      .create_index(
        Index::create()
          .name("idx_user_activities_unique")
          .table(UserActivities::Table)
          .col(UserActivities::UserId)
          .col(UserActivities::ReferenceId)
          .col(UserActivities::ReferenceType)
          .unique()
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_user_activities_user")
          .table(UserActivities::Table)
          .col(UserActivities::UserId)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(UserActivities::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum UserActivities {
  Table,
  Id,
  UserId,
  ActivityTypeId,
  ReferenceId,
  ReferenceType,
  XpAwarded,
  CreatedAt,
}

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
          .table(Events::Table)
          .if_not_exists()
          .col(ColumnDef::new(Events::Id).string().not_null().primary_key())
          .col(ColumnDef::new(Events::Name).string().not_null())
          .col(ColumnDef::new(Events::Description).string().null())
          .col(ColumnDef::new(Events::Location).string().null())
          .col(ColumnDef::new(Events::StartsAt).date_time().not_null())
          .col(ColumnDef::new(Events::EndsAt).date_time().not_null())
          .col(
            ColumnDef::new(Events::QrRotationSeconds)
              .integer()
              .not_null()
              .default(30),
          )
          .col(ColumnDef::new(Events::CurrentQrSecret).string().null())
          .col(ColumnDef::new(Events::QrExpiresAt).date_time().null())
          .col(ColumnDef::new(Events::CreatedBy).string().not_null())
          .col(ColumnDef::new(Events::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(Events::UpdatedAt).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_events_creator")
              .from(Events::Table, Events::CreatedBy)
              .to(Users::Table, Users::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_events_starts_at")
          .table(Events::Table)
          .col(Events::StartsAt)
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_events_ends_at")
          .table(Events::Table)
          .col(Events::EndsAt)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Events::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Events {
  Table,
  Id,
  Name,
  Description,
  Location,
  StartsAt,
  EndsAt,
  QrRotationSeconds,
  CurrentQrSecret,
  QrExpiresAt,
  CreatedBy,
  CreatedAt,
  UpdatedAt,
}

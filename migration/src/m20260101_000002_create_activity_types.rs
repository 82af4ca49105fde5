use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(ActivityTypes::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(ActivityTypes::Id).string().not_null().primary_key(),
          )
          .col(ColumnDef::new(ActivityTypes::Code).string().not_null())
          .col(ColumnDef::new(ActivityTypes::Name).string().not_null())
          .col(ColumnDef::new(ActivityTypes::Description).string().null())
          .col(ColumnDef::new(ActivityTypes::XpValue).big_integer().not_null())
          .col(
            ColumnDef::new(ActivityTypes::IsActive)
              .boolean()
              .not_null()
              .default(true),
          )
          .col(ColumnDef::new(ActivityTypes::CreatedAt).date_time().not_null())
          .col(ColumnDef::new(ActivityTypes::UpdatedAt).date_time().not_null())
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_activity_types_code")
          .table(ActivityTypes::Table)
          .col(ActivityTypes::Code)
          .unique()
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .drop_table(Table::drop().table(ActivityTypes::Table).to_owned())
      .await
  }
}

#[derive(DeriveIden)]
pub enum ActivityTypes {
  Table,
  Id,
  Code,
  Name,
  Description,
  XpValue,
  IsActive,
  CreatedAt,
  UpdatedAt,
}

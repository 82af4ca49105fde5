use sea_orm_migration::prelude::*;

use super::m20260101_000002_create_activity_types::ActivityTypes;

const MEETUP_ATTENDANCE_ID: &str = "at_meetup_attendance";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let insert = Query::insert()
      .into_table(ActivityTypes::Table)
      .columns([
        ActivityTypes::Id,
        ActivityTypes::Code,
        ActivityTypes::Name,
        ActivityTypes::Description,
        ActivityTypes::XpValue,
        ActivityTypes::IsActive,
        ActivityTypes::CreatedAt,
        ActivityTypes::UpdatedAt,
      ])
      .values_panic([
        MEETUP_ATTENDANCE_ID.into(),
        "MEETUP_ATTENDANCE".into(),
        "Meetup attendance".into(),
        "Checked in to a meetup by scanning its QR code".into(),
        100i64.into(),
        true.into(),
        Expr::current_timestamp().into(),
        Expr::current_timestamp().into(),
      ])
      .on_conflict(
        OnConflict::column(ActivityTypes::Code).do_nothing().to_owned(),
      )
      .to_owned();

    manager.exec_stmt(insert).await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    let delete = Query::delete()
      .from_table(ActivityTypes::Table)
      .and_where(Expr::col(ActivityTypes::Id).eq(MEETUP_ATTENDANCE_ID))
      .to_owned();

    manager.exec_stmt(delete).await
  }
}

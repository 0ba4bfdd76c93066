use sea_orm_migration::prelude::*;

use super::m20261018_000001_create_builds::Builds;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
  async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager
      .create_table(
        Table::create()
          .table(Releases::Table)
          .if_not_exists()
          .col(
            ColumnDef::new(Releases::Id)
              .integer()
              .not_null()
              .auto_increment()
              .primary_key(),
          )
          .col(ColumnDef::new(Releases::BuildId).integer().not_null())
          .col(ColumnDef::new(Releases::Name).string_len(255).not_null())
          .col(ColumnDef::new(Releases::Number).integer().not_null())
          .col(ColumnDef::new(Releases::Created).date_time().not_null())
          .foreign_key(
            ForeignKey::create()
              .name("fk_releases_build")
              .from(Releases::Table, Releases::BuildId)
              .to(Builds::Table, Builds::Id)
              .on_delete(ForeignKeyAction::Cascade),
          )
          .to_owned(),
      )
      .await?;

    manager
      .create_index(
        Index::create()
          .name("idx_releases_build_name")
          .table(Releases::Table)
          .col(Releases::BuildId)
          .col(Releases::Name)
          .to_owned(),
      )
      .await
  }

  async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
    manager.drop_table(Table::drop().table(Releases::Table).to_owned()).await
  }
}

#[derive(DeriveIden)]
pub enum Releases {
  Table,
  Id,
  BuildId,
  Name,
  Number,
  Created,
}

//! A release candidate of a build. Releases sharing a `name` form the
//! version history of that name, numbered from 1 upwards.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::build;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "releases")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub build_id: i32,
  pub name: String,
  pub number: i32,
  pub created: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(
    belongs_to = "build::Entity",
    from = "Column::BuildId",
    to = "build::Column::Id",
    on_delete = "Cascade"
  )]
  Build,
}

impl Related<build::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Build.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

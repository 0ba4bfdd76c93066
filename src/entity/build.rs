//! A build: the top-level thing a user tracks releases for.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "builds")]
pub struct Model {
  #[sea_orm(primary_key)]
  pub id: i32,
  pub name: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
  #[sea_orm(has_many = "super::release::Entity")]
  Release,
}

impl Related<super::release::Entity> for Entity {
  fn to() -> RelationDef {
    Relation::Release.def()
  }
}

impl ActiveModelBehavior for ActiveModel {}

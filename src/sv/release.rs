use sea_orm::sea_query::Expr;

use crate::{entity::*, prelude::*};

pub struct Release<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Release<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  /// Every release of a build, highest number first.
  pub async fn by_build(&self, build_id: i32) -> Result<Vec<release::Model>> {
    let releases = release::Entity::find()
      .filter(release::Column::BuildId.eq(build_id))
      .order_by_desc(release::Column::Number)
      .all(self.db)
      .await?;
    Ok(releases)
  }

  /// Records the next candidate of `name`, numbered after the latest one.
  pub async fn create(
    &self,
    build_id: i32,
    name: &str,
  ) -> Result<release::Model> {
    let txn = self.db.begin().await?;

    let latest: Option<i32> = release::Entity::find()
      .select_only()
      .column_as(Expr::col(release::Column::Number).max(), "number")
      .filter(release::Column::BuildId.eq(build_id))
      .filter(release::Column::Name.eq(name))
      .into_tuple::<Option<i32>>()
      .one(&txn)
      .await?
      .flatten();

    let release = release::ActiveModel {
      id: NotSet,
      build_id: Set(build_id),
      name: Set(name.to_string()),
      number: Set(latest.unwrap_or(0) + 1),
      created: Set(Utc::now().naive_utc()),
    }
    .insert(&txn)
    .await?;

    txn.commit().await?;

    info!(
      "Created release: build_id={}, name={:?}, number={}",
      release.build_id, release.name, release.number
    );
    Ok(release)
  }
}

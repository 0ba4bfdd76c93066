use crate::{
  entity::*,
  forms::NewBuild,
  prelude::*,
  releases::{self, Releases},
  sv,
};

pub struct Build<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Build<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn by_id(&self, id: i32) -> Result<Option<build::Model>> {
    let build = build::Entity::find_by_id(id).one(self.db).await?;
    Ok(build)
  }

  pub async fn create(&self, new: NewBuild) -> Result<build::Model> {
    let build = build::ActiveModel { id: NotSet, name: Set(new.name) };
    Ok(build.insert(self.db).await?)
  }

  /// Most recently created builds first.
  pub async fn recent(&self, limit: u64) -> Result<Vec<build::Model>> {
    let builds = build::Entity::find()
      .order_by_desc(build::Column::Id)
      .limit(limit)
      .all(self.db)
      .await?;
    Ok(builds)
  }

  /// Build together with its releases collated for display.
  pub async fn view(&self, id: i32) -> Result<(build::Model, Releases)> {
    let build = self.by_id(id).await?.ok_or(Error::BuildNotFound)?;
    let candidates = sv::Release::new(self.db).by_build(build.id).await?;

    debug!(build_id = build.id, count = candidates.len(), "Collating releases");
    Ok((build, releases::aggregate(candidates)))
  }
}

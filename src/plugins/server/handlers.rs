use std::{num::IntErrorKind, sync::Arc};

use axum::{
  Form, Json,
  extract::{Query, State},
  http::StatusCode,
  response::Redirect,
};
use serde::{Deserialize, Serialize};

use crate::{
  entity::{build, release},
  forms::{BUILD_FIELDS, BuildForm, Field, ReleaseForm},
  prelude::*,
  releases::Group,
  state::AppState,
};

const HOME_BUILDS: u64 = 20;

#[derive(Debug, Serialize)]
pub struct HomeView {
  pub builds: Vec<build::Model>,
}

pub async fn home(State(app): State<Arc<AppState>>) -> Result<Json<HomeView>> {
  let builds = app.sv().build.recent(HOME_BUILDS).await?;
  Ok(Json(HomeView { builds }))
}

#[derive(Debug, Serialize)]
pub struct BuildFormView {
  pub fields: &'static [Field],
}

pub async fn new_build_form() -> Json<BuildFormView> {
  Json(BuildFormView { fields: BUILD_FIELDS })
}

pub async fn new_build(
  State(app): State<Arc<AppState>>,
  Form(form): Form<BuildForm>,
) -> Result<Redirect> {
  let build = app.sv().build.create(form.validate()?).await?;

  info!(
    "Created build via UI: build_id={}, name={:?}",
    build.id, build.name
  );
  Ok(Redirect::to(&format!("/build?id={}", build.id)))
}

#[derive(Debug, Deserialize)]
pub struct BuildQuery {
  pub id: Option<String>,
}

impl BuildQuery {
  fn build_id(&self) -> Result<i32> {
    let id = self
      .id
      .as_deref()
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .ok_or(Error::BadRequest("Missing build id"))?;

    match id.parse::<i64>() {
      Ok(id) if id > 0 => i32::try_from(id).map_err(|_| Error::BuildNotFound),
      Err(err) if *err.kind() == IntErrorKind::PosOverflow => {
        Err(Error::BuildNotFound)
      }
      _ => Err(Error::BadRequest("Invalid build id")),
    }
  }
}

#[derive(Debug, Serialize)]
pub struct BuildView {
  pub build: build::Model,
  pub releases: Vec<Group>,
}

pub async fn view_build(
  State(app): State<Arc<AppState>>,
  Query(query): Query<BuildQuery>,
) -> Result<Json<BuildView>> {
  let (build, releases) = app.sv().build.view(query.build_id()?).await?;
  Ok(Json(BuildView { build, releases: releases.into_groups() }))
}

/// Write path for the process that produces releases; numbers are assigned
/// per release name.
pub async fn create_release(
  State(app): State<Arc<AppState>>,
  Json(form): Json<ReleaseForm>,
) -> Result<(StatusCode, Json<release::Model>)> {
  let name = form.validate()?;

  let sv = app.sv();
  let build =
    sv.build.by_id(form.build_id).await?.ok_or(Error::BuildNotFound)?;
  let release = sv.release.create(build.id, &name).await?;

  Ok((StatusCode::CREATED, Json(release)))
}

pub async fn view_candidate() -> Json<json::Value> {
  Json(json::json!({ "view": "candidate" }))
}

pub async fn view_run() -> Json<json::Value> {
  Json(json::json!({ "view": "run" }))
}

pub async fn health() -> &'static str {
  "OK"
}

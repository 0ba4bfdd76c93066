mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{
  cors::{Any, CorsLayer},
  trace::TraceLayer,
};

use crate::{prelude::*, state::AppState};

/// The web frontend. The socket is bound once, up front, so a bad address
/// fails startup instead of a restart loop.
pub struct Plugin {
  listener: std::net::TcpListener,
}

impl Plugin {
  pub fn bind(addr: SocketAddr) -> anyhow::Result<Self> {
    let listener = std::net::TcpListener::bind(addr)
      .with_context(|| format!("Failed to bind {addr}"))?;
    listener.set_nonblocking(true)?;
    Ok(Self { listener })
  }

  pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
    Ok(self.listener.local_addr()?)
  }
}

/// Routes of the web frontend, without rate limiting.
pub fn router(app: Arc<AppState>) -> Router {
  Router::new()
    .route("/", get(handlers::home))
    .route("/new", get(handlers::new_build_form).post(handlers::new_build))
    .route("/build", get(handlers::view_build))
    .route("/candidate", get(handlers::view_candidate))
    .route("/run", get(handlers::view_run))
    .route("/api/release", post(handlers::create_release))
    .route("/health", get(handlers::health))
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(Any)
          .allow_methods(Any)
          .allow_headers(Any),
      ),
    )
    .with_state(app)
}

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let config = &app.config;

    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(config.rate_limit_per_second)
        .burst_size(config.rate_limit_burst)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();

    let router = router(app.clone())
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener =
      tokio::net::TcpListener::from_std(self.listener.try_clone()?)?;
    info!("HTTP Server listening on {}", listener.local_addr()?);

    let limiter = async {
      loop {
        tokio::time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
            Ok(_) => info!("Server stopped gracefully"),
            Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
  };
  use tower::ServiceExt;

  use super::*;
  use crate::state::{Config, tests::setup_test_db};

  async fn setup() -> (Router, Arc<AppState>) {
    let db = setup_test_db().await;
    let app = Arc::new(AppState::with_db(db, Config::default()));
    (router(app.clone()), app)
  }

  async fn send(
    router: &Router,
    req: Request<Body>,
  ) -> (StatusCode, Option<String>, json::Value) {
    let res = router.clone().oneshot(req).await.unwrap();

    let status = res.status();
    let location = res
      .headers()
      .get(header::LOCATION)
      .map(|value| value.to_str().unwrap().to_string());
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();

    (status, location, json::from_slice(&bytes).unwrap_or_default())
  }

  async fn get(router: &Router, uri: &str) -> (StatusCode, json::Value) {
    let req = Request::get(uri).body(Body::empty()).unwrap();
    let (status, _, body) = send(router, req).await;
    (status, body)
  }

  async fn post_form(
    router: &Router,
    body: &'static str,
  ) -> (StatusCode, Option<String>, json::Value) {
    let req = Request::post("/new")
      .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
      .body(Body::from(body))
      .unwrap();
    send(router, req).await
  }

  #[tokio::test]
  async fn test_bind_fails_up_front() {
    let plugin = Plugin::bind(SocketAddr::from(([127, 0, 0, 1], 0))).unwrap();
    let addr = plugin.local_addr().unwrap();

    let err = Plugin::bind(addr).err().unwrap();
    assert!(err.to_string().contains("Failed to bind"));
  }

  #[tokio::test]
  async fn test_build_id_is_required() {
    let (router, _) = setup().await;

    for uri in ["/build", "/build?id=", "/build?id=abc", "/build?id=0"] {
      let (status, body) = get(&router, uri).await;
      assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
      assert_eq!(body["success"], false);
    }
  }

  #[tokio::test]
  async fn test_unknown_build() {
    let (router, _) = setup().await;

    for uri in ["/build?id=999", "/build?id=99999999999"] {
      let (status, body) = get(&router, uri).await;
      assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
      assert_eq!(body["error"], "Build not found");
    }
  }

  async fn post_release(
    router: &Router,
    body: json::Value,
  ) -> (StatusCode, json::Value) {
    let req = Request::post("/api/release")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap();
    let (status, _, body) = send(router, req).await;
    (status, body)
  }

  #[tokio::test]
  async fn test_create_release() {
    let (router, app) = setup().await;

    let (_, location, _) = post_form(&router, "name=site").await;
    let build = app.sv().build.recent(1).await.unwrap().remove(0);

    for expected in [1, 2] {
      let (status, body) = post_release(
        &router,
        json::json!({ "build_id": build.id, "name": " v1 " }),
      )
      .await;
      assert_eq!(status, StatusCode::CREATED);
      assert_eq!(body["name"], "v1");
      assert_eq!(body["number"], expected);
    }

    let (_, body) = get(&router, &location.unwrap()).await;
    assert_eq!(body["releases"][0]["candidates"][0]["number"], 2);
  }

  #[tokio::test]
  async fn test_create_release_rejected() {
    let (router, app) = setup().await;

    let (status, _) =
      post_release(&router, json::json!({ "build_id": 999, "name": "v1" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    post_form(&router, "name=site").await;
    let build = app.sv().build.recent(1).await.unwrap().remove(0);

    let (status, body) =
      post_release(&router, json::json!({ "build_id": build.id })).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "name");

    assert!(app.sv().release.by_build(build.id).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_create_build_redirects() {
    let (router, app) = setup().await;

    let (status, location, _) = post_form(&router, "name=nightly").await;
    assert_eq!(status, StatusCode::SEE_OTHER);

    let build = app.sv().build.recent(1).await.unwrap().remove(0);
    let location = location.unwrap();
    assert_eq!(location, format!("/build?id={}", build.id));

    let (status, body) = get(&router, &location).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["build"]["name"], "nightly");
    assert_eq!(body["releases"], json::json!([]));
  }

  #[tokio::test]
  async fn test_invalid_build_form() {
    let (router, app) = setup().await;

    let (status, location, body) = post_form(&router, "name=++").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(location, None);
    assert_eq!(body["fields"][0]["field"], "name");

    let (status, _, _) = post_form(&router, "other=1").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    assert!(app.sv().build.recent(10).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn test_build_view_orders_releases() {
    let (router, app) = setup().await;
    let sv = app.sv();

    let (_, location, _) = post_form(&router, "name=site").await;
    let build = sv.build.recent(1).await.unwrap().remove(0);

    sv.release.create(build.id, "v1").await.unwrap();
    sv.release.create(build.id, "v1").await.unwrap();
    sv.release.create(build.id, "v2").await.unwrap();

    let (status, body) = get(&router, &location.unwrap()).await;
    assert_eq!(status, StatusCode::OK);

    let releases = body["releases"].as_array().unwrap();
    let names: Vec<&str> =
      releases.iter().map(|r| r["name"].as_str().unwrap()).collect();
    assert_eq!(names, ["v2", "v1"]);

    let numbers: Vec<i64> = releases[1]["candidates"]
      .as_array()
      .unwrap()
      .iter()
      .map(|c| c["number"].as_i64().unwrap())
      .collect();
    assert_eq!(numbers, [2, 1]);
  }

  #[tokio::test]
  async fn test_static_views() {
    let (router, _) = setup().await;

    let (status, body) = get(&router, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["builds"], json::json!([]));

    let (status, body) = get(&router, "/new").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["fields"][0]["name"], "name");

    for uri in ["/candidate", "/run", "/health"] {
      let (status, _) = get(&router, uri).await;
      assert_eq!(status, StatusCode::OK, "{uri}");
    }
  }
}

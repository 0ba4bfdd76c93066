//! Depicted - build and release tracking server
//!
//! Architecture:
//! - SeaORM for database access (SQLite)
//! - Axum for the web frontend with rate limiting
//! - Tokio for async runtime

mod entity;
mod error;
mod forms;
mod plugins;
mod prelude;
mod releases;
mod state;
mod sv;

use std::{net::SocketAddr, sync::Arc};

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::{Supervisor, server},
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "depicted=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = Config::from_env()?;
  info!("Starting Depicted v{}", env!("CARGO_PKG_VERSION"));

  let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
  let server = server::Plugin::bind(addr)?;
  info!("Bound HTTP listener on {}", server.local_addr()?);

  let supervisor = Supervisor::new(&config).register(server);
  let app = Arc::new(AppState::new(config).await?);

  tokio::select! {
    result = supervisor.run(app) => result,
    signal = tokio::signal::ctrl_c() => {
      signal.context("Failed to listen for ctrl-c")?;
      info!("Shutting down");
      Ok(())
    }
  }
}

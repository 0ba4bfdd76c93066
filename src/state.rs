use std::{env, str::FromStr};

use sea_orm::ConnectOptions;

use crate::{prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  pub connect_timeout: Duration,
  pub rate_limit_per_second: u64,
  pub rate_limit_burst: u32,
  pub restart_delay: Duration,
  pub max_restarts: u32,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite:depicted.db?mode=rwc"),
      port: 3000,
      connect_timeout: Duration::from_secs(10),
      rate_limit_per_second: 2,
      rate_limit_burst: 100,
      restart_delay: Duration::from_secs(5),
      max_restarts: 5,
    }
  }
}

fn parse_var<T>(key: &str) -> anyhow::Result<Option<T>>
where
  T: FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match env::var(key) {
    Ok(value) => value
      .trim()
      .parse()
      .map(Some)
      .with_context(|| format!("Invalid {key}: `{value}`")),
    Err(_) => Ok(None),
  }
}

fn parse_duration(key: &str) -> anyhow::Result<Option<Duration>> {
  match env::var(key) {
    Ok(value) => humantime::parse_duration(value.trim())
      .map(Some)
      .with_context(|| format!("Invalid {key}: `{value}`")),
    Err(_) => Ok(None),
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let default = Self::default();

    Ok(Self {
      database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),
      port: parse_var("PORT")?.unwrap_or(default.port),
      connect_timeout: parse_duration("DB_CONNECT_TIMEOUT")?
        .unwrap_or(default.connect_timeout),
      rate_limit_per_second: parse_var("RATE_LIMIT_PER_SECOND")?
        .unwrap_or(default.rate_limit_per_second),
      rate_limit_burst: parse_var("RATE_LIMIT_BURST")?
        .unwrap_or(default.rate_limit_burst),
      restart_delay: parse_duration("RESTART_DELAY")?
        .unwrap_or(default.restart_delay),
      max_restarts: parse_var("MAX_RESTARTS")?
        .unwrap_or(default.max_restarts),
    })
  }
}

pub struct Services<'a> {
  pub build: sv::Build<'a>,
  pub release: sv::Release<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let mut options = ConnectOptions::new(&config.database_url);
    options.connect_timeout(config.connect_timeout).sqlx_logging(false);

    let db = Database::connect(options)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    Migrator::up(&db, None).await.context("Failed to run migrations")?;

    Ok(Self::with_db(db, config))
  }

  pub fn with_db(db: DatabaseConnection, config: Config) -> Self {
    Self { db, config }
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      build: sv::Build::new(&self.db),
      release: sv::Release::new(&self.db),
    }
  }
}

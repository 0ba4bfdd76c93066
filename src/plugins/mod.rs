pub mod server;

use std::{sync::Arc, time::Duration};

use anyhow::bail;
use tokio::{task::JoinSet, time::Instant};
use tracing::{error, info, warn};

use crate::state::{AppState, Config};

/// A service that stays up for as long as the process does.
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
  fn name(&self) -> &'static str {
    std::any::type_name::<Self>()
  }

  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()>;
}

/// A plugin running this long is considered healthy again.
const STABLE_AFTER: Duration = Duration::from_secs(60);

/// Runs registered plugins and restarts the ones that stop. A plugin that
/// fails more than `max_restarts` times in a row takes the process down.
pub struct Supervisor {
  plugins: Vec<Arc<dyn Plugin>>,
  restart_delay: Duration,
  max_restarts: u32,
}

impl Supervisor {
  pub fn new(config: &Config) -> Self {
    Self {
      plugins: Vec::new(),
      restart_delay: config.restart_delay,
      max_restarts: config.max_restarts,
    }
  }

  pub fn register<P: Plugin + 'static>(mut self, plugin: P) -> Self {
    self.plugins.push(Arc::new(plugin));
    self
  }

  /// Resolves once any plugin gives up.
  pub async fn run(self, app: Arc<AppState>) -> anyhow::Result<()> {
    let mut plugins = JoinSet::new();
    for plugin in self.plugins {
      plugins.spawn(supervise(
        plugin,
        app.clone(),
        self.restart_delay,
        self.max_restarts,
      ));
    }

    match plugins.join_next().await {
      Some(Ok(result)) => result,
      Some(Err(err)) => Err(err.into()),
      None => Ok(()),
    }
  }
}

async fn supervise(
  plugin: Arc<dyn Plugin>,
  app: Arc<AppState>,
  restart_delay: Duration,
  max_restarts: u32,
) -> anyhow::Result<()> {
  let name = plugin.name();
  let mut failures = 0;
  info!("Service `{name}` started");

  loop {
    let started = Instant::now();
    let handle = tokio::spawn({
      let (plugin, app) = (plugin.clone(), app.clone());
      async move { plugin.start(app).await }
    });

    match handle.await {
      Ok(Ok(())) => warn!("Service `{name}` returned"),
      Ok(Err(err)) => error!("Service `{name}` failed: {err:#}"),
      Err(err) if err.is_cancelled() => {
        info!("Service `{name}` cancelled");
        return Ok(());
      }
      Err(_) => error!("Service `{name}` panicked"),
    }

    if started.elapsed() >= STABLE_AFTER {
      failures = 0;
    }
    failures += 1;
    if failures > max_restarts {
      bail!("Service `{name}` failed {failures} times in a row");
    }

    tokio::time::sleep(restart_delay).await;
    info!("Restarting `{name}` ({failures}/{max_restarts})");
  }
}

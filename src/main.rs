//! Event check-in server
//!
//! - SeaORM over SQLite for events, the XP ledger and cached totals
//! - Axum for the admin API and the QR check-in redirect
//! - Plugins supervise the HTTP server and the XP reconcile loop

mod entity;
mod error;
mod plugins;
mod prelude;
mod state;
mod sv;
mod utils;

use std::sync::Arc;

use tracing_subscriber::{
  EnvFilter, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::{
  plugins::App,
  prelude::*,
  state::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  dotenvy::dotenv().ok();

  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
      "checkin=debug,tower_http=debug,sea_orm=warn".into()
    }))
    .with(tracing_subscriber::fmt::layer())
    .init();

  info!("Starting check-in server v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_env()?;
  if config.admins.is_empty() {
    warn!("ADMIN_IDS is empty, only flagged users can administer events");
  }

  let app = Arc::new(AppState::new(config).await?);

  let handles = App::new()
    .register(plugins::server::Plugin)
    .register(plugins::reconcile::Plugin)
    .run(app);

  tokio::signal::ctrl_c().await.context("Failed to listen for ctrl-c")?;
  info!("Shutting down");

  for handle in handles {
    handle.abort();
  }

  Ok(())
}

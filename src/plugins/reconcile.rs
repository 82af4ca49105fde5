//! Periodic rebuild of every cached XP total from the ledger. Heals caches
//! left stale when a process died between an award and its invalidation.

use std::sync::Arc;

use crate::{prelude::*, state::AppState};

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let period = app.config.reconcile_interval;
    info!(
      "XP reconcile scheduled every {}",
      humantime::format_duration(period)
    );

    let mut interval = time::interval(period);
    // first tick completes immediately
    interval.tick().await;

    loop {
      interval.tick().await;

      let started = std::time::Instant::now();
      let users = app
        .sv()
        .xp
        .recalculate_all()
        .await
        .context("XP reconcile failed")?;

      info!(users, elapsed = ?started.elapsed(), "XP caches reconciled");
    }
  }
}

use std::{collections::HashSet, env};

use crate::{prelude::*, sv};

#[derive(Debug, Clone)]
pub struct Config {
  pub database_url: String,
  pub port: u16,
  /// Base of the URLs encoded into QR codes
  pub public_url: String,
  /// Where check-in outcomes and logins are redirected to
  pub frontend_url: String,
  /// HS256 key shared with the identity provider
  pub session_secret: Vec<u8>,
  /// Users with admin rights regardless of their stored flag
  pub admins: HashSet<String>,
  pub reconcile_interval: Duration,
}

impl Default for Config {
  fn default() -> Self {
    Self {
      database_url: String::from("sqlite::memory:"),
      port: 3000,
      public_url: String::from("http://localhost:3000"),
      frontend_url: String::from("http://localhost:5173"),
      session_secret: b"test_session_secret_32_bytes_min".to_vec(),
      admins: HashSet::new(),
      reconcile_interval: Duration::from_secs(6 * 3600),
    }
  }
}

impl Config {
  pub fn from_env() -> anyhow::Result<Self> {
    let defaults = Self::default();

    let session_secret = env::var("SESSION_SECRET")
      .context("SESSION_SECRET not set")?
      .trim()
      .as_bytes()
      .to_vec();

    let reconcile_interval = match env::var("XP_RECONCILE_INTERVAL") {
      Ok(raw) => humantime::parse_duration(raw.trim())
        .with_context(|| format!("Invalid XP_RECONCILE_INTERVAL: {raw}"))?,
      Err(_) => defaults.reconcile_interval,
    };

    let admins = env::var("ADMIN_IDS")
      .unwrap_or_default()
      .split(',')
      .map(str::trim)
      .filter(|id| !id.is_empty())
      .map(String::from)
      .collect();

    Ok(Self {
      database_url: env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:checkin.db?mode=rwc".into()),
      port: env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(defaults.port),
      public_url: env::var("PUBLIC_URL").unwrap_or(defaults.public_url),
      frontend_url: env::var("FRONTEND_URL").unwrap_or(defaults.frontend_url),
      session_secret,
      admins,
      reconcile_interval,
    })
  }
}

pub struct Services<'a> {
  pub user: sv::User<'a>,
  pub activity_type: sv::ActivityType<'a>,
  pub event: sv::Event<'a>,
  pub qr: sv::Qr<'a>,
  pub ledger: sv::Ledger<'a>,
  pub xp: sv::Xp<'a>,
  pub checkin: sv::Checkin<'a>,
}

pub struct AppState {
  pub db: DatabaseConnection,
  pub config: Config,
}

impl AppState {
  pub async fn new(config: Config) -> anyhow::Result<Self> {
    info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
      .await
      .context("Failed to connect to database")?;

    info!("Running migrations...");
    migration::Migrator::up(&db, None)
      .await
      .context("Failed to run migrations")?;

    Ok(Self { db, config })
  }

  pub fn sv(&self) -> Services<'_> {
    Services {
      user: sv::User::new(&self.db),
      activity_type: sv::ActivityType::new(&self.db),
      event: sv::Event::new(&self.db),
      qr: sv::Qr::new(&self.db),
      ledger: sv::Ledger::new(&self.db),
      xp: sv::Xp::new(&self.db),
      checkin: sv::Checkin::new(&self.db),
    }
  }

  pub fn is_admin(&self, user: &crate::entity::user::Model) -> bool {
    user.is_admin || self.config.admins.contains(&user.id)
  }
}

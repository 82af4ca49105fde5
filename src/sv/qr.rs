//! Rotating check-in codes.
//!
//! An event carries at most one live secret. Reading the QR either returns
//! that secret or, once it has expired, swaps in a fresh one. The swap is
//! conditioned on the expiry the reader observed, so two displays refreshing
//! at the same moment converge on a single secret.

use sea_orm::sea_query::Expr;
use serde::Serialize;
use uuid::Uuid;

use crate::{entity::event, prelude::*, sv};

/// Rotation attempts before giving up on a contended event.
const ROTATION_ATTEMPTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QrToken {
  pub qr_content: String,
  pub expires_at: DateTime,
  pub ttl_seconds: i64,
  pub rotation_seconds: i32,
}

/// `evt_{event}_{unix ms}_{122 random bits}`; unguessable within a window.
pub fn generate_secret(event_id: &str, now: DateTime) -> String {
  format!(
    "evt_{}_{}_{}",
    event_id,
    now.and_utc().timestamp_millis(),
    Uuid::new_v4().simple()
  )
}

/// Checks a scanned code against the event's current secret.
pub fn verify(
  event: &event::Model,
  code: &str,
  now: DateTime,
) -> Result<(), Rejection> {
  if event.current_qr_secret.as_deref() != Some(code) {
    return Err(Rejection::InvalidCode);
  }

  match event.qr_expires_at {
    Some(expires_at) if expires_at > now => Ok(()),
    _ => Err(Rejection::CodeExpired),
  }
}

pub struct Qr<'a> {
  db: &'a DatabaseConnection,
}

impl<'a> Qr<'a> {
  pub fn new(db: &'a DatabaseConnection) -> Self {
    Self { db }
  }

  pub async fn active_token(
    &self,
    event_id: &str,
    base_url: &str,
  ) -> Result<QrToken> {
    self.active_token_at(event_id, base_url, now()).await
  }

  pub async fn active_token_at(
    &self,
    event_id: &str,
    base_url: &str,
    now: DateTime,
  ) -> Result<QrToken> {
    for _ in 0..ROTATION_ATTEMPTS {
      let event = sv::Event::new(self.db)
        .by_id(event_id)
        .await?
        .ok_or(Error::EventNotFound)?;

      if let Some((secret, expires_at)) = event.live_secret_at(now) {
        return Ok(QrToken {
          qr_content: utils::checkin_url(base_url, event_id, secret),
          expires_at,
          ttl_seconds: utils::ttl_seconds(expires_at, now),
          rotation_seconds: event.qr_rotation_seconds,
        });
      }

      let secret = generate_secret(event_id, now);
      let expires_at =
        now + TimeDelta::seconds(i64::from(event.qr_rotation_seconds));

      if self.swap(&event, &secret, expires_at, now).await? {
        debug!(event_id, %expires_at, "QR secret rotated");
        return Ok(QrToken {
          qr_content: utils::checkin_url(base_url, event_id, &secret),
          expires_at,
          ttl_seconds: i64::from(event.qr_rotation_seconds),
          rotation_seconds: event.qr_rotation_seconds,
        });
      }

      debug!(event_id, "Lost QR rotation race, re-reading");
    }

    Err(Error::Internal(format!(
      "QR rotation for event {event_id} lost {ROTATION_ATTEMPTS} races"
    )))
  }

  /// Stores the new secret only if `qr_expires_at` still holds the value in
  /// `seen`. Returns whether this call won.
  async fn swap(
    &self,
    seen: &event::Model,
    secret: &str,
    expires_at: DateTime,
    now: DateTime,
  ) -> Result<bool> {
    let mut update = event::Entity::update_many()
      .col_expr(event::Column::CurrentQrSecret, Expr::value(secret))
      .col_expr(event::Column::QrExpiresAt, Expr::value(expires_at))
      .col_expr(event::Column::UpdatedAt, Expr::value(now))
      .filter(event::Column::Id.eq(seen.id.as_str()));

    update = match seen.qr_expires_at {
      Some(prev) => update.filter(event::Column::QrExpiresAt.eq(prev)),
      None => update.filter(event::Column::QrExpiresAt.is_null()),
    };

    Ok(update.exec(self.db).await?.rows_affected == 1)
  }
}

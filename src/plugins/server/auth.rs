//! Session resolution for the HTTP surface.
//!
//! Sessions are HS256 tokens minted by the identity provider and carried in
//! the `session_token` cookie or an `Authorization: Bearer` header. The
//! first request of an unknown subject registers the user.

use std::sync::Arc;

use axum::{
  extract::{Request, State},
  http::{HeaderMap, header},
  middleware::Next,
  response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::{entity::user, prelude::*, state::AppState};

pub const SESSION_COOKIE: &str = "session_token";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  /// Stable user id at the identity provider
  pub sub: String,
  pub name: String,
  pub email: String,
  pub exp: usize,
  pub iat: usize,
}

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|h| h.to_str().ok())
    .and_then(|h| h.strip_prefix("Bearer "))
}

/// The caller's user, or `None` without a valid session.
pub async fn session_user(
  app: &AppState,
  jar: &CookieJar,
  headers: &HeaderMap,
) -> Result<Option<user::Model>> {
  let token = match jar.get(SESSION_COOKIE) {
    Some(cookie) => cookie.value(),
    None => match bearer(headers) {
      Some(token) => token,
      None => return Ok(None),
    },
  };

  let key = DecodingKey::from_secret(&app.config.session_secret);
  let claims = match decode::<Claims>(
    token,
    &key,
    &Validation::new(Algorithm::HS256),
  ) {
    Ok(data) => data.claims,
    Err(err) => {
      debug!("Rejected session token: {err}");
      return Ok(None);
    }
  };

  let user = app
    .sv()
    .user
    .get_or_create(&claims.sub, &claims.name, &claims.email)
    .await?;
  Ok(Some(user))
}

/// Rejects requests without a session and exposes the user as an
/// `Extension<user::Model>`.
pub async fn require_user(
  State(app): State<Arc<AppState>>,
  jar: CookieJar,
  mut request: Request,
  next: Next,
) -> Result<Response> {
  let user = session_user(&app, &jar, request.headers())
    .await?
    .ok_or(Error::Unauthorized)?;

  request.extensions_mut().insert(user);
  Ok(next.run(request).await)
}

pub async fn require_admin(
  State(app): State<Arc<AppState>>,
  jar: CookieJar,
  mut request: Request,
  next: Next,
) -> Result<Response> {
  let user = session_user(&app, &jar, request.headers())
    .await?
    .ok_or(Error::Unauthorized)?;

  if !app.is_admin(&user) {
    warn!(user_id = %user.id, "Admin route refused");
    return Err(Error::Forbidden);
  }

  request.extensions_mut().insert(user);
  Ok(next.run(request).await)
}

/// Mints a session token the way the identity provider does.
#[cfg(test)]
pub fn issue(secret: &[u8], sub: &str, name: &str, email: &str) -> String {
  use jsonwebtoken::{EncodingKey, Header, encode};

  let iat = Utc::now().timestamp() as usize;
  let claims = Claims {
    sub: sub.to_owned(),
    name: name.to_owned(),
    email: email.to_owned(),
    iat,
    exp: iat + 3600,
  };

  encode(
    &Header::new(Algorithm::HS256),
    &claims,
    &EncodingKey::from_secret(secret),
  )
  .unwrap()
}

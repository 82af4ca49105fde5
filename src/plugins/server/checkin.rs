//! The URL behind every event QR code. Outcomes always end in a redirect to
//! the frontend; internal failures are logged and surface as `UNKNOWN`.

use std::sync::Arc;

use axum::{
  extract::{OriginalUri, Path, Query, State},
  http::HeaderMap,
  response::Redirect,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;

use super::auth;
use crate::{prelude::*, state::AppState};

const UNKNOWN: &str = "UNKNOWN";

#[derive(Debug, Deserialize)]
pub struct CheckinQuery {
  pub code: Option<String>,
}

fn failure(app: &AppState, code: &str) -> Redirect {
  Redirect::to(&utils::url_with_query(
    &app.config.frontend_url,
    "/checkin/error",
    &[("error", code)],
  ))
}

pub async fn checkin(
  State(app): State<Arc<AppState>>,
  Path(event_id): Path<String>,
  Query(query): Query<CheckinQuery>,
  OriginalUri(uri): OriginalUri,
  jar: CookieJar,
  headers: HeaderMap,
) -> Redirect {
  let Some(code) = query.code.filter(|code| !code.is_empty()) else {
    return failure(&app, Rejection::InvalidCode.code());
  };

  let user = match auth::session_user(&app, &jar, &headers).await {
    Ok(user) => user,
    Err(err) => {
      error!(%event_id, "Session lookup failed during check-in: {err}");
      return failure(&app, UNKNOWN);
    }
  };

  let Some(user) = user else {
    let return_to = format!(
      "{}{}",
      app.config.public_url.trim_end_matches('/'),
      uri.path_and_query().map(|pq| pq.as_str()).unwrap_or(uri.path())
    );
    return Redirect::to(&utils::url_with_query(
      &app.config.frontend_url,
      "/login",
      &[("returnTo", return_to.as_str())],
    ));
  };

  match app.sv().checkin.check_in(Some(&user.id), &event_id, &code).await {
    Ok(Ok(done)) => {
      info!(
        user_id = %user.id,
        %event_id,
        xp = done.xp_awarded,
        total = done.total_xp,
        "Checked in"
      );
      let (xp, total) =
        (done.xp_awarded.to_string(), done.total_xp.to_string());
      Redirect::to(&utils::url_with_query(
        &app.config.frontend_url,
        "/checkin/success",
        &[
          ("xp", xp.as_str()),
          ("event", done.event_name.as_str()),
          ("total", total.as_str()),
        ],
      ))
    }
    Ok(Err(rejection)) => {
      debug!(
        user_id = %user.id,
        %event_id,
        "Check-in rejected: {rejection}"
      );
      failure(&app, rejection.code())
    }
    Err(err) => {
      error!(user_id = %user.id, %event_id, "Check-in failed: {err}");
      failure(&app, UNKNOWN)
    }
  }
}

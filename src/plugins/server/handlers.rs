use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use json::{Value, json};

use crate::{
  entity::user,
  prelude::*,
  state::AppState,
  sv::{activity_type::ActivityTypePatch, event::EventForm, event::EventPatch},
};

pub async fn health() -> &'static str {
  "OK"
}

pub async fn create_event(
  State(app): State<Arc<AppState>>,
  Extension(admin): Extension<user::Model>,
  Json(form): Json<EventForm>,
) -> Result<impl IntoResponse> {
  let event = app.sv().event.create(form, &admin.id).await?;
  Ok((StatusCode::CREATED, Json(json!({ "event": event }))))
}

pub async fn list_events(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Value>> {
  let events = app.sv().event.all().await?;
  Ok(Json(json!({ "events": events })))
}

pub async fn active_events(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Value>> {
  let events = app.sv().event.active_at(now()).await?;
  Ok(Json(json!({ "events": events })))
}

pub async fn get_event(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let event = app.sv().event.by_id(&id).await?.ok_or(Error::EventNotFound)?;
  Ok(Json(json!({ "event": event })))
}

pub async fn update_event(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<EventPatch>,
) -> Result<Json<Value>> {
  let event = app.sv().event.update(&id, patch).await?;
  Ok(Json(json!({ "event": event })))
}

pub async fn delete_event(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  if !app.sv().event.delete(&id).await? {
    return Err(Error::EventNotFound);
  }
  Ok(Json(json!({ "success": true })))
}

pub async fn event_qr(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse> {
  let token = app.sv().qr.active_token(&id, &app.config.public_url).await?;
  Ok(Json(token))
}

pub async fn event_attendees(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let sv = app.sv();
  sv.event.by_id(&id).await?.ok_or(Error::EventNotFound)?;

  let attendees = sv.ledger.attendees(&id).await?;
  Ok(Json(json!({ "attendees": attendees })))
}

pub async fn list_activity_types(
  State(app): State<Arc<AppState>>,
) -> Result<Json<Value>> {
  let types = app.sv().activity_type.all().await?;
  Ok(Json(json!({ "types": types })))
}

pub async fn get_activity_type(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let ty = app
    .sv()
    .activity_type
    .by_id(&id)
    .await?
    .ok_or(Error::ActivityTypeNotFound)?;
  Ok(Json(json!({ "activityType": ty })))
}

pub async fn update_activity_type(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
  Json(patch): Json<ActivityTypePatch>,
) -> Result<Json<Value>> {
  let ty = app.sv().activity_type.update(&id, patch).await?;
  Ok(Json(json!({ "activityType": ty })))
}

pub async fn recalculate_xp(
  State(app): State<Arc<AppState>>,
  Path(id): Path<String>,
) -> Result<Json<Value>> {
  let sv = app.sv();
  sv.user.by_id(&id).await?.ok_or(Error::UserNotFound)?;

  let total_xp = sv.xp.recalculate(&id).await?;
  Ok(Json(json!({ "totalXp": total_xp })))
}

pub async fn my_xp(
  State(app): State<Arc<AppState>>,
  Extension(user): Extension<user::Model>,
) -> Result<Json<Value>> {
  let total_xp = app.sv().xp.total(&user.id).await?;
  Ok(Json(json!({ "totalXp": total_xp })))
}

pub async fn my_checkins(
  State(app): State<Arc<AppState>>,
  Extension(user): Extension<user::Model>,
) -> Result<impl IntoResponse> {
  let history = app.sv().checkin.history(&user.id).await?;
  Ok(Json(history))
}

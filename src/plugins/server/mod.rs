mod auth;
mod checkin;
mod handlers;

use std::{net::SocketAddr, sync::Arc};

use async_trait::async_trait;
use axum::{
  Router,
  http::{HeaderValue, Method, header},
  middleware,
  routing::{get, post},
};
use tower::ServiceBuilder;
use tower_governor::{GovernorLayer, governor::GovernorConfigBuilder};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{prelude::*, state::AppState};

/// Every route of the service, without rate limiting.
pub fn router(app: Arc<AppState>) -> anyhow::Result<Router> {
  let origin = HeaderValue::from_str(&app.config.frontend_url)
    .context("FRONTEND_URL is not a valid origin")?;

  let admin = Router::new()
    .route(
      "/events",
      get(handlers::list_events).post(handlers::create_event),
    )
    .route("/events/active", get(handlers::active_events))
    .route(
      "/events/{id}",
      get(handlers::get_event)
        .patch(handlers::update_event)
        .delete(handlers::delete_event),
    )
    .route("/events/{id}/qr", get(handlers::event_qr))
    .route("/events/{id}/attendees", get(handlers::event_attendees))
    .route("/activity-types", get(handlers::list_activity_types))
    .route(
      "/activity-types/{id}",
      get(handlers::get_activity_type).patch(handlers::update_activity_type),
    )
    .route("/users/{id}/xp/recalculate", post(handlers::recalculate_xp))
    .route_layer(middleware::from_fn_with_state(
      app.clone(),
      auth::require_admin,
    ));

  let member = Router::new()
    .route("/my/xp", get(handlers::my_xp))
    .route("/my/checkins", get(handlers::my_checkins))
    .route_layer(middleware::from_fn_with_state(
      app.clone(),
      auth::require_user,
    ));

  let router = Router::new()
    .route("/health", get(handlers::health))
    .route("/events/{id}/checkin", get(checkin::checkin))
    .merge(admin)
    .merge(member)
    .layer(
      ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
        CorsLayer::new()
          .allow_origin(origin)
          .allow_credentials(true)
          .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
          ])
          .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
      ),
    )
    .with_state(app);

  Ok(router)
}

pub struct Plugin;

#[async_trait]
impl super::Plugin for Plugin {
  async fn start(&self, app: Arc<AppState>) -> anyhow::Result<()> {
    let governor_conf = Arc::new(
      GovernorConfigBuilder::default()
        .per_second(2)
        .burst_size(100)
        .finish()
        .context("Failed to build rate limiter config")?,
    );

    let limiter = governor_conf.limiter().clone();

    let addr = SocketAddr::from(([0, 0, 0, 0], app.config.port));
    let router = router(app)?
      .layer(GovernorLayer::new(governor_conf))
      .into_make_service_with_connect_info::<SocketAddr>();

    let listener = tokio::net::TcpListener::bind(addr)
      .await
      .with_context(|| format!("Failed to bind {addr}"))?;
    info!("HTTP Server listening on {addr}");

    let limiter = async {
      loop {
        time::sleep(Duration::from_secs(60)).await;
        limiter.retain_recent();
      }
    };

    let server = async {
      axum::serve(listener, router).await.context("Axum server error")
    };

    tokio::select! {
      result = server => {
        match &result {
          Ok(_) => info!("Server stopped gracefully"),
          Err(err) => error!("Server stopped with error: {err}"),
        }
        result
      }
      _ = limiter => {
        error!("Rate limiter cleaner stopped unexpectedly!");
        Ok(())
      }
    }
  }
}

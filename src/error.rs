//! Error types for the check-in server

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};

/// Why a check-in attempt was turned away. These are expected outcomes and
/// travel as values, never as `Err`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Rejection {
  #[error("not authenticated")]
  NotAuthenticated,
  #[error("event not found")]
  EventNotFound,
  #[error("event is not active")]
  EventNotActive,
  #[error("invalid check-in code")]
  InvalidCode,
  #[error("check-in code expired")]
  CodeExpired,
  #[error("already checked in")]
  AlreadyCheckedIn,
}

impl Rejection {
  pub fn code(self) -> &'static str {
    match self {
      Rejection::NotAuthenticated => "NOT_AUTHENTICATED",
      Rejection::EventNotFound => "EVENT_NOT_FOUND",
      Rejection::EventNotActive => "EVENT_NOT_ACTIVE",
      Rejection::InvalidCode => "INVALID_CODE",
      Rejection::CodeExpired => "CODE_EXPIRED",
      Rejection::AlreadyCheckedIn => "ALREADY_CHECKED_IN",
    }
  }
}

/// Why the ledger refused to record an award.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Denied {
  #[error("ACTIVITY_TYPE_NOT_FOUND")]
  ActivityTypeNotFound,
  #[error("ACTIVITY_TYPE_INACTIVE")]
  ActivityTypeInactive,
  #[error("ALREADY_AWARDED")]
  AlreadyAwarded,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
  #[error("Database error: {0}")]
  Database(#[from] sea_orm::DbErr),

  #[error("Authentication required")]
  Unauthorized,

  #[error("Admin access required")]
  Forbidden,

  #[error("Event not found")]
  EventNotFound,

  #[error("Activity type not found")]
  ActivityTypeNotFound,

  #[error("User not found")]
  UserNotFound,

  #[error("Invalid data: {0}")]
  Validation(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl From<validator::ValidationErrors> for Error {
  fn from(errors: validator::ValidationErrors) -> Self {
    Error::Validation(errors.to_string())
  }
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      Error::Database(err) => {
        tracing::error!(error = %err, "Database error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
      }
      Error::Internal(err) => {
        tracing::error!(error = %err, "Internal error");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string())
      }
      Error::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      Error::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
      Error::EventNotFound
      | Error::ActivityTypeNotFound
      | Error::UserNotFound => (StatusCode::NOT_FOUND, self.to_string()),
      Error::Validation(_) => (StatusCode::BAD_REQUEST, self.to_string()),
    };

    let body = json::json!({
      "success": false,
      "error": message
    });

    (status, Json(body)).into_response()
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! API error type and [`axum::response::IntoResponse`] implementation.
//!
//! Every failure is a JSON body `{"success": false, "error": <code>,
//! "message": <text>}`. Expected outcomes carry a message the login screen
//! can show as-is; backing-service failures are logged and get a generic
//! message.

use std::time::Duration;

use axum::{
  Json,
  extract::rejection::JsonRejection,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use facegate_core::Error as FaceError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Face(#[from] FaceError),

  #[error("verification timed out after {0:?}")]
  Timeout(Duration),

  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("request body exceeds {limit} bytes")]
  PayloadTooLarge { limit: usize },

  #[error("unauthorized")]
  Unauthorized,
}

impl ApiError {
  /// Admin routes address an account explicitly, so a missing one is a 404
  /// there rather than a backing-service failure.
  /// An oversized body is reported as such; any other rejection goes to
  /// `otherwise`.
  pub fn from_rejection(
    rej: JsonRejection,
    limit: usize,
    otherwise: impl FnOnce(String) -> ApiError,
  ) -> Self {
    if rej.status() == StatusCode::PAYLOAD_TOO_LARGE {
      Self::PayloadTooLarge { limit }
    } else {
      otherwise(rej.body_text())
    }
  }

  pub fn from_admin(e: FaceError) -> Self {
    match e {
      FaceError::AccountNotFound(id) => Self::NotFound(format!("account {id} not found")),
      other => Self::Face(other),
    }
  }
}

fn face_status(e: &FaceError) -> StatusCode {
  match e {
    FaceError::InvalidImageInput(_) | FaceError::NoFaceDetected => StatusCode::BAD_REQUEST,
    FaceError::NoEnrollments | FaceError::NoMatch { .. } => StatusCode::NOT_FOUND,
    _ => StatusCode::INTERNAL_SERVER_ERROR,
  }
}

fn face_message(e: &FaceError) -> String {
  match e {
    FaceError::InvalidImageInput(detail) => {
      format!("The submitted image could not be used: {detail}.")
    }
    FaceError::NoFaceDetected => {
      "No clear face was detected. Face the camera in good light and try again.".to_owned()
    }
    FaceError::NoEnrollments => "Face login has not been set up for any account.".to_owned(),
    FaceError::NoMatch { .. } => {
      "Your face could not be matched to an enrolled account. Try again or sign in with \
       your password."
        .to_owned()
    }
    _ => "Face login is temporarily unavailable. Please sign in with your password.".to_owned(),
  }
}

fn body(code: &str, message: String) -> Json<serde_json::Value> {
  Json(json!({ "success": false, "error": code, "message": message }))
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Face(e) => {
        let status = face_status(&e);
        if !e.is_expected() {
          error!(code = e.code(), error = %e, "face request failed");
        }
        (status, body(e.code(), face_message(&e))).into_response()
      }
      ApiError::Timeout(after) => {
        error!(?after, "face verification timed out");
        (
          StatusCode::GATEWAY_TIMEOUT,
          body("Timeout", "Face verification took too long. Please try again.".to_owned()),
        )
          .into_response()
      }
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, body("NotFound", m)).into_response(),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, body("BadRequest", m)).into_response(),
      ApiError::PayloadTooLarge { limit } => (
        StatusCode::PAYLOAD_TOO_LARGE,
        body(
          "PayloadTooLarge",
          format!("The request is too large; send an image under {limit} bytes."),
        ),
      )
        .into_response(),
      ApiError::Unauthorized => {
        let mut res =
          (StatusCode::UNAUTHORIZED, body("Unauthorized", "Unauthorized".to_owned()))
            .into_response();
        res.headers_mut().insert(
          header::WWW_AUTHENTICATE,
          HeaderValue::from_static("Basic realm=\"facegate\""),
        );
        res
      }
    }
  }
}

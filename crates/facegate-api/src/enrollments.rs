//! `POST /enrollments`: store a face descriptor for an account.
//!
//! Body: `{"accountId": "...", "imageBase64OrDataUrl": "..."}`. Requires
//! admin credentials.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::{DateTime, Utc};
use facegate_core::{
  account::AccountId,
  identity::LoginLinkIssuer,
  perception::PerceptionService,
  store::{AccountStore, DescriptorStore},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{AppState, auth::Admin, error::ApiError, face_login::required_image};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollBody {
  pub account_id:               AccountId,
  #[serde(default)]
  pub image_base64_or_data_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollResponse {
  pub success:          bool,
  pub descriptor_id:    Uuid,
  pub account_id:       AccountId,
  pub source_image_ref: Option<String>,
  pub enrolled_at:      DateTime<Utc>,
}

pub async fn create<P, S, L>(
  _admin: Admin,
  State(state): State<AppState<P, S, L>>,
  body: Result<Json<EnrollBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  P: PerceptionService + 'static,
  S: DescriptorStore + AccountStore + 'static,
  L: LoginLinkIssuer + 'static,
{
  let Json(body) = body
    .map_err(|rej| ApiError::from_rejection(rej, state.max_body_bytes, ApiError::BadRequest))?;
  let image = required_image(body.image_base64_or_data_url)?;

  let stored = tokio::time::timeout(
    state.verify_timeout,
    state.enrollment.enroll(&body.account_id, &image),
  )
  .await
  .map_err(|_| ApiError::Timeout(state.verify_timeout))?
  .map_err(ApiError::from_admin)?;

  Ok((
    StatusCode::CREATED,
    Json(EnrollResponse {
      success:          true,
      descriptor_id:    stored.descriptor_id,
      account_id:       stored.account_id,
      source_image_ref: stored.source_image_ref,
      enrolled_at:      stored.enrolled_at,
    }),
  ))
}

//! `POST /face-login`: the unauthenticated sign-in endpoint.
//!
//! Body: `{"imageBase64OrDataUrl": "<base64 or data URL>"}`.

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
};
use facegate_core::{
  Error as FaceError,
  account::AccountId,
  identity::LoginLinkIssuer,
  perception::PerceptionService,
  session::IssuedSession,
  store::{AccountStore, DescriptorStore},
};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLoginBody {
  #[serde(default)]
  pub image_base64_or_data_url: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceLoginResponse {
  pub success:       bool,
  pub message:       String,
  pub similarity:    u8,
  pub email:         String,
  pub user_id:       AccountId,
  pub access_token:  String,
  pub refresh_token: String,
}

impl From<IssuedSession> for FaceLoginResponse {
  fn from(s: IssuedSession) -> Self {
    Self {
      success:       true,
      message:       "Face recognized. You are now signed in.".to_owned(),
      similarity:    s.similarity_score,
      email:         s.login_identifier,
      user_id:       s.account_id,
      access_token:  s.access_token,
      refresh_token: s.refresh_token,
    }
  }
}

/// Pull the image out of a JSON body. A missing or unreadable body is the
/// caller's mistake about the image, not a server failure.
pub(crate) fn required_image(
  image: Option<String>,
) -> Result<String, ApiError> {
  image
    .filter(|s| !s.trim().is_empty())
    .ok_or_else(|| FaceError::InvalidImageInput("no image supplied".to_owned()).into())
}

pub async fn handler<P, S, L>(
  State(state): State<AppState<P, S, L>>,
  body: Result<Json<FaceLoginBody>, JsonRejection>,
) -> Result<Json<FaceLoginResponse>, ApiError>
where
  P: PerceptionService + 'static,
  S: DescriptorStore + AccountStore + 'static,
  L: LoginLinkIssuer + 'static,
{
  let Json(body) = body.map_err(|rej| {
    ApiError::from_rejection(rej, state.max_body_bytes, |text| {
      FaceError::InvalidImageInput(format!("unreadable request body: {text}")).into()
    })
  })?;
  let image = required_image(body.image_base64_or_data_url)?;

  let session = tokio::time::timeout(state.verify_timeout, state.login.verify(&image))
    .await
    .map_err(|_| ApiError::Timeout(state.verify_timeout))??;

  Ok(Json(session.into()))
}

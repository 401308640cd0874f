//! Per-account face-login management. Requires admin credentials.
//!
//! | Method   | Path                        | Notes |
//! |----------|-----------------------------|-------|
//! | `GET`    | `/accounts/{id}/face-login` | 404 if the account is unknown |
//! | `DELETE` | `/accounts/{id}/face-login` | Deactivates descriptors, disables face login |

use axum::{
  Json,
  extract::{Path, State},
};
use facegate_core::{
  account::AccountId,
  identity::LoginLinkIssuer,
  perception::PerceptionService,
  store::{AccountStore, DescriptorStore},
};
use serde::Serialize;

use crate::{AppState, auth::Admin, error::ApiError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
  pub account_id:         AccountId,
  pub email:              String,
  pub face_login_enabled: bool,
  pub active_descriptors: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisableResponse {
  pub account_id:  AccountId,
  pub deactivated: usize,
}

// ─── Status ───────────────────────────────────────────────────────────────────

pub async fn status<P, S, L>(
  _admin: Admin,
  State(state): State<AppState<P, S, L>>,
  Path(id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError>
where
  P: PerceptionService + 'static,
  S: DescriptorStore + AccountStore + 'static,
  L: LoginLinkIssuer + 'static,
{
  let status = state
    .enrollment
    .status(&AccountId::new(id))
    .await
    .map_err(ApiError::from_admin)?;

  Ok(Json(StatusResponse {
    account_id:         status.account.account_id,
    email:              status.account.login_identifier,
    face_login_enabled: status.account.face_login_enabled,
    active_descriptors: status.active_descriptors,
  }))
}

// ─── Disable ──────────────────────────────────────────────────────────────────

pub async fn disable<P, S, L>(
  _admin: Admin,
  State(state): State<AppState<P, S, L>>,
  Path(id): Path<String>,
) -> Result<Json<DisableResponse>, ApiError>
where
  P: PerceptionService + 'static,
  S: DescriptorStore + AccountStore + 'static,
  L: LoginLinkIssuer + 'static,
{
  let account_id = AccountId::new(id);
  let deactivated = state
    .enrollment
    .disable(&account_id)
    .await
    .map_err(ApiError::from_admin)?;

  Ok(Json(DisableResponse { account_id, deactivated }))
}

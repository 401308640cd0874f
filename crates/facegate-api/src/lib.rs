//! JSON HTTP API for face login.
//!
//! Exposes an axum [`Router`] over any perception service, store and
//! login-link issuer. TLS and transport concerns are the caller's
//! responsibility.
//!
//! | Method   | Path                          | Auth  |
//! |----------|-------------------------------|-------|
//! | `POST`   | `/face-login`                 | none  |
//! | `POST`   | `/enrollments`                | admin |
//! | `GET`    | `/accounts/{id}/face-login`   | admin |
//! | `DELETE` | `/accounts/{id}/face-login`   | admin |
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", facegate_api::api_router(state))
//! ```

pub mod accounts;
pub mod auth;
pub mod enrollments;
pub mod error;
pub mod face_login;

use std::{sync::Arc, time::Duration};

use axum::{
  Router,
  extract::DefaultBodyLimit,
  routing::{get, post},
};
use facegate_core::{
  enroll::FaceEnrollment,
  identity::LoginLinkIssuer,
  perception::PerceptionService,
  store::{AccountStore, DescriptorStore},
  verify::{DEFAULT_COMPARE_CONCURRENCY, FaceLogin},
};

pub use auth::AuthConfig;
pub use error::ApiError;

/// Per-request limits.
#[derive(Debug, Clone, Copy)]
pub struct ApiSettings {
  /// Upper bound on one verification or enrollment attempt.
  pub verify_timeout:      Duration,
  pub compare_concurrency: usize,
  /// Largest accepted request body; base64 inflates images by a third.
  pub max_body_bytes:      usize,
}

/// Default request body limit, 10 MiB.
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

impl Default for ApiSettings {
  fn default() -> Self {
    Self {
      verify_timeout:      Duration::from_secs(60),
      compare_concurrency: DEFAULT_COMPARE_CONCURRENCY,
      max_body_bytes:      DEFAULT_MAX_BODY_BYTES,
    }
  }
}

/// Shared state injected into every handler.
pub struct AppState<P, S, L> {
  pub login:          Arc<FaceLogin<P, S, L>>,
  pub enrollment:     Arc<FaceEnrollment<P, S>>,
  pub auth:           Arc<AuthConfig>,
  pub verify_timeout: Duration,
  pub max_body_bytes: usize,
}

// Manual impl: a derive would require `P: Clone` and friends.
impl<P, S, L> Clone for AppState<P, S, L> {
  fn clone(&self) -> Self {
    Self {
      login:          Arc::clone(&self.login),
      enrollment:     Arc::clone(&self.enrollment),
      auth:           Arc::clone(&self.auth),
      verify_timeout: self.verify_timeout,
      max_body_bytes: self.max_body_bytes,
    }
  }
}

impl<P, S, L> AppState<P, S, L>
where
  P: PerceptionService,
  S: DescriptorStore + AccountStore,
  L: LoginLinkIssuer,
{
  pub fn new(
    perception: Arc<P>,
    store: Arc<S>,
    links: Arc<L>,
    auth: AuthConfig,
    settings: ApiSettings,
  ) -> Self {
    let login = FaceLogin::new(Arc::clone(&perception), Arc::clone(&store), links)
      .with_compare_concurrency(settings.compare_concurrency);
    Self {
      login:          Arc::new(login),
      enrollment:     Arc::new(FaceEnrollment::new(perception, store)),
      auth:           Arc::new(auth),
      verify_timeout: settings.verify_timeout,
      max_body_bytes: settings.max_body_bytes,
    }
  }
}

/// Build the API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<P, S, L>(state: AppState<P, S, L>) -> Router<()>
where
  P: PerceptionService + 'static,
  S: DescriptorStore + AccountStore + 'static,
  L: LoginLinkIssuer + 'static,
{
  let body_limit = state.max_body_bytes;
  Router::new()
    .route("/face-login", post(face_login::handler::<P, S, L>))
    .route("/enrollments", post(enrollments::create::<P, S, L>))
    .route(
      "/accounts/{id}/face-login",
      get(accounts::status::<P, S, L>).delete(accounts::disable::<P, S, L>),
    )
    .layer(DefaultBodyLimit::max(body_limit))
    .with_state(state)
}

#[cfg(test)]
mod tests;

//! Configuration and assembly of the face-login HTTP server.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::Router;
use facegate_api::{ApiSettings, AppState, AuthConfig, DEFAULT_MAX_BODY_BYTES};
use facegate_identity::{IdentityConfig, MagicLinkIssuer};
use facegate_perception::{ChatPerception, PerceptionConfig};
use facegate_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                String,
  #[serde(default = "default_port")]
  pub port:                u16,
  #[serde(default = "default_store_path")]
  pub store_path:          PathBuf,
  pub admin_username:      String,
  /// argon2 PHC string; see `facegate-server hash-password`.
  pub admin_password_hash: String,
  #[serde(default = "default_verify_timeout_secs")]
  pub verify_timeout_secs: u64,
  #[serde(default = "default_compare_concurrency")]
  pub compare_concurrency: usize,
  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes:      usize,
  pub perception:          PerceptionConfig,
  pub identity:            IdentityConfig,
}

fn default_host() -> String { "127.0.0.1".to_owned() }

fn default_port() -> u16 { 8080 }

fn default_store_path() -> PathBuf { PathBuf::from("~/.local/share/facegate/facegate.db") }

fn default_verify_timeout_secs() -> u64 { 60 }

fn default_compare_concurrency() -> usize { 4 }

fn default_max_body_bytes() -> usize { DEFAULT_MAX_BODY_BYTES }

/// The subset of the configuration the admin helpers need: just the store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  #[serde(default = "default_store_path")]
  pub store_path: PathBuf,
}

impl StoreConfig {
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    settings(path)?
      .try_deserialize()
      .context("failed to deserialise StoreConfig")
  }
}

fn settings(path: &Path) -> anyhow::Result<config::Config> {
  config::Config::builder()
    .add_source(config::File::from(path).required(false))
    .add_source(
      config::Environment::with_prefix("FACEGATE")
        .prefix_separator("_")
        .separator("__"),
    )
    .build()
    .context("failed to read config file")
}

impl ServerConfig {
  /// Layer `FACEGATE_*` environment variables over the TOML file at `path`
  /// (which may be absent). Nested keys use `__`, e.g.
  /// `FACEGATE_PERCEPTION__API_KEY`.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    settings(path)?
      .try_deserialize()
      .context("failed to deserialise ServerConfig")
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn api_settings(&self) -> ApiSettings {
    ApiSettings {
      verify_timeout:      Duration::from_secs(self.verify_timeout_secs),
      compare_concurrency: self.compare_concurrency,
      max_body_bytes:      self.max_body_bytes,
    }
  }
}

// ─── Assembly ─────────────────────────────────────────────────────────────────

/// Open the store at `store_path`, creating parent directories.
pub async fn open_store(store_path: &Path) -> anyhow::Result<SqliteStore> {
  let store_path = expand_tilde(store_path);
  if let Some(parent) = store_path.parent()
    && !parent.as_os_str().is_empty()
  {
    std::fs::create_dir_all(parent)
      .with_context(|| format!("failed to create {parent:?}"))?;
  }
  SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))
}

/// Wire the store and both HTTP clients into the API router, mounted under
/// `/api`.
pub fn build_app(cfg: &ServerConfig, store: SqliteStore) -> anyhow::Result<Router> {
  let perception = ChatPerception::new(cfg.perception.clone())
    .context("failed to build perception client")?;
  let links = MagicLinkIssuer::new(cfg.identity.clone())
    .context("failed to build identity client")?;

  let state = AppState::new(
    Arc::new(perception),
    Arc::new(store),
    Arc::new(links),
    AuthConfig {
      username:      cfg.admin_username.clone(),
      password_hash: cfg.admin_password_hash.clone(),
    },
    cfg.api_settings(),
  );

  Ok(
    Router::new()
      .nest("/api", facegate_api::api_router(state))
      .layer(TraceLayer::new_for_http()),
  )
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

//! Async HTTP client for the identity backend's admin API.

use std::time::Duration;

use facegate_core::{identity::LoginLinkIssuer, session::LoginArtifact};
use reqwest::{Client, header, redirect};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{Error, Result};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Connection settings, deserialised from the `[identity]` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityConfig {
  /// Auth API root, e.g. `https://<project>.supabase.co/auth/v1`.
  pub base_url:     String,
  /// Service-role key; grants admin access. Never log it.
  pub service_key:  String,
  /// Where the verification link sends the browser; the backend's site URL
  /// when unset.
  #[serde(default)]
  pub redirect_to:  Option<String>,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 { 30 }

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct GenerateLinkRequest<'a> {
  #[serde(rename = "type")]
  kind:        &'static str,
  email:       &'a str,
  #[serde(skip_serializing_if = "Option::is_none")]
  redirect_to: Option<&'a str>,
}

/// Older backends return `action_link` at the top level, newer ones nest it
/// under `properties`.
#[derive(Deserialize)]
struct GenerateLinkResponse {
  action_link: Option<String>,
  properties:  Option<LinkProperties>,
}

#[derive(Deserialize)]
struct LinkProperties {
  action_link: Option<String>,
}

impl GenerateLinkResponse {
  fn into_action_link(self) -> Option<String> {
    self
      .properties
      .and_then(|p| p.action_link)
      .or(self.action_link)
      .filter(|l| !l.is_empty())
  }
}

// ─── Client ──────────────────────────────────────────────────────────────────

/// [`LoginLinkIssuer`] over a GoTrue-style admin API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct MagicLinkIssuer {
  client: Client,
  config: IdentityConfig,
}

impl MagicLinkIssuer {
  pub fn new(config: IdentityConfig) -> Result<Self> {
    // The verification redirect carries the tokens, so it must not be
    // followed.
    let client = Client::builder()
      .timeout(Duration::from_secs(config.timeout_secs))
      .redirect(redirect::Policy::none())
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
  }

  /// `POST /admin/generate_link` with `type = magiclink`.
  async fn generate_link(&self, email: &str) -> Result<String> {
    let resp = self
      .client
      .post(self.url("/admin/generate_link"))
      .header("apikey", &self.config.service_key)
      .bearer_auth(&self.config.service_key)
      .json(&GenerateLinkRequest {
        kind:        "magiclink",
        email,
        redirect_to: self.config.redirect_to.as_deref(),
      })
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(Error::Status { status: status.as_u16(), body });
    }

    let parsed: GenerateLinkResponse = resp.json().await?;
    parsed.into_action_link().ok_or(Error::MissingActionLink)
  }

  /// Visit the verification link once and return where it redirects.
  async fn follow_once(&self, link: &str) -> Result<String> {
    let resp = self
      .client
      .get(link)
      .header("apikey", &self.config.service_key)
      .send()
      .await?;

    let status = resp.status();
    if !status.is_redirection() {
      return Err(Error::MissingRedirect(status.as_u16()));
    }
    resp
      .headers()
      .get(header::LOCATION)
      .and_then(|v| v.to_str().ok())
      .map(str::to_owned)
      .ok_or(Error::MissingRedirect(status.as_u16()))
  }
}

impl LoginLinkIssuer for MagicLinkIssuer {
  type Error = Error;

  async fn issue_login_link(&self, login_identifier: &str) -> Result<LoginArtifact> {
    let action_link = self.generate_link(login_identifier).await?;

    let direct = LoginArtifact::new(action_link);
    if direct.has_credentials() {
      return Ok(direct);
    }

    debug!("following one-time verification link");
    let location = self.follow_once(&direct.link).await?;
    Ok(LoginArtifact::new(location))
  }
}

//! One-time login artifacts and the session credentials extracted from them.

use std::fmt;

use serde::Serialize;

use crate::{Error, Result, account::AccountId};

/// A single-use, time-boxed login link produced by the identity backend.
///
/// After the backend redirects, the link carries the session in its fragment
/// (`#access_token=...&refresh_token=...`); some deployments use the query
/// string instead.
#[derive(Clone)]
pub struct LoginArtifact {
  pub link: String,
}

impl LoginArtifact {
  pub fn new(link: impl Into<String>) -> Self { Self { link: link.into() } }

  /// Look up a parameter, fragment first, then query. Empty values count as
  /// absent.
  pub fn param(&self, key: &str) -> Option<&str> {
    let (before_fragment, fragment) = match self.link.split_once('#') {
      Some((head, frag)) => (head, Some(frag)),
      None => (self.link.as_str(), None),
    };
    let query = before_fragment.split_once('?').map(|(_, q)| q);

    [fragment, query]
      .into_iter()
      .flatten()
      .find_map(|section| find_pair(section, key))
  }

  /// `true` if the link already carries an access token.
  pub fn has_credentials(&self) -> bool { self.param("access_token").is_some() }

  /// Extract bearer and refresh credentials; both must be present.
  pub fn credentials(&self) -> Result<SessionCredentials> {
    let access_token = self
      .param("access_token")
      .ok_or(Error::MissingCredential("access token"))?
      .to_owned();
    let refresh_token = self
      .param("refresh_token")
      .ok_or(Error::MissingCredential("refresh token"))?
      .to_owned();
    Ok(SessionCredentials { access_token, refresh_token })
  }
}

impl fmt::Debug for LoginArtifact {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    // The link is a bearer credential.
    f.debug_struct("LoginArtifact").finish_non_exhaustive()
  }
}

fn find_pair<'a>(section: &'a str, key: &str) -> Option<&'a str> {
  section
    .split('&')
    .filter_map(|pair| pair.split_once('='))
    .find(|(k, _)| *k == key)
    .map(|(_, v)| v)
    .filter(|v| !v.is_empty())
}

/// Bearer and refresh tokens handed back to the caller.
#[derive(Clone)]
pub struct SessionCredentials {
  pub access_token:  String,
  pub refresh_token: String,
}

/// Everything a successful face login returns.
#[derive(Clone, Serialize)]
pub struct IssuedSession {
  pub access_token:     String,
  pub refresh_token:    String,
  pub account_id:       AccountId,
  pub login_identifier: String,
  pub similarity_score: u8,
}

impl fmt::Debug for IssuedSession {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("IssuedSession")
      .field("account_id", &self.account_id)
      .field("login_identifier", &self.login_identifier)
      .field("similarity_score", &self.similarity_score)
      .finish_non_exhaustive()
  }
}

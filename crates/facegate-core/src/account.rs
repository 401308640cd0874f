//! Account identity and the auth-state record consulted by the session issuer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier of an account in the identity backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  pub fn as_str(&self) -> &str { &self.0 }
}

impl fmt::Display for AccountId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl From<&str> for AccountId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for AccountId {
  fn from(s: String) -> Self { Self(s) }
}

/// The per-account record controlling whether face login may issue sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAuthState {
  pub account_id:         AccountId,
  /// Email or equivalent identifier the identity backend issues links for.
  pub login_identifier:   String,
  pub face_login_enabled: bool,
}

//! Error type for `facegate-identity`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("identity backend returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("generate_link response has no action_link")]
  MissingActionLink,

  #[error("verification link did not redirect (status {0})")]
  MissingRedirect(u16),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

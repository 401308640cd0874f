//! Error type for `facegate-perception`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("perception service returned {status}: {body}")]
  Status { status: u16, body: String },

  #[error("malformed perception reply: {0}")]
  Malformed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

//! Error type for `facegate-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  #[error("account already exists: {0}")]
  DuplicateAccount(String),

  #[error("account not found: {0}")]
  AccountNotFound(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

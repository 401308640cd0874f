//! Error types for `facegate-core`.

use thiserror::Error;

use crate::account::AccountId;

/// A collaborator error, boxed at the trait seam.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  // ── Input validation ─────────────────────────────────────────────────────
  #[error("invalid image input: {0}")]
  InvalidImageInput(String),

  // ── Matching outcomes ────────────────────────────────────────────────────
  #[error("no face detected in the submitted image")]
  NoFaceDetected,

  #[error("no active face enrollments")]
  NoEnrollments,

  #[error("no enrolled face matched (best score {best_score})")]
  NoMatch { best_score: u8 },

  // ── Backing services ─────────────────────────────────────────────────────
  #[error("account not found: {0}")]
  AccountNotFound(AccountId),

  #[error("account lookup failed: {0}")]
  AccountLookup(#[source] BoxError),

  #[error("account update failed: {0}")]
  AccountUpdate(#[source] BoxError),

  #[error("login link request failed: {0}")]
  LoginLink(#[source] BoxError),

  #[error("login link is missing the {0}")]
  MissingCredential(&'static str),

  #[error("perception service error: {0}")]
  Perception(#[source] BoxError),

  #[error("perception service returned an empty face description")]
  EmptyDescriptor,

  #[error("descriptor store error: {0}")]
  DescriptorStore(#[source] BoxError),
}

impl Error {
  /// Stable, caller-facing error code.
  pub fn code(&self) -> &'static str {
    match self {
      Self::InvalidImageInput(_) => "InvalidImageInput",
      Self::NoFaceDetected => "NoFaceDetected",
      Self::NoEnrollments => "NoEnrollments",
      Self::NoMatch { .. } => "NoMatch",
      Self::AccountNotFound(_) | Self::AccountLookup(_) => "AccountLookupError",
      Self::AccountUpdate(_) => "AccountUpdateError",
      Self::LoginLink(_) | Self::MissingCredential(_) => "SessionIssuanceError",
      Self::Perception(_) | Self::EmptyDescriptor => "PerceptionServiceError",
      Self::DescriptorStore(_) => "DescriptorStoreError",
    }
  }

  /// `true` for validation errors and expected matching outcomes; `false` for
  /// backing-service failures.
  pub fn is_expected(&self) -> bool {
    matches!(
      self,
      Self::InvalidImageInput(_)
        | Self::NoFaceDetected
        | Self::NoEnrollments
        | Self::NoMatch { .. }
    )
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

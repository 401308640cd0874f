//! The external perception service and the two stages that consult it about
//! a submitted image.
//!
//! Every judgement about pixels is delegated; only the decision policy stays
//! local. A future local embedding model can implement
//! [`PerceptionService`] without touching selection or session issuance.

use std::future::Future;

use tracing::{debug, error};

use crate::{Error, Result, image::ImagePayload};

/// Presence detection, description and comparison of faces.
///
/// Implementations are stateless per call and must not retry; retry policy
/// belongs to the caller.
pub trait PerceptionService: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// `true` only if exactly one clear human face is present. Implementations
  /// should lean towards `false` on poor lighting, multiple faces or an
  /// unclear face.
  fn detect_face<'a>(
    &'a self,
    image: &'a ImagePayload,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// A fixed-structure description of the face: shape, eyes, nose, mouth,
  /// eyebrows, chin and distinguishing features.
  fn describe<'a>(
    &'a self,
    image: &'a ImagePayload,
  ) -> impl Future<Output = Result<String, Self::Error>> + Send + 'a;

  /// Strict similarity of two descriptors in `0..=100`.
  fn compare<'a>(
    &'a self,
    submitted: &'a str,
    stored: &'a str,
  ) -> impl Future<Output = Result<u8, Self::Error>> + Send + 'a;
}

// ─── Presence verifier ───────────────────────────────────────────────────────

/// Ask whether the image shows a single clear face.
pub async fn verify_presence<P: PerceptionService>(
  perception: &P,
  image: &ImagePayload,
) -> Result<bool> {
  let detected = perception.detect_face(image).await.map_err(|e| {
    error!(error = %e, "presence check failed");
    Error::Perception(Box::new(e))
  })?;
  debug!(detected, format = ?image.format(), bytes = image.len(), "presence check");
  Ok(detected)
}

// ─── Descriptor generator ────────────────────────────────────────────────────

/// Produce the textual descriptor for an image already known to contain a
/// face. An empty description is an error; there is no local fallback.
pub async fn generate_descriptor<P: PerceptionService>(
  perception: &P,
  image: &ImagePayload,
) -> Result<String> {
  let text = perception.describe(image).await.map_err(|e| {
    error!(error = %e, "descriptor generation failed");
    Error::Perception(Box::new(e))
  })?;
  let text = text.trim();
  if text.is_empty() {
    error!("perception service returned an empty descriptor");
    return Err(Error::EmptyDescriptor);
  }
  Ok(text.to_owned())
}

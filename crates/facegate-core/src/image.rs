//! Validation of submitted image payloads.
//!
//! Callers submit either raw base64 or a `data:<mime>;base64,<payload>` URL.
//! Validation happens before any external call: the payload must decode, be
//! at least [`MIN_IMAGE_BYTES`] long and start with the magic bytes of a
//! recognised encoding.

use std::fmt;

use base64::{
  Engine as _,
  alphabet,
  engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig, general_purpose::STANDARD},
};
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Smallest decoded payload accepted as a plausible image.
pub const MIN_IMAGE_BYTES: usize = 100;

/// Standard alphabet, padding optional. Browsers and mobile clients disagree
/// on trailing `=`.
const LENIENT_B64: GeneralPurpose = GeneralPurpose::new(
  &alphabet::STANDARD,
  GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

// ─── Format ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
  Jpeg,
  Png,
  Gif,
  Webp,
}

impl ImageFormat {
  pub fn mime_type(self) -> &'static str {
    match self {
      Self::Jpeg => "image/jpeg",
      Self::Png => "image/png",
      Self::Gif => "image/gif",
      Self::Webp => "image/webp",
    }
  }

  /// Identify the encoding from its leading magic bytes.
  pub fn sniff(bytes: &[u8]) -> Option<Self> {
    if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
      Some(Self::Jpeg)
    } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
      Some(Self::Png)
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
      Some(Self::Gif)
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
      Some(Self::Webp)
    } else {
      None
    }
  }
}

// ─── Payload ─────────────────────────────────────────────────────────────────

/// A decoded image whose encoding has been recognised.
#[derive(Clone)]
pub struct ImagePayload {
  format: ImageFormat,
  bytes:  Vec<u8>,
}

impl ImagePayload {
  /// Parse raw base64 or a base64 data URL.
  pub fn parse(input: &str) -> Result<Self> {
    let input = input.trim();
    if input.is_empty() {
      return Err(invalid("image payload is empty"));
    }

    let encoded = match input.strip_prefix("data:") {
      Some(rest) => {
        let (header, payload) = rest
          .split_once(',')
          .ok_or_else(|| invalid("data URL has no payload"))?;
        let mut params = header.split(';');
        let mime = params.next().unwrap_or_default().trim();
        if !mime.is_empty() && !mime.to_ascii_lowercase().starts_with("image/") {
          return Err(invalid(format!("data URL declares non-image type {mime:?}")));
        }
        if !params.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
          return Err(invalid("data URL must be base64-encoded"));
        }
        payload
      }
      None => input,
    };

    let compact: String = encoded.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = LENIENT_B64
      .decode(compact.as_bytes())
      .map_err(|e| invalid(format!("payload is not valid base64: {e}")))?;

    Self::from_bytes(bytes)
  }

  /// Validate already-decoded bytes.
  pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
    if bytes.len() < MIN_IMAGE_BYTES {
      return Err(invalid(format!(
        "payload is {} bytes; at least {MIN_IMAGE_BYTES} required",
        bytes.len()
      )));
    }
    let format = ImageFormat::sniff(&bytes)
      .ok_or_else(|| invalid("unrecognised image encoding"))?;
    Ok(Self { format, bytes })
  }

  pub fn format(&self) -> ImageFormat { self.format }

  pub fn bytes(&self) -> &[u8] { &self.bytes }

  pub fn len(&self) -> usize { self.bytes.len() }

  pub fn is_empty(&self) -> bool { self.bytes.is_empty() }

  /// Canonical data URL using the sniffed mime type.
  pub fn to_data_url(&self) -> String {
    format!("data:{};base64,{}", self.format.mime_type(), STANDARD.encode(&self.bytes))
  }

  /// Content-addressed provenance reference, `sha256:<hex>`.
  pub fn content_ref(&self) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(&self.bytes)))
  }
}

impl fmt::Debug for ImagePayload {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ImagePayload")
      .field("format", &self.format)
      .field("len", &self.bytes.len())
      .finish()
  }
}

fn invalid(msg: impl Into<String>) -> Error { Error::InvalidImageInput(msg.into()) }

//! Enrolled face descriptors.
//!
//! A descriptor is a structured natural-language description of a face, not a
//! numeric embedding. It is only ever interpreted by the perception service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::account::AccountId;

/// A stored descriptor. Read-only to the verification path; deactivation is
/// the only lifecycle change and happens through the enrollment flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolledFaceDescriptor {
  pub descriptor_id:    Uuid,
  pub account_id:       AccountId,
  pub descriptor_text:  String,
  pub is_active:        bool,
  /// Provenance only, e.g. `sha256:<hex>` of the enrollment image.
  pub source_image_ref: Option<String>,
  /// Server-assigned; defines encounter order during matching.
  pub enrolled_at:      DateTime<Utc>,
}

/// Input to [`crate::store::DescriptorStore::record_descriptor`].
/// `descriptor_id` and `enrolled_at` are always set by the store.
#[derive(Debug, Clone)]
pub struct NewDescriptor {
  pub account_id:       AccountId,
  pub descriptor_text:  String,
  pub source_image_ref: Option<String>,
}

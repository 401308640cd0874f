//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 strings, UUIDs hyphenated lowercase strings and
//! booleans `0`/`1` integers.

use chrono::{DateTime, Utc};
use facegate_core::{
  account::{AccountAuthState, AccountId},
  descriptor::EnrolledFaceDescriptor,
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `face_descriptors` row.
pub struct RawDescriptor {
  pub descriptor_id:    String,
  pub account_id:       String,
  pub descriptor_text:  String,
  pub is_active:        bool,
  pub source_image_ref: Option<String>,
  pub enrolled_at:      String,
}

impl RawDescriptor {
  pub const COLUMNS: &'static str =
    "descriptor_id, account_id, descriptor_text, is_active, source_image_ref, enrolled_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      descriptor_id:    row.get(0)?,
      account_id:       row.get(1)?,
      descriptor_text:  row.get(2)?,
      is_active:        row.get(3)?,
      source_image_ref: row.get(4)?,
      enrolled_at:      row.get(5)?,
    })
  }

  pub fn into_descriptor(self) -> Result<EnrolledFaceDescriptor> {
    Ok(EnrolledFaceDescriptor {
      descriptor_id:    decode_uuid(&self.descriptor_id)?,
      account_id:       AccountId::new(self.account_id),
      descriptor_text:  self.descriptor_text,
      is_active:        self.is_active,
      source_image_ref: self.source_image_ref,
      enrolled_at:      decode_dt(&self.enrolled_at)?,
    })
  }
}

/// Raw values read directly from an `accounts` row.
pub struct RawAccount {
  pub account_id:         String,
  pub login_identifier:   String,
  pub face_login_enabled: bool,
}

impl RawAccount {
  pub fn into_account(self) -> AccountAuthState {
    AccountAuthState {
      account_id:         AccountId::new(self.account_id),
      login_identifier:   self.login_identifier,
      face_login_enabled: self.face_login_enabled,
    }
  }
}

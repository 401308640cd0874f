//! [`SqliteStore`]: the SQLite implementation of [`DescriptorStore`] and
//! [`AccountStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use facegate_core::{
  account::{AccountAuthState, AccountId},
  descriptor::{EnrolledFaceDescriptor, NewDescriptor},
  store::{AccountStore, DescriptorStore},
};

use crate::{
  encode::{RawAccount, RawDescriptor, encode_dt, encode_uuid},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Descriptor and account store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Register an account auth-state row. Accounts are owned by the identity
  /// backend; this mirrors one so descriptors can reference it.
  pub async fn add_account(
    &self,
    account_id: AccountId,
    login_identifier: &str,
    face_login_enabled: bool,
  ) -> Result<AccountAuthState> {
    let id_str    = account_id.as_str().to_owned();
    let login_str = login_identifier.to_owned();
    let at_str    = encode_dt(Utc::now());

    let inserted = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "INSERT INTO accounts (account_id, login_identifier, face_login_enabled, created_at)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT DO NOTHING",
          rusqlite::params![id_str, login_str, face_login_enabled, at_str],
        )?;
        Ok(n)
      })
      .await?;

    if inserted == 0 {
      return Err(Error::DuplicateAccount(account_id.to_string()));
    }

    Ok(AccountAuthState {
      account_id,
      login_identifier: login_identifier.to_owned(),
      face_login_enabled,
    })
  }

  async fn set_face_login_enabled(&self, account_id: &AccountId, enabled: bool) -> Result<()> {
    let id_str = account_id.as_str().to_owned();

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE accounts SET face_login_enabled = ?2 WHERE account_id = ?1",
          rusqlite::params![id_str, enabled],
        )?;
        Ok(n)
      })
      .await?;

    if updated == 0 {
      return Err(Error::AccountNotFound(account_id.to_string()));
    }
    debug!(%account_id, enabled, "face_login_enabled updated");
    Ok(())
  }
}

// ─── DescriptorStore impl ────────────────────────────────────────────────────

impl DescriptorStore for SqliteStore {
  type Error = Error;

  async fn list_active_descriptors(&self) -> Result<Vec<EnrolledFaceDescriptor>> {
    let raws: Vec<RawDescriptor> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {} FROM face_descriptors WHERE is_active = 1 ORDER BY enrolled_at, rowid",
          RawDescriptor::COLUMNS
        ))?;
        let rows = stmt
          .query_map([], RawDescriptor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDescriptor::into_descriptor).collect()
  }

  async fn record_descriptor(&self, input: NewDescriptor) -> Result<EnrolledFaceDescriptor> {
    let descriptor = EnrolledFaceDescriptor {
      descriptor_id:    Uuid::new_v4(),
      account_id:       input.account_id,
      descriptor_text:  input.descriptor_text,
      is_active:        true,
      source_image_ref: input.source_image_ref,
      enrolled_at:      Utc::now(),
    };

    let id_str      = encode_uuid(descriptor.descriptor_id);
    let account_str = descriptor.account_id.as_str().to_owned();
    let text        = descriptor.descriptor_text.clone();
    let image_ref   = descriptor.source_image_ref.clone();
    let at_str      = encode_dt(descriptor.enrolled_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO face_descriptors (
             descriptor_id, account_id, descriptor_text, is_active,
             source_image_ref, enrolled_at
           ) VALUES (?1, ?2, ?3, 1, ?4, ?5)",
          rusqlite::params![id_str, account_str, text, image_ref, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(descriptor)
  }

  async fn deactivate_descriptors(&self, account_id: &AccountId) -> Result<usize> {
    let id_str = account_id.as_str().to_owned();

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE face_descriptors SET is_active = 0
           WHERE account_id = ?1 AND is_active = 1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(n)
  }

  async fn count_active_descriptors(&self, account_id: &AccountId) -> Result<usize> {
    let id_str = account_id.as_str().to_owned();

    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM face_descriptors WHERE account_id = ?1 AND is_active = 1",
          rusqlite::params![id_str],
          |row| row.get(0),
        )?)
      })
      .await?;
    Ok(usize::try_from(n).unwrap_or_default())
  }
}

// ─── AccountStore impl ───────────────────────────────────────────────────────

impl AccountStore for SqliteStore {
  type Error = Error;

  async fn get_account(&self, account_id: &AccountId) -> Result<Option<AccountAuthState>> {
    let id_str = account_id.as_str().to_owned();

    let raw: Option<RawAccount> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT account_id, login_identifier, face_login_enabled
             FROM accounts WHERE account_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok(RawAccount {
                account_id:         row.get(0)?,
                login_identifier:   row.get(1)?,
                face_login_enabled: row.get(2)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawAccount::into_account))
  }

  async fn enable_face_login(&self, account_id: &AccountId) -> Result<()> {
    self.set_face_login_enabled(account_id, true).await
  }

  async fn disable_face_login(&self, account_id: &AccountId) -> Result<()> {
    self.set_face_login_enabled(account_id, false).await
  }
}

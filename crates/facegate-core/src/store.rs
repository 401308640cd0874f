//! Storage traits for descriptors and account auth state.
//!
//! Both are implemented by the relational backend (e.g.
//! `facegate-store-sqlite`). The verification path only reads descriptors and
//! only ever *enables* face login; deactivation and disabling belong to the
//! enrollment flow.

use std::future::Future;

use crate::{
  account::{AccountAuthState, AccountId},
  descriptor::{EnrolledFaceDescriptor, NewDescriptor},
};

/// Enrolled face descriptors.
pub trait DescriptorStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every active descriptor across all accounts, in enrollment order.
  fn list_active_descriptors(
    &self,
  ) -> impl Future<Output = Result<Vec<EnrolledFaceDescriptor>, Self::Error>> + Send + '_;

  /// Persist a new active descriptor. `descriptor_id` and `enrolled_at` are
  /// assigned by the store.
  fn record_descriptor(
    &self,
    input: NewDescriptor,
  ) -> impl Future<Output = Result<EnrolledFaceDescriptor, Self::Error>> + Send + '_;

  /// Soft-revoke every active descriptor of an account. Returns how many were
  /// deactivated.
  fn deactivate_descriptors<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;

  /// Number of active descriptors for one account.
  fn count_active_descriptors<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + 'a;
}

/// Per-account auth state.
pub trait AccountStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Returns `None` if the account does not exist.
  fn get_account<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<Option<AccountAuthState>, Self::Error>> + Send + 'a;

  /// Set `face_login_enabled = true`. Idempotent.
  fn enable_face_login<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Set `face_login_enabled = false`. Idempotent.
  fn disable_face_login<'a>(
    &'a self,
    account_id: &'a AccountId,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

//! Enrollment and explicit disabling of face login.
//!
//! These are the only operations that create descriptors, deactivate them or
//! turn `face_login_enabled` off. The verification pipeline never does any of
//! the three.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::{
  Error, Result,
  account::{AccountAuthState, AccountId},
  descriptor::{EnrolledFaceDescriptor, NewDescriptor},
  image::ImagePayload,
  perception::{PerceptionService, generate_descriptor, verify_presence},
  store::{AccountStore, DescriptorStore},
};

/// Current face-login state of one account.
#[derive(Debug, Clone, Serialize)]
pub struct FaceLoginStatus {
  pub account:            AccountAuthState,
  pub active_descriptors: usize,
}

pub struct FaceEnrollment<P, S> {
  perception: Arc<P>,
  store:      Arc<S>,
}

impl<P, S> FaceEnrollment<P, S>
where
  P: PerceptionService,
  S: DescriptorStore + AccountStore,
{
  pub fn new(perception: Arc<P>, store: Arc<S>) -> Self { Self { perception, store } }

  /// Describe the face in `image` and store it as a new active descriptor
  /// for `account_id`. Enrolling is an explicit opt-in, so face login is
  /// enabled for the account afterwards.
  pub async fn enroll(
    &self,
    account_id: &AccountId,
    image: &str,
  ) -> Result<EnrolledFaceDescriptor> {
    let image = ImagePayload::parse(image)?;
    let account = self.require_account(account_id).await?;

    if !verify_presence(self.perception.as_ref(), &image).await? {
      info!(%account_id, "enrollment rejected: no face detected");
      return Err(Error::NoFaceDetected);
    }
    let descriptor_text = generate_descriptor(self.perception.as_ref(), &image).await?;

    // Flag before descriptor: a failed write leaves nothing stored.
    if !account.face_login_enabled {
      self
        .store
        .enable_face_login(account_id)
        .await
        .map_err(|e| {
          error!(%account_id, error = %e, "failed to enable face login");
          Error::AccountUpdate(Box::new(e))
        })?;
    }

    let stored = self
      .store
      .record_descriptor(NewDescriptor {
        account_id: account.account_id.clone(),
        descriptor_text,
        source_image_ref: Some(image.content_ref()),
      })
      .await
      .map_err(|e| {
        error!(%account_id, error = %e, "failed to store descriptor");
        Error::DescriptorStore(Box::new(e))
      })?;

    info!(
      %account_id,
      descriptor_id = %stored.descriptor_id,
      "face enrolled"
    );
    Ok(stored)
  }

  /// Deactivate every descriptor of the account and turn face login off.
  /// Returns the number of descriptors deactivated.
  pub async fn disable(&self, account_id: &AccountId) -> Result<usize> {
    self.require_account(account_id).await?;

    let deactivated = self
      .store
      .deactivate_descriptors(account_id)
      .await
      .map_err(|e| Error::DescriptorStore(Box::new(e)))?;
    self
      .store
      .disable_face_login(account_id)
      .await
      .map_err(|e| Error::AccountUpdate(Box::new(e)))?;

    info!(%account_id, deactivated, "face login disabled");
    Ok(deactivated)
  }

  pub async fn status(&self, account_id: &AccountId) -> Result<FaceLoginStatus> {
    let account = self.require_account(account_id).await?;
    let active_descriptors = self
      .store
      .count_active_descriptors(account_id)
      .await
      .map_err(|e| Error::DescriptorStore(Box::new(e)))?;
    Ok(FaceLoginStatus { account, active_descriptors })
  }

  async fn require_account(&self, account_id: &AccountId) -> Result<AccountAuthState> {
    self
      .store
      .get_account(account_id)
      .await
      .map_err(|e| Error::AccountLookup(Box::new(e)))?
      .ok_or_else(|| Error::AccountNotFound(account_id.clone()))
  }
}

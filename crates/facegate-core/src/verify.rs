//! The face-login pipeline.
//!
//! ```text
//! image ─► presence ─► descriptor ─► match selector ─► session issuer
//!            │ no face                  │ nothing ≥ 70
//!            ▼                          ▼
//!       NoFaceDetected               NoMatch
//! ```
//!
//! Everything before [`FaceLogin::issue_session`] is identification only;
//! issuing the login link is the single step that grants authorization.

use std::sync::Arc;

use futures::{StreamExt as _, stream};
use tracing::{debug, error, info, warn};

use crate::{
  Error, Result,
  account::AccountId,
  descriptor::EnrolledFaceDescriptor,
  identity::LoginLinkIssuer,
  image::ImagePayload,
  perception::{PerceptionService, generate_descriptor, verify_presence},
  score::{ACCEPTANCE_THRESHOLD, MAX_SCORE},
  select::{MatchCandidate, ScoredCandidate, best_score, select_best},
  session::IssuedSession,
  store::{AccountStore, DescriptorStore},
};

/// Default number of comparisons in flight at once.
pub const DEFAULT_COMPARE_CONCURRENCY: usize = 4;

/// Orchestrates one verification attempt per call. Holds no per-attempt
/// state, so a single instance serves concurrent requests.
pub struct FaceLogin<P, S, L> {
  perception:          Arc<P>,
  store:               Arc<S>,
  links:               Arc<L>,
  compare_concurrency: usize,
}

impl<P, S, L> FaceLogin<P, S, L>
where
  P: PerceptionService,
  S: DescriptorStore + AccountStore,
  L: LoginLinkIssuer,
{
  pub fn new(perception: Arc<P>, store: Arc<S>, links: Arc<L>) -> Self {
    Self {
      perception,
      store,
      links,
      compare_concurrency: DEFAULT_COMPARE_CONCURRENCY,
    }
  }

  /// Bound the comparison fan-out. Values below 1 are treated as 1.
  pub fn with_compare_concurrency(mut self, n: usize) -> Self {
    self.compare_concurrency = n.max(1);
    self
  }

  /// Run a full attempt against a raw base64 or data-URL image.
  pub async fn verify(&self, image: &str) -> Result<IssuedSession> {
    let image = ImagePayload::parse(image)?;

    if !verify_presence(self.perception.as_ref(), &image).await? {
      info!("face login rejected: no face detected");
      return Err(Error::NoFaceDetected);
    }

    let descriptor = generate_descriptor(self.perception.as_ref(), &image).await?;
    let candidate = self.select_match(&descriptor).await?;
    self.issue_session(candidate).await
  }

  // ─── Match selector ────────────────────────────────────────────────────────

  /// Compare `submitted` against every active descriptor and pick the best
  /// candidate at or above [`ACCEPTANCE_THRESHOLD`].
  pub async fn select_match(&self, submitted: &str) -> Result<MatchCandidate> {
    let enrolled = self
      .store
      .list_active_descriptors()
      .await
      .map_err(|e| {
        error!(error = %e, "descriptor scan failed");
        Error::DescriptorStore(Box::new(e))
      })?;

    if enrolled.is_empty() {
      info!("face login rejected: no active enrollments");
      return Err(Error::NoEnrollments);
    }

    let scored = self.score_all(submitted, &enrolled).await;
    let best = best_score(&scored);

    match select_best(scored, ACCEPTANCE_THRESHOLD) {
      Some(candidate) => Ok(candidate),
      None => {
        info!(
          candidates = enrolled.len(),
          best_score = best,
          threshold = ACCEPTANCE_THRESHOLD,
          "face login rejected: no candidate cleared the threshold"
        );
        Err(Error::NoMatch { best_score: best })
      }
    }
  }

  /// Score every descriptor with bounded parallelism. Results come back in
  /// completion order; each carries its original index for the selector.
  async fn score_all(
    &self,
    submitted: &str,
    enrolled: &[EnrolledFaceDescriptor],
  ) -> Vec<ScoredCandidate> {
    let submitted: Arc<str> = Arc::from(submitted);
    let jobs: Vec<_> = enrolled
      .iter()
      .cloned()
      .enumerate()
      .map(|(index, descriptor)| {
        let perception = Arc::clone(&self.perception);
        let submitted = Arc::clone(&submitted);
        async move { score_one(perception.as_ref(), index, &submitted, &descriptor).await }
      })
      .collect();

    stream::iter(jobs)
      .buffer_unordered(self.compare_concurrency)
      .collect()
      .await
  }

  // ─── Session issuer ────────────────────────────────────────────────────────

  /// Turn an accepted match into session credentials.
  ///
  /// Enables face login for the account if it was off. That write is the
  /// only place the flag is changed by this pipeline, and it never sets it to
  /// `false`; a failed write is logged and does not block issuance.
  pub async fn issue_session(&self, candidate: MatchCandidate) -> Result<IssuedSession> {
    let account = self
      .store
      .get_account(&candidate.account_id)
      .await
      .map_err(|e| {
        error!(account_id = %candidate.account_id, error = %e, "account lookup failed");
        Error::AccountLookup(Box::new(e))
      })?
      .ok_or_else(|| {
        error!(account_id = %candidate.account_id, "matched account has no auth state");
        Error::AccountNotFound(candidate.account_id.clone())
      })?;

    if !account.face_login_enabled {
      self.auto_enable(&account.account_id).await;
    }

    let artifact = self
      .links
      .issue_login_link(&account.login_identifier)
      .await
      .map_err(|e| {
        error!(account_id = %account.account_id, error = %e, "login link request failed");
        Error::LoginLink(Box::new(e))
      })?;

    let credentials = artifact.credentials().inspect_err(|e| {
      error!(account_id = %account.account_id, error = %e, "login link carried no session");
    })?;

    info!(
      account_id = %account.account_id,
      similarity_score = candidate.similarity_score,
      "face login succeeded"
    );

    Ok(IssuedSession {
      access_token:     credentials.access_token,
      refresh_token:    credentials.refresh_token,
      account_id:       account.account_id,
      login_identifier: account.login_identifier,
      similarity_score: candidate.similarity_score,
    })
  }

  async fn auto_enable(&self, account_id: &AccountId) {
    match self.store.enable_face_login(account_id).await {
      Ok(()) => info!(%account_id, "face login auto-enabled after first successful match"),
      Err(e) => warn!(%account_id, error = %e, "could not auto-enable face login; continuing"),
    }
  }
}

// ─── Pairwise matcher ────────────────────────────────────────────────────────

/// A failed comparison scores zero for this candidate only.
async fn score_one<P: PerceptionService>(
  perception: &P,
  index: usize,
  submitted: &str,
  descriptor: &EnrolledFaceDescriptor,
) -> ScoredCandidate {
  let similarity_score = match perception
    .compare(submitted, &descriptor.descriptor_text)
    .await
  {
    Ok(score) => score.min(MAX_SCORE),
    Err(e) => {
      warn!(
        descriptor_id = %descriptor.descriptor_id,
        error = %e,
        "comparison failed; scoring candidate as 0"
      );
      0
    }
  };
  debug!(
    index,
    descriptor_id = %descriptor.descriptor_id,
    account_id = %descriptor.account_id,
    similarity_score,
    "candidate scored"
  );
  ScoredCandidate {
    index,
    account_id: descriptor.account_id.clone(),
    similarity_score,
  }
}

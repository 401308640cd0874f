//! Best-match selection over scored candidates.
//!
//! Scoring may run concurrently and complete in any order, so every score
//! carries the index of the descriptor it came from. Selection re-sorts by
//! that index before applying the tie-break, which makes the outcome
//! independent of completion order.

use serde::{Deserialize, Serialize};

use crate::account::AccountId;

/// The accepted match of a verification attempt. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchCandidate {
  pub account_id:       AccountId,
  pub similarity_score: u8,
}

/// One comparison result tagged with the encounter position of its
/// descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredCandidate {
  pub index:            usize,
  pub account_id:       AccountId,
  pub similarity_score: u8,
}

/// Pick the best candidate scoring at least `threshold`.
///
/// A candidate replaces the running best only when its score is strictly
/// greater, so among equal top scores the lowest index wins.
pub fn select_best(
  mut scored: Vec<ScoredCandidate>,
  threshold: u8,
) -> Option<MatchCandidate> {
  scored.sort_by_key(|c| c.index);

  let mut best: Option<MatchCandidate> = None;
  for candidate in scored {
    if candidate.similarity_score < threshold {
      continue;
    }
    if best
      .as_ref()
      .is_none_or(|b| candidate.similarity_score > b.similarity_score)
    {
      best = Some(MatchCandidate {
        account_id:       candidate.account_id,
        similarity_score: candidate.similarity_score,
      });
    }
  }
  best
}

/// Highest score seen, accepted or not. Used for diagnostics on rejection.
pub fn best_score(scored: &[ScoredCandidate]) -> u8 {
  scored.iter().map(|c| c.similarity_score).max().unwrap_or(0)
}

//! Similarity scores returned by the pairwise matcher.

/// Minimum similarity a candidate must reach to count as a match.
pub const ACCEPTANCE_THRESHOLD: u8 = 70;

/// Highest possible similarity.
pub const MAX_SCORE: u8 = 100;

/// Extract a similarity score from a free-text comparison reply.
///
/// Takes the first integer token and clamps it to `0..=100`. A reply with no
/// integer scores `0`, as does a negative number. Decimals are truncated
/// (`"85.5"` is `85`).
pub fn parse_similarity(reply: &str) -> u8 {
  let bytes = reply.as_bytes();
  let Some(start) = bytes.iter().position(u8::is_ascii_digit) else {
    return 0;
  };
  if start > 0 && bytes[start - 1] == b'-' {
    return 0;
  }

  let value = bytes[start..]
    .iter()
    .take_while(|b| b.is_ascii_digit())
    .fold(0u64, |acc, b| acc.saturating_mul(10).saturating_add(u64::from(b - b'0')));

  value.min(u64::from(MAX_SCORE)) as u8
}

//! Identity backend client issuing one-time login links.
//!
//! Talks to a GoTrue-style admin API: `POST /admin/generate_link` produces a
//! magic-link verification URL; following it once (without auto-redirect)
//! yields the redirect whose fragment carries the session tokens.

mod client;

pub mod error;

pub use client::{IdentityConfig, MagicLinkIssuer};
pub use error::{Error, Result};

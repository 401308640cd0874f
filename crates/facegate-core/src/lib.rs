//! Core types, collaborator traits and decision policy for face login.
//!
//! No HTTP or database dependencies live here. Perception, storage and identity are reached through the traits in
//! [`perception`], [`store`] and [`identity`]; everything else here is local
//! policy: image validation, score parsing, best-match selection and session
//! credential extraction.

// Trait methods return `impl Future + Send`; implementors may still write
// plain `async fn`.
#![allow(async_fn_in_trait)]

pub mod account;
pub mod descriptor;
pub mod enroll;
pub mod error;
pub mod identity;
pub mod image;
pub mod perception;
pub mod score;
pub mod select;
pub mod session;
pub mod store;
pub mod verify;

pub use error::{BoxError, Error, Result};

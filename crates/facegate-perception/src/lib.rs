//! Perception service backed by an OpenAI-compatible vision chat API.
//!
//! Implements [`facegate_core::perception::PerceptionService`] with one chat
//! completion per call: a yes/no presence question, a fixed-structure face
//! description, and a strict text-only comparison of two descriptions.

mod client;
mod prompts;

pub mod error;

pub use client::{ChatPerception, PerceptionConfig, parse_presence};
pub use error::{Error, Result};

//! Shared contracts for Relay crates

#![allow(clippy::must_use_candidate)]

mod error;

pub use error::{HttpError, error_body};

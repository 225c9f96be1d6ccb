//! # WKMP Common Library
//!
//! Shared code for WKMP mix-compatibility crates:
//! - Error types
//! - Configuration file resolution and loading
//! - Tracing subscriber setup

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

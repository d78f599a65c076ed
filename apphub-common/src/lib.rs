//! # AppHub Common Library
//!
//! Shared code for the AppHub micro-app services:
//! - Recommendation domain types (the wire contract the UI consumes)
//! - Configuration file loading
//! - Common error type

pub mod config;
pub mod error;
pub mod types;

pub use error::{Error, Result};

//! # Casefile Client Library
//!
//! Fetch layer, configuration and view driver behind the `casefile` binary.
//! Exposed as a library so integration tests can drive them directly.

pub mod cli;
pub mod client;
pub mod config;
pub mod driver;
pub mod render;

pub use client::{ClientError, RecordClient, RecordSource};
pub use config::Config;

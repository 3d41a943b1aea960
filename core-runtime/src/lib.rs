//! # Core Runtime Module
//!
//! Provides the process-level infrastructure the catalog crates depend on:
//! - Logging and tracing infrastructure
//! - Startup configuration
//!
//! ## Overview
//!
//! Everything in this crate is read or initialised once, at process start.
//! The resulting [`config::CatalogConfig`] is handed to the catalog core by
//! value or reference; no catalog component reads the environment mid-call.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};

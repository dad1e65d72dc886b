//! # Acris Common Library
//!
//! Shared code for the Acris track ingest crates:
//! - Error type shared by storage and configuration code
//! - Configuration loading and root folder resolution
//! - SQLite database initialization and library schema

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};

//! Test helper utilities
//!
//! Shared utilities for testing acris-ingest

pub mod db_utils;
pub mod fixtures;
pub mod log_capture;

#[allow(unused_imports)]
pub use db_utils::{memory_ingestor, memory_store};
#[allow(unused_imports)]
pub use log_capture::LogCapture;

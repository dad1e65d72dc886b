//! Database initialization and library schema

pub mod init;

pub use init::*;

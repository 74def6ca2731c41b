//! Logging utilities.
//!
//! Centralizes logger initialization on top of the standard `log` facade
//! with an `env_logger` backend.

mod init;

pub use init::{init_logging, LoggingConfig};

//! Shared utilities for the stock dashboard
//!
//! This crate provides the logging setup shared by the dashboard library and
//! its host binaries.

pub mod config;
pub mod logging;

pub use config::{LogConfig, LogFormat};
pub use logging::{init_tracing, init_tracing_with};

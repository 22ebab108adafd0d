//! Shared utilities for vagent.
//!
//! This crate provides common utilities used across the vagent workspace:
//! - Logging setup with tracing
//! - Config, log and workspace directory locations
//! - RAII-based timing for tool and model calls

pub mod log;
pub mod path;
pub mod timing;

pub use log::{LogConfig, LogLevel};
pub use timing::TimingGuard;

//! Shared types and configuration for Vendra.
//!
//! This crate provides common types used across all other crates:
//! - Currency codes with decimal-safe cent rounding
//! - Typed IDs for type-safe record references
//! - Configuration management
//! - Tracing subscriber setup

pub mod config;
pub mod telemetry;
pub mod types;

pub use config::{AppConfig, LogConfig, StoreConfig};
pub use types::*;

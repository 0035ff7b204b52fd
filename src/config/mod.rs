//! Configuration module for vault export
//!
//! This module provides the `ExportConfig` struct and its type-safe builder
//! for configuring export runs with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod types;

// Re-exports for public API
pub use builder::{ExportConfigBuilder, WithHost, WithOutputDir};
pub use types::ExportConfig;

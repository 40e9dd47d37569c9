//! Shared utilities for Lumen: logging setup and project settings.
//!
//! This crate provides common infrastructure used across all Lumen components.

#![forbid(unsafe_code)]

pub mod settings;

pub use settings::{MirrorViewMode, ProjectSettings, SettingsError, StereoRenderingMode};

/// Initialize tracing with sensible defaults.
///
/// Log level is controlled by the `RUST_LOG` environment variable.
/// Defaults to `info` if not set.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

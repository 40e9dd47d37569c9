//! Error types for the direct-display core.
//!
//! Every OS call that can fail maps to a typed variant here; nothing is
//! silently swallowed. Claim-path failures each carry the extended error
//! code the display subsystem reported.

use thiserror::Error;

/// Result type alias using the display core's error type.
pub type Result<T> = std::result::Result<T, DisplayError>;

/// Errors from display enumeration, claiming, and presentation.
#[derive(Debug, Error)]
pub enum DisplayError {
    /// OS display enumeration failed.
    #[error("display enumeration failed: {0}")]
    Enumeration(String),

    /// EDID blob too short to carry a vendor id (needs bytes 8..10).
    #[error("EDID too short for vendor id: {len} bytes")]
    EdidTooShort { len: usize },

    /// No acceptable mode exists for the connected path.
    #[error("could not find suitable mode")]
    NoSuitableMode,

    /// The display target could not be acquired, typically because another
    /// process already holds it exclusively.
    #[error("could not acquire display target (extended error {code:#010x})")]
    Acquire { code: i32 },

    /// The one-shot state apply was rejected, e.g. by a bandwidth or cable
    /// limitation.
    #[error("could not apply display state (extended error {code:#010x})")]
    Apply { code: i32 },

    /// Read-back after apply found no path for the target: a stuck previous
    /// claim. Usually fixed by a reboot.
    #[error("failed to take display - usually fixed by a reboot")]
    Takeover,

    /// GPU device creation against the target's adapter failed.
    #[error("device creation failed: {0}")]
    DeviceCreation(String),

    /// Sharing a surface or fence across devices failed.
    #[error("cross-device interop failed: {0}")]
    Interop(String),

    /// Presentation call failed after construction.
    #[error("presentation failed: {0}")]
    Presentation(String),

    /// Swap surface count outside the supported range.
    #[error("surface count must be at least 1")]
    InvalidSurfaceCount,

    /// Direct display is not supported on this platform.
    #[error("direct display is not supported on this platform")]
    Unsupported,
}

impl DisplayError {
    pub fn enumeration(msg: impl std::fmt::Display) -> Self {
        Self::Enumeration(msg.to_string())
    }

    pub fn device_creation(msg: impl std::fmt::Display) -> Self {
        Self::DeviceCreation(msg.to_string())
    }

    pub fn interop(msg: impl std::fmt::Display) -> Self {
        Self::Interop(msg.to_string())
    }

    pub fn presentation(msg: impl std::fmt::Display) -> Self {
        Self::Presentation(msg.to_string())
    }
}

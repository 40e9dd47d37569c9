//! Stub direct-display manager for platforms without the display core API.
//!
//! Keeps the crate compiling everywhere so the pure modules (EDID, mode
//! comparison, ring, detection) stay testable off-Windows.

use crate::detect::{DisplayHandle, DisplaySource};
use crate::error::{DisplayError, Result};

/// Placeholder display; never produced.
#[derive(Debug, Clone)]
pub struct Display;

impl DisplayHandle for Display {
    fn name(&self) -> String {
        String::new()
    }

    fn adapter_luid(&self) -> u64 {
        0
    }
}

/// Direct display is a Windows-only capability.
pub struct DirectDisplayManager;

impl DirectDisplayManager {
    pub fn new() -> Result<Self> {
        Err(DisplayError::Unsupported)
    }
}

impl DisplaySource for DirectDisplayManager {
    type Display = Display;

    fn direct_candidates(&self) -> Result<Vec<Display>> {
        Err(DisplayError::Unsupported)
    }

    fn all_displays(&self) -> Result<Vec<Display>> {
        Err(DisplayError::Unsupported)
    }

    fn fallback_adapter_luid(&self) -> u64 {
        0
    }
}

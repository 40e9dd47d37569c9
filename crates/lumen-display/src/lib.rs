//! Direct-mode display core.
//!
//! Finds the HMD among the OS's display targets by EDID vendor id, takes
//! exclusive ownership of it away from the desktop compositor, negotiates a
//! presentation mode, and presents frames through shared D3D11 surfaces
//! fenced against the display subsystem's task scheduler.
//!
//! The typical flow is enumeration ([`DirectDisplayManager`]) → detection
//! ([`DisplayDetector`]) → claim ([`ClaimedDisplay`]) → presentation
//! ([`PresentationEngine`]), where enumeration and claiming happen once on
//! the main thread and the presentation engine is owned by a single render
//! thread for the life of the session.

pub mod detect;
pub mod edid;
pub mod error;
pub mod mode;
pub mod ring;

#[cfg(target_os = "windows")]
pub mod windows;
#[cfg(target_os = "windows")]
pub use windows::{
    default_adapter_luid, ClaimedDisplay, DirectDisplayManager, Display, PresentationEngine,
};

#[cfg(not(target_os = "windows"))]
pub mod dummy;
#[cfg(not(target_os = "windows"))]
pub use dummy::{DirectDisplayManager, Display};

pub use detect::{DisplayDetector, DisplayHandle, DisplaySource, InitStatus};
pub use error::{DisplayError, Result};
pub use mode::{RefreshRate, MAX_REFRESH_HZ};
pub use ring::{FrameRing, DEFAULT_SURFACE_COUNT};

/// Detector specialized to the platform display manager.
pub type HmdDetector = DisplayDetector<DirectDisplayManager>;

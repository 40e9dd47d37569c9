//! Host-engine boundary for the direct-display core.
//!
//! The host engine drives rendering through C-ABI callback tables; this
//! crate models that boundary as capability traits plus an explicit context
//! object, so the core components stay free of global state. The actual ABI
//! glue lives with the host integration, not here.

#![forbid(unsafe_code)]

pub mod adapter;
pub mod frame;
pub mod input;
#[cfg(target_os = "windows")]
pub mod session;

pub use adapter::{ProviderContext, ProviderError, ProviderResult, RenderLoopHooks};
pub use frame::{EyeSlice, FrameDesc, MirrorBlitDesc};
pub use input::{PoseSource, StationaryPoseSource, TrackedPose};
#[cfg(target_os = "windows")]
pub use session::DirectModeSession;

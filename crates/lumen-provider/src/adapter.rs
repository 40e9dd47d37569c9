//! Provider context and the graphics-thread capability trait.
//!
//! The original integration kept its state in file-scope statics; here the
//! context travels explicitly through the adapter layer instead.

use lumen_common::settings::{MirrorViewMode, ProjectSettings};
use lumen_display::InitStatus;
use thiserror::Error;
use tracing::info;

use crate::frame::{FrameDesc, MirrorBlitDesc};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("display error: {0}")]
    Display(#[from] lumen_display::DisplayError),

    #[error("provider not started")]
    NotStarted,
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Graphics-thread callbacks the host engine drives each frame.
///
/// Implemented by the integration that owns the presentation engine; the
/// host's callback tables dispatch onto this, not onto core internals.
pub trait RenderLoopHooks: Send {
    /// Rendering is about to begin for the session.
    fn on_start(&mut self) -> ProviderResult<()>;

    /// Describe the next frame: blocks for frame pacing and names the swap
    /// surface to render into.
    fn on_populate_frame(&mut self) -> ProviderResult<FrameDesc>;

    /// The host finished rendering the current frame; submit it.
    fn on_submit(&mut self) -> ProviderResult<()>;

    /// Rendering is stopping; leave the display blanked.
    fn on_stop(&mut self);
}

/// Explicit state shared between the lifecycle, graphics-thread, and
/// main-thread callback sets.
#[derive(Debug, Clone)]
pub struct ProviderContext {
    settings: ProjectSettings,
    status: InitStatus,
    adapter_luid: u64,
}

impl ProviderContext {
    pub fn new(settings: ProjectSettings) -> Self {
        info!(
            "Provider starting: stereo={}, mirror={}, rotate_eyes={}",
            settings.stereo_rendering_mode, settings.mirror_view_mode, settings.rotate_eyes
        );
        Self {
            settings,
            status: InitStatus::NotInitialized,
            adapter_luid: 0,
        }
    }

    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Record the outcome of display detection.
    pub fn set_detection(&mut self, status: InitStatus, adapter_luid: u64) {
        self.status = status;
        self.adapter_luid = adapter_luid;
    }

    /// Status queried by the host application, as a stable numeric code.
    pub fn status_code(&self) -> u32 {
        self.status.as_code()
    }

    pub fn status(&self) -> InitStatus {
        self.status
    }

    /// Adapter the host should create its GPU device on. Valid after
    /// detection, even when no HMD was found.
    pub fn adapter_luid(&self) -> u64 {
        self.adapter_luid
    }

    /// The host may switch mirror modes at runtime.
    pub fn set_mirror_view_mode(&mut self, mode: MirrorViewMode) {
        info!("Mirror view mode -> {mode}");
        self.settings.mirror_view_mode = mode;
    }

    /// Answer the host's mirror-view blit query for the given surface.
    pub fn mirror_blit_desc(&self, surface_index: usize) -> MirrorBlitDesc {
        MirrorBlitDesc::from_mode(self.settings.mirror_view_mode, surface_index)
    }
}

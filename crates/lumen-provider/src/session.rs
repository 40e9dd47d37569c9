//! Direct-mode render session: the presentation engine behind the
//! graphics-thread hooks.

use lumen_display::PresentationEngine;
use tracing::info;

use crate::adapter::{ProviderError, ProviderResult, RenderLoopHooks};
use crate::frame::FrameDesc;

/// Owns the presentation engine for the life of a direct-mode session and
/// adapts it to the host's frame callbacks.
///
/// Must live on the one thread driving presentation; `on_populate_frame`
/// blocks that thread until vblank.
pub struct DirectModeSession {
    engine: PresentationEngine,
    started: bool,
}

impl DirectModeSession {
    pub fn new(engine: PresentationEngine) -> Self {
        Self {
            engine,
            started: false,
        }
    }

    pub fn engine(&self) -> &PresentationEngine {
        &self.engine
    }
}

impl RenderLoopHooks for DirectModeSession {
    fn on_start(&mut self) -> ProviderResult<()> {
        info!(
            "Render session starting: {}x{}, {} surfaces",
            self.engine.width(),
            self.engine.height(),
            self.engine.surface_count()
        );
        self.started = true;
        Ok(())
    }

    fn on_populate_frame(&mut self) -> ProviderResult<FrameDesc> {
        if !self.started {
            return Err(ProviderError::NotStarted);
        }
        let surface_index = self.engine.wait_frame()?;
        Ok(FrameDesc::new(
            surface_index,
            self.engine.width(),
            self.engine.height(),
        ))
    }

    fn on_submit(&mut self) -> ProviderResult<()> {
        if !self.started {
            return Err(ProviderError::NotStarted);
        }
        self.engine.end_frame()?;
        Ok(())
    }

    fn on_stop(&mut self) {
        self.started = false;
        if let Err(err) = self.engine.blank_screen() {
            tracing::warn!("Failed to blank screen on stop: {err}");
        }
        info!("Render session stopped");
    }
}

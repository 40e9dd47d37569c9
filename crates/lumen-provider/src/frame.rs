//! Frame and mirror-view descriptors exchanged with the host engine.

use lumen_common::settings::MirrorViewMode;
use serde::{Deserialize, Serialize};

/// One eye's slice of a swap surface.
///
/// Both eyes render side by side into the same surface; the slice is
/// expressed as a UV sub-rect so the host can address either half.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EyeSlice {
    /// 0 = left, 1 = right.
    pub eye: u32,
    /// UV rect origin, [0,1] coordinates.
    pub uv_origin: [f32; 2],
    /// UV rect size, [0,1] coordinates.
    pub uv_size: [f32; 2],
}

impl EyeSlice {
    /// Side-by-side layout across a single surface.
    pub fn side_by_side(eye: u32) -> Self {
        Self {
            eye,
            uv_origin: [0.5 * eye as f32, 0.0],
            uv_size: [0.5, 1.0],
        }
    }
}

/// What the host renders into for the upcoming frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrameDesc {
    /// Swap surface index returned by the wait phase.
    pub surface_index: usize,
    /// Surface dimensions in pixels.
    pub width: u32,
    pub height: u32,
    pub eyes: [EyeSlice; 2],
}

impl FrameDesc {
    pub fn new(surface_index: usize, width: u32, height: u32) -> Self {
        Self {
            surface_index,
            width,
            height,
            eyes: [EyeSlice::side_by_side(0), EyeSlice::side_by_side(1)],
        }
    }
}

/// Answer to the host's mirror-view blit query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MirrorBlitDesc {
    /// Host blit code derived from the configured mirror mode.
    pub blit_code: u16,
    /// Source swap surface to mirror from.
    pub surface_index: usize,
}

impl MirrorBlitDesc {
    pub fn from_mode(mode: MirrorViewMode, surface_index: usize) -> Self {
        Self {
            blit_code: mode.host_blit_code(),
            surface_index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_by_side_layout() {
        let desc = FrameDesc::new(1, 3200, 1600);
        assert_eq!(desc.eyes[0].uv_origin, [0.0, 0.0]);
        assert_eq!(desc.eyes[1].uv_origin, [0.5, 0.0]);
        assert_eq!(desc.eyes[0].uv_size, [0.5, 1.0]);
    }

    #[test]
    fn test_mirror_blit_follows_mode() {
        let desc = MirrorBlitDesc::from_mode(MirrorViewMode::RightEye, 0);
        assert_eq!(desc.blit_code, 2);
    }
}

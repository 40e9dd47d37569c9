//! Pose contract for the input side of the provider.
//!
//! The display core does not produce poses; it consumes them from whatever
//! tracking source the integration supplies. A stationary source is
//! provided as the default, since the reference hardware ships without
//! positional tracking wired up.

use glam::{Quat, Vec3};

/// A timestamped head pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedPose {
    pub position: Vec3,
    pub orientation: Quat,
    /// Microseconds, monotonic, source-defined epoch.
    pub timestamp_us: u64,
    /// False when the source has lost tracking; consumers should hold the
    /// last good pose rather than snap to origin.
    pub is_tracked: bool,
}

impl TrackedPose {
    pub fn untracked() -> Self {
        Self {
            position: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            timestamp_us: 0,
            is_tracked: false,
        }
    }
}

/// Supplies head poses to the provider's input subsystem.
pub trait PoseSource: Send {
    /// Pose predicted for the given display time.
    fn head_pose(&mut self, predicted_time_us: u64) -> TrackedPose;
}

/// Fixed pose at a seated eye height, identity orientation.
pub struct StationaryPoseSource {
    eye_height_m: f32,
}

impl StationaryPoseSource {
    pub const DEFAULT_EYE_HEIGHT_M: f32 = 1.2;

    pub fn new(eye_height_m: f32) -> Self {
        Self { eye_height_m }
    }
}

impl Default for StationaryPoseSource {
    fn default() -> Self {
        Self::new(Self::DEFAULT_EYE_HEIGHT_M)
    }
}

impl PoseSource for StationaryPoseSource {
    fn head_pose(&mut self, predicted_time_us: u64) -> TrackedPose {
        TrackedPose {
            position: Vec3::new(0.0, self.eye_height_m, 0.0),
            orientation: Quat::IDENTITY,
            timestamp_us: predicted_time_us,
            is_tracked: true,
        }
    }
}

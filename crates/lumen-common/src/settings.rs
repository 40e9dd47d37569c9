//! Project settings file parsing.
//!
//! Settings are stored as plain text, one `Key: value` pair per line. The
//! file is read once at startup; unknown keys are ignored so older runtimes
//! tolerate newer settings files.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const KEY_STEREO_RENDERING_MODE: &str = "StereoRenderingMode:";
const KEY_MIRROR_VIEW_MODE: &str = "MirrorView:";
const KEY_ROTATE_EYES: &str = "RotateEyes:";

/// Errors from loading or parsing a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("I/O error reading settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// How the host engine renders the two eyes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum StereoRenderingMode {
    #[default]
    MultiPass = 0,
    SinglePassInstanced = 1,
    SingleCamera = 2,
}

impl StereoRenderingMode {
    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::MultiPass),
            1 => Some(Self::SinglePassInstanced),
            2 => Some(Self::SingleCamera),
            _ => None,
        }
    }
}

impl fmt::Display for StereoRenderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MultiPass => "Multi Pass",
            Self::SinglePassInstanced => "Single Pass Instanced",
            Self::SingleCamera => "Single Camera",
        };
        f.write_str(name)
    }
}

/// Which eye (if any) is blitted to the desktop mirror window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[repr(u16)]
pub enum MirrorViewMode {
    #[default]
    None = 0,
    LeftEye = 1,
    RightEye = 2,
    DistortedBoth = 3,
}

impl MirrorViewMode {
    fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::None),
            1 => Some(Self::LeftEye),
            2 => Some(Self::RightEye),
            3 => Some(Self::DistortedBoth),
            _ => None,
        }
    }

    /// The blit code the host engine's mirror-view query expects.
    pub fn host_blit_code(self) -> u16 {
        self as u16
    }
}

impl fmt::Display for MirrorViewMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "None",
            Self::LeftEye => "Left Eye",
            Self::RightEye => "Right Eye",
            Self::DistortedBoth => "Distorted Both Eyes",
        };
        f.write_str(name)
    }
}

/// User project settings, read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectSettings {
    pub stereo_rendering_mode: StereoRenderingMode,
    pub mirror_view_mode: MirrorViewMode,
    pub rotate_eyes: bool,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            stereo_rendering_mode: StereoRenderingMode::default(),
            mirror_view_mode: MirrorViewMode::default(),
            // The shipped panels are mounted rotated; default on.
            rotate_eyes: true,
        }
    }
}

impl ProjectSettings {
    /// Load settings from a file, falling back to defaults for missing keys.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let text = fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parse settings from file contents.
    pub fn parse(text: &str) -> Result<Self, SettingsError> {
        let mut settings = Self::default();
        for line in text.lines() {
            if let Some(value) = setting_value(line, KEY_STEREO_RENDERING_MODE) {
                let code = parse_code(KEY_STEREO_RENDERING_MODE, value)?;
                settings.stereo_rendering_mode = StereoRenderingMode::from_code(code)
                    .ok_or_else(|| invalid(KEY_STEREO_RENDERING_MODE, value))?;
            } else if let Some(value) = setting_value(line, KEY_MIRROR_VIEW_MODE) {
                let code = parse_code(KEY_MIRROR_VIEW_MODE, value)?;
                settings.mirror_view_mode = MirrorViewMode::from_code(code)
                    .ok_or_else(|| invalid(KEY_MIRROR_VIEW_MODE, value))?;
            } else if let Some(value) = setting_value(line, KEY_ROTATE_EYES) {
                let code = parse_code(KEY_ROTATE_EYES, value)?;
                settings.rotate_eyes = code != 0;
            }
        }
        Ok(settings)
    }
}

/// Find `key` in `line` and return the trimmed remainder, if present.
fn setting_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let index = line.find(key)?;
    Some(line[index + key.len()..].trim())
}

fn parse_code(key: &'static str, value: &str) -> Result<u16, SettingsError> {
    value.parse::<u16>().map_err(|_| invalid(key, value))
}

fn invalid(key: &'static str, value: &str) -> SettingsError {
    SettingsError::InvalidValue {
        key,
        value: value.to_string(),
    }
}

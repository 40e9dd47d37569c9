//! WinRT Display Core interop: enumeration, direct-mode claiming, and the
//! presentation engine.
//!
//! Targets that are not connected, or that have no monitor descriptor (a
//! target can exist with no monitor attached), are filtered out during
//! enumeration.

mod claim;
mod present;

pub use claim::ClaimedDisplay;
pub use present::PresentationEngine;

use windows::Devices::Display::Core::{DisplayManager, DisplayManagerOptions, DisplayTarget};
use windows::Devices::Display::{
    DisplayMonitor, DisplayMonitorDescriptorKind, DisplayMonitorUsageKind,
};
use windows::Win32::Foundation::LUID;
use windows::Win32::Graphics::Dxgi::{
    CreateDXGIFactory2, IDXGIAdapter4, IDXGIFactory6, DXGI_ADAPTER_DESC1,
    DXGI_CREATE_FACTORY_FLAGS, DXGI_ERROR_NOT_FOUND, DXGI_GPU_PREFERENCE_UNSPECIFIED,
};

use tracing::{debug, warn};

use crate::detect::{DisplayHandle, DisplaySource};
use crate::edid;
use crate::error::{DisplayError, Result};

fn luid_to_u64(low: u32, high: i32) -> u64 {
    ((high as i64) << 32) as u64 | u64::from(low)
}

/// A display found by enumeration.
///
/// Holds the underlying target and monitor interfaces; valid only while the
/// owning [`DirectDisplayManager`] is alive.
#[derive(Debug, Clone)]
pub struct Display {
    target: DisplayTarget,
    monitor: DisplayMonitor,
}

impl Display {
    /// Get the human-readable name of this display.
    pub fn name(&self) -> String {
        self.monitor
            .DisplayName()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    }

    /// Is this an HMD?
    pub fn is_hmd(&self) -> bool {
        matches!(
            self.target.UsageKind(),
            Ok(DisplayMonitorUsageKind::HeadMounted)
        )
    }

    /// Get the EDID data.
    pub fn edid(&self) -> Result<Vec<u8>> {
        let buffer = self
            .monitor
            .GetDescriptor(DisplayMonitorDescriptorKind::Edid)
            .map_err(DisplayError::enumeration)?;
        Ok(buffer.to_vec())
    }

    /// Is this one of our displays, by EDID vendor id?
    pub fn is_target_vendor(&self) -> Result<bool> {
        edid::is_target_vendor(&self.edid()?)
    }

    /// Is this a direct-mode-capable display of ours?
    pub fn is_direct_target(&self) -> Result<bool> {
        Ok(self.is_target_vendor()? && self.is_hmd())
    }

    /// The DisplayTarget associated with this display.
    pub fn target(&self) -> &DisplayTarget {
        &self.target
    }

    /// The adapter LUID associated with this display, as a 64-bit integer.
    pub fn adapter_luid_checked(&self) -> Result<u64> {
        let id = self
            .target
            .Adapter()
            .and_then(|adapter| adapter.Id())
            .map_err(DisplayError::enumeration)?;
        Ok(luid_to_u64(id.LowPart, id.HighPart))
    }
}

impl DisplayHandle for Display {
    fn name(&self) -> String {
        Display::name(self)
    }

    fn adapter_luid(&self) -> u64 {
        match self.adapter_luid_checked() {
            Ok(luid) => luid,
            Err(err) => {
                warn!("Failed to read adapter LUID for {:?}: {err}", Display::name(self));
                0
            }
        }
    }
}

/// Object for performing display enumeration and direct-mode display
/// configuration.
///
/// Owns the WinRT display manager; displays it hands out are only valid
/// while it lives. At most one claim per target should be driven through a
/// given manager at a time.
pub struct DirectDisplayManager {
    manager: DisplayManager,
}

impl DirectDisplayManager {
    pub fn new() -> Result<Self> {
        let manager =
            DisplayManager::Create(DisplayManagerOptions::None).map_err(DisplayError::enumeration)?;
        Ok(Self { manager })
    }

    pub(crate) fn manager(&self) -> &DisplayManager {
        &self.manager
    }

    /// Get a list of all connected displays.
    ///
    /// This is mostly for use in UI when we can't find a usable device.
    pub fn all_displays(&self) -> Result<Vec<Display>> {
        let targets = self
            .manager
            .GetCurrentTargets()
            .map_err(DisplayError::enumeration)?;

        let mut displays = Vec::new();
        for target in targets {
            if !target.IsConnected().unwrap_or(false) {
                continue;
            }
            // The DisplayMonitor is what exposes the EDID; a target with no
            // monitor is a dangling connector.
            let monitor = match target.TryGetMonitor() {
                Ok(monitor) => monitor,
                Err(_) => continue,
            };
            displays.push(Display { target, monitor });
        }
        Ok(displays)
    }

    /// Get a list of all connected, direct-mode-capable displays of ours.
    ///
    /// Ideally there is only one.
    pub fn direct_displays(&self) -> Result<Vec<Display>> {
        let mut displays = self.all_displays()?;
        let mut result = Vec::new();
        for candidate in displays.drain(..) {
            match candidate.is_direct_target() {
                Ok(true) => result.push(candidate),
                Ok(false) => {}
                // A truncated EDID means this is not our hardware, but it is
                // worth a note; do not abort the whole enumeration over it.
                Err(err) => warn!("Skipping display {:?}: {err}", candidate.name()),
            }
        }
        Ok(result)
    }

    /// Acquire exclusive ownership of `target` and negotiate a mode.
    ///
    /// On success the returned [`ClaimedDisplay`] owns the direct display:
    /// dropping it releases the target back to the desktop.
    pub fn claim(&self, display: &Display) -> Result<ClaimedDisplay> {
        claim::claim_target(&self.manager, display.target())
    }
}

impl Drop for DirectDisplayManager {
    fn drop(&mut self) {
        if let Err(err) = self.manager.Close() {
            warn!("Failed to close display manager: {err}");
        }
    }
}

impl DisplaySource for DirectDisplayManager {
    type Display = Display;

    fn direct_candidates(&self) -> Result<Vec<Display>> {
        self.direct_displays()
    }

    fn all_displays(&self) -> Result<Vec<Display>> {
        DirectDisplayManager::all_displays(self)
    }

    fn fallback_adapter_luid(&self) -> u64 {
        default_adapter_luid().unwrap_or_default()
    }
}

/// LUID of the default (first-enumerated) DXGI adapter.
///
/// Used so device creation can still proceed when no HMD was found.
pub fn default_adapter_luid() -> Result<u64> {
    unsafe {
        let factory: IDXGIFactory6 = CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0))
            .map_err(DisplayError::device_creation)?;

        let mut index = 0u32;
        let mut first: Option<DXGI_ADAPTER_DESC1> = None;
        loop {
            let adapter: IDXGIAdapter4 = match factory
                .EnumAdapterByGpuPreference(index, DXGI_GPU_PREFERENCE_UNSPECIFIED)
            {
                Ok(adapter) => adapter,
                Err(err) if err.code() == DXGI_ERROR_NOT_FOUND => break,
                Err(err) => return Err(DisplayError::device_creation(err)),
            };
            let mut desc = DXGI_ADAPTER_DESC1::default();
            adapter
                .GetDesc1(&mut desc)
                .map_err(DisplayError::device_creation)?;
            debug!(
                "Adapter {index}: LUID {:#x}",
                luid_to_u64(desc.AdapterLuid.LowPart, desc.AdapterLuid.HighPart)
            );
            if first.is_none() {
                first = Some(desc);
            }
            index += 1;
        }

        let desc = first.ok_or_else(|| DisplayError::device_creation("no DXGI adapters"))?;
        Ok(luid_to_u64(desc.AdapterLuid.LowPart, desc.AdapterLuid.HighPart))
    }
}

pub(crate) fn dxgi_adapter_by_luid(low: u32, high: i32) -> Result<IDXGIAdapter4> {
    unsafe {
        let factory: IDXGIFactory6 = CreateDXGIFactory2(DXGI_CREATE_FACTORY_FLAGS(0))
            .map_err(DisplayError::device_creation)?;
        let luid = LUID {
            LowPart: low,
            HighPart: high,
        };
        factory
            .EnumAdapterByLuid(luid)
            .map_err(DisplayError::device_creation)
    }
}

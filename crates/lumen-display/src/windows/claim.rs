//! Direct-mode claim: target acquisition, mode selection, and the owning
//! [`ClaimedDisplay`] token.

use windows::core::{Interface, HSTRING};
use windows::Devices::Display::Core::{
    DisplayDevice, DisplayManager, DisplayModeInfo, DisplayModeQueryOptions, DisplayPath,
    DisplayPathScaling, DisplayState, DisplayStateApplyOptions, DisplaySurface, DisplayTarget,
};
use windows::Foundation::Collections::IIterable;
use windows::Foundation::{IReference, PropertyValue};
use windows::Graphics::DirectX::DirectXPixelFormat;
use windows::Win32::Foundation::{CloseHandle, GENERIC_ALL, HMODULE};
use windows::Win32::Graphics::Direct3D::{D3D_DRIVER_TYPE_UNKNOWN, D3D_FEATURE_LEVEL};
use windows::Win32::Graphics::Direct3D11::{
    D3D11CreateDevice, ID3D11Device, ID3D11Device5, ID3D11DeviceContext, ID3D11RenderTargetView,
    ID3D11Texture2D, D3D11_CREATE_DEVICE_FLAG, D3D11_RENDER_TARGET_VIEW_DESC,
    D3D11_RENDER_TARGET_VIEW_DESC_0, D3D11_RTV_DIMENSION_TEXTURE2D, D3D11_SDK_VERSION,
    D3D11_TEX2D_RTV, D3D11_TEXTURE2D_DESC,
};
use windows::Win32::Graphics::Dxgi::IDXGIAdapter4;
use windows::Win32::System::WinRT::Display::IDisplayDeviceInterop;

use tracing::{debug, warn};

use crate::error::{DisplayError, Result};
use crate::mode::{better_than, RefreshRate};

use super::{dxgi_adapter_by_luid, luid_to_u64};

fn mode_rate(mode: &DisplayModeInfo) -> Result<RefreshRate> {
    let rate = mode
        .PresentationRate()
        .map_err(DisplayError::enumeration)?
        .VerticalSyncRate;
    Ok(RefreshRate::new(rate.Numerator, rate.Denominator))
}

/// Connect `target` into `state`, fix the path properties we require, and
/// select the best mode at the preferred resolution.
///
/// On success the winning mode's properties have been applied to the path.
fn select_best_mode(state: &DisplayState, target: &DisplayTarget) -> Result<DisplayModeInfo> {
    let path: DisplayPath = state
        .ConnectTarget(target)
        .map_err(DisplayError::enumeration)?;

    // Set some values that we know we want.
    let not_interlaced: IReference<bool> = PropertyValue::CreateBoolean(false)
        .and_then(|value| value.cast())
        .map_err(DisplayError::enumeration)?;
    path.SetIsInterlaced(&not_interlaced)
        .map_err(DisplayError::enumeration)?;
    path.SetScaling(DisplayPathScaling::Identity)
        .map_err(DisplayError::enumeration)?;
    path.SetSourcePixelFormat(DirectXPixelFormat::R8G8B8A8UIntNormalized)
        .map_err(DisplayError::enumeration)?;

    // Only modes at the path's preferred resolution; we never search others.
    let modes = path
        .FindModes(DisplayModeQueryOptions::OnlyPreferredResolution)
        .map_err(DisplayError::enumeration)?;

    let mut best: Option<(DisplayModeInfo, RefreshRate)> = None;
    for mode in modes {
        let rate = mode_rate(&mode)?;
        if better_than(Some(rate), best.as_ref().map(|(_, rate)| *rate)) {
            best = Some((mode, rate));
        }
    }

    let (best_mode, rate) = best.ok_or(DisplayError::NoSuitableMode)?;
    debug!("Selected mode at {:.3} Hz", rate.hz());

    path.ApplyPropertiesFromMode(&best_mode)
        .map_err(DisplayError::enumeration)?;
    Ok(best_mode)
}

/// Claim exclusive ownership of `target`, negotiate a mode, and package the
/// result.
///
/// Side effect: mutates global OS display configuration. Failure before the
/// apply step leaves global state untouched.
pub(super) fn claim_target(
    manager: &DisplayManager,
    target: &DisplayTarget,
) -> Result<ClaimedDisplay> {
    // The WinRT method wants a container of targets.
    let targets: IIterable<DisplayTarget> = vec![Some(target.clone())].into();

    // Create a state object for setting modes on the target. Fails if
    // another process already holds it exclusively.
    let state_result = manager
        .TryAcquireTargetsAndCreateEmptyState(&targets)
        .map_err(DisplayError::enumeration)?;
    let hr = state_result
        .ExtendedErrorCode()
        .map_err(DisplayError::enumeration)?;
    if hr.is_err() {
        return Err(DisplayError::Acquire { code: hr.0 });
    }
    let state = state_result.State().map_err(DisplayError::enumeration)?;

    // Mode selection happens before anything is committed; a failure here is
    // side-effect-free.
    select_best_mode(&state, target)?;

    // Now that we've decided on modes, apply them all in one shot.
    let apply_result = state
        .TryApply(DisplayStateApplyOptions::None)
        .map_err(DisplayError::enumeration)?;
    let hr = apply_result
        .ExtendedErrorCode()
        .map_err(DisplayError::enumeration)?;
    if hr.is_err() {
        return Err(DisplayError::Apply { code: hr.0 });
    }

    // Re-read the current state to see what was actually granted; the
    // request and the granted reality may differ slightly.
    let state_result = manager
        .TryAcquireTargetsAndReadCurrentState(&targets)
        .map_err(DisplayError::enumeration)?;
    let hr = state_result
        .ExtendedErrorCode()
        .map_err(DisplayError::enumeration)?;
    if hr.is_err() {
        return Err(DisplayError::Acquire { code: hr.0 });
    }
    let state = state_result.State().map_err(DisplayError::enumeration)?;

    // No path on read-back means a stuck previous claim.
    let path = state
        .GetPathForTarget(target)
        .map_err(|_| DisplayError::Takeover)?;

    let adapter = target.Adapter().map_err(DisplayError::enumeration)?;
    let device = manager
        .CreateDisplayDevice(&adapter)
        .map_err(DisplayError::device_creation)?;

    Ok(ClaimedDisplay {
        manager: manager.clone(),
        device,
        target: target.clone(),
        path,
    })
}

/// Owns the direct display that has been set up.
///
/// While this is alive the OS display target belongs exclusively to this
/// process; dropping it releases the target back to the desktop. Single
/// owner: no copies, no clones.
pub struct ClaimedDisplay {
    manager: DisplayManager,
    device: DisplayDevice,
    target: DisplayTarget,
    path: DisplayPath,
}

impl ClaimedDisplay {
    pub(crate) fn device(&self) -> &DisplayDevice {
        &self.device
    }

    pub(crate) fn target(&self) -> &DisplayTarget {
        &self.target
    }

    /// Adapter LUID for the claimed target, as a 64-bit integer.
    pub fn adapter_luid(&self) -> Result<u64> {
        let id = self
            .target
            .Adapter()
            .and_then(|adapter| adapter.Id())
            .map_err(DisplayError::enumeration)?;
        Ok(luid_to_u64(id.LowPart, id.HighPart))
    }

    /// The DXGI adapter the claimed target is connected to.
    pub fn dxgi_adapter(&self) -> Result<IDXGIAdapter4> {
        let id = self
            .target
            .Adapter()
            .and_then(|adapter| adapter.Id())
            .map_err(DisplayError::device_creation)?;
        dxgi_adapter_by_luid(id.LowPart, id.HighPart)
    }

    /// Negotiated source resolution, from the granted (read-back) path.
    pub fn source_resolution(&self) -> Result<(u32, u32)> {
        let size = self
            .path
            .SourceResolution()
            .and_then(|reference| reference.Value())
            .map_err(DisplayError::enumeration)?;
        Ok((size.Width as u32, size.Height as u32))
    }

    /// Negotiated source pixel format.
    pub fn source_pixel_format(&self) -> Result<DirectXPixelFormat> {
        self.path
            .SourcePixelFormat()
            .map_err(DisplayError::enumeration)
    }

    /// Create a basic D3D11 device and immediate context on this display's
    /// adapter.
    pub fn create_basic_d3d11_device(&self) -> Result<(ID3D11Device5, ID3D11DeviceContext)> {
        let adapter = self.dxgi_adapter()?;

        let mut device: Option<ID3D11Device> = None;
        let mut context: Option<ID3D11DeviceContext> = None;
        let mut feature_level = D3D_FEATURE_LEVEL::default();
        unsafe {
            D3D11CreateDevice(
                &adapter,
                D3D_DRIVER_TYPE_UNKNOWN,
                HMODULE::default(),
                D3D11_CREATE_DEVICE_FLAG(0),
                None,
                D3D11_SDK_VERSION,
                Some(&mut device),
                Some(&mut feature_level),
                Some(&mut context),
            )
            .map_err(DisplayError::device_creation)?;
        }

        let device = device
            .ok_or_else(|| DisplayError::device_creation("D3D11CreateDevice returned no device"))?
            .cast::<ID3D11Device5>()
            .map_err(DisplayError::device_creation)?;
        let context = context.ok_or_else(|| {
            DisplayError::device_creation("D3D11CreateDevice returned no context")
        })?;
        Ok((device, context))
    }

    /// Share a display surface into `d3d_device` and build a render target
    /// view for it.
    ///
    /// The surface is allocated by the display subsystem; the D3D11 device
    /// may be an entirely different device instance, so the hand-off goes
    /// through an OS shared handle.
    pub fn open_surface(
        &self,
        d3d_device: &ID3D11Device5,
        surface: &DisplaySurface,
    ) -> Result<(ID3D11Texture2D, ID3D11RenderTargetView)> {
        let interop: IDisplayDeviceInterop =
            self.device.cast().map_err(DisplayError::interop)?;
        let inspectable: windows::core::IInspectable =
            surface.cast().map_err(DisplayError::interop)?;

        let texture = unsafe {
            let handle = interop
                .CreateSharedHandle(&inspectable, None, GENERIC_ALL.0, &HSTRING::default())
                .map_err(DisplayError::interop)?;
            let texture: std::result::Result<ID3D11Texture2D, _> =
                d3d_device.OpenSharedResource1(handle);
            if let Err(err) = CloseHandle(handle) {
                warn!("Failed to close shared surface handle: {err}");
            }
            texture.map_err(DisplayError::interop)?
        };

        let mut texture_desc = D3D11_TEXTURE2D_DESC::default();
        unsafe { texture.GetDesc(&mut texture_desc) };

        let view_desc = D3D11_RENDER_TARGET_VIEW_DESC {
            Format: texture_desc.Format,
            ViewDimension: D3D11_RTV_DIMENSION_TEXTURE2D,
            Anonymous: D3D11_RENDER_TARGET_VIEW_DESC_0 {
                Texture2D: D3D11_TEX2D_RTV { MipSlice: 0 },
            },
        };

        let mut rtv: Option<ID3D11RenderTargetView> = None;
        unsafe {
            d3d_device
                .CreateRenderTargetView(&texture, Some(&view_desc), Some(&mut rtv))
                .map_err(DisplayError::interop)?;
        }
        let rtv =
            rtv.ok_or_else(|| DisplayError::interop("CreateRenderTargetView returned no view"))?;
        Ok((texture, rtv))
    }
}

impl Drop for ClaimedDisplay {
    fn drop(&mut self) {
        // Hand the target back to the desktop, even on exceptional teardown.
        if let Err(err) = self.manager.ReleaseTarget(&self.target) {
            warn!("Failed to release display target: {err}");
        }
    }
}

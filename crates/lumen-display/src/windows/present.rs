//! Presentation engine: shared swap surfaces, fence wiring, and the
//! wait/submit frame protocol.

use windows::core::{w, Interface, IInspectable, GUID, PCWSTR};
use windows::Devices::Display::Core::{
    DisplayFence, DisplayPrimaryDescription, DisplayScanout, DisplaySource, DisplaySurface,
    DisplayTaskPool,
};
use windows::Foundation::Collections::{IIterable, IKeyValuePair};
use windows::Graphics::DirectX::Direct3D11::Direct3DMultisampleDescription;
use windows::Graphics::DirectX::DirectXColorSpace;
use windows::Win32::Foundation::{CloseHandle, GENERIC_ALL};
use windows::Win32::Graphics::Direct3D11::{
    ID3D11Device, ID3D11Device5, ID3D11DeviceContext, ID3D11DeviceContext4, ID3D11Fence,
    ID3D11RenderTargetView, ID3D11Texture2D, D3D11_FENCE_FLAG_SHARED,
};
use windows::Win32::System::WinRT::Display::IDisplayDeviceInterop;

use tracing::warn;

use crate::error::{DisplayError, Result};
use crate::ring::FrameRing;

use super::ClaimedDisplay;

type ExtraProperties = IIterable<IKeyValuePair<GUID, IInspectable>>;

/// Presents frames to a claimed direct-mode display.
///
/// Owns N primary surfaces shared into a D3D11 device, a scanout binding per
/// surface, and the GPU fence that orders rendering against scanout. All
/// frame methods must be driven from the single thread that owns the engine;
/// [`Self::wait_frame`] blocks that thread until vblank.
pub struct PresentationEngine {
    ring: FrameRing,
    width: u32,
    height: u32,
    source: DisplaySource,
    task_pool: DisplayTaskPool,
    // Per-slot resources, all length ring.size().
    primaries: Vec<DisplaySurface>,
    scanouts: Vec<DisplayScanout>,
    textures: Vec<ID3D11Texture2D>,
    rtvs: Vec<ID3D11RenderTargetView>,
    d3d_device: ID3D11Device5,
    d3d_context: ID3D11DeviceContext4,
    d3d_fence: ID3D11Fence,
    display_fence: DisplayFence,
    // Declared last: the claim must outlive every surface created on it.
    claim: ClaimedDisplay,
}

impl PresentationEngine {
    /// Build a presentation engine over a claimed display.
    ///
    /// `d3d_device`: your D3D11 device. If not supplied, a very basic one is
    /// created on the claimed display's adapter. Construction fails as a
    /// whole on any shared-handle or device error; no partial engine is
    /// returned.
    pub fn new(
        claim: ClaimedDisplay,
        surface_count: usize,
        d3d_device: Option<&ID3D11Device>,
    ) -> Result<Self> {
        // Reject before any OS work; dropping the claim releases the target.
        if surface_count == 0 {
            return Err(DisplayError::InvalidSurfaceCount);
        }
        let source = claim
            .device()
            .CreateScanoutSource(claim.target())
            .map_err(DisplayError::presentation)?;
        let task_pool = claim
            .device()
            .CreateTaskPool()
            .map_err(DisplayError::presentation)?;

        let (device, context) = match d3d_device {
            Some(device) => {
                let device = device
                    .cast::<ID3D11Device5>()
                    .map_err(DisplayError::device_creation)?;
                let mut context: Option<ID3D11DeviceContext> = None;
                unsafe { device.GetImmediateContext(&mut context) };
                let context = context.ok_or_else(|| {
                    DisplayError::device_creation("device has no immediate context")
                })?;
                (device, context)
            }
            None => claim.create_basic_d3d11_device()?,
        };
        let context: ID3D11DeviceContext4 =
            context.cast().map_err(DisplayError::device_creation)?;

        let (d3d_fence, display_fence) = create_fence_pair(&claim, &device)?;

        let (width, height) = claim.source_resolution()?;
        let pixel_format = claim.source_pixel_format()?;

        let multisample = Direct3DMultisampleDescription {
            Count: 1,
            Quality: 0,
        };
        let primary_desc = DisplayPrimaryDescription::CreateWithProperties(
            None::<&ExtraProperties>,
            width,
            height,
            pixel_format,
            DirectXColorSpace::RgbFullG22NoneP709,
            false,
            multisample,
        )
        .map_err(DisplayError::presentation)?;

        let mut primaries = Vec::with_capacity(surface_count);
        let mut scanouts = Vec::with_capacity(surface_count);
        let mut textures = Vec::with_capacity(surface_count);
        let mut rtvs = Vec::with_capacity(surface_count);
        for surface_index in 0..surface_count {
            let primary = claim
                .device()
                .CreatePrimary(claim.target(), &primary_desc)
                .map_err(DisplayError::presentation)?;
            let scanout = claim
                .device()
                .CreateSimpleScanout(&source, &primary, 0, 1)
                .map_err(DisplayError::presentation)?;
            let (texture, rtv) = claim.open_surface(&device, &primary)?;

            // Clear to a distinguishing tint for diagnostics.
            let clear_color = [
                if surface_index == 0 { 1.0 } else { 0.0 },
                if surface_index == 1 { 1.0 } else { 0.0 },
                if surface_index == 2 { 1.0 } else { 0.0 },
                1.0f32,
            ];
            unsafe { context.ClearRenderTargetView(&rtv, &clear_color) };

            primaries.push(primary);
            scanouts.push(scanout);
            textures.push(texture);
            rtvs.push(rtv);
        }

        Ok(Self {
            ring: FrameRing::new(surface_count),
            width,
            height,
            source,
            task_pool,
            primaries,
            scanouts,
            textures,
            rtvs,
            d3d_device: device,
            d3d_context: context,
            d3d_fence,
            display_fence,
            claim,
        })
    }

    /// Call before rendering. Blocks until the display signals vblank.
    ///
    /// No timeout: if vblank signals stop arriving (e.g. a disconnect), this
    /// blocks indefinitely.
    ///
    /// Returns the swap surface index to render into.
    pub fn wait_frame(&mut self) -> Result<usize> {
        let index = self.ring.advance_waited();
        self.claim
            .device()
            .WaitForVBlank(&self.source)
            .map_err(DisplayError::presentation)?;
        unsafe {
            self.d3d_context.SetMarkerInt(w!("waitFrame completed"), 0);
            self.d3d_context
                .BeginEventInt(w!("Render frame"), self.ring.fence_value() as i32);
        }
        Ok(index)
    }

    /// Call when you are done rendering the current frame.
    ///
    /// Signals the GPU fence with this frame's value and submits a scanout
    /// task that waits for it; asynchronous relative to the caller.
    pub fn end_frame(&mut self) -> Result<()> {
        let (index, fence_value) = self.ring.advance_ended();
        unsafe {
            self.d3d_context.EndEvent();
            self.d3d_context
                .BeginEventInt(w!("endFrame"), fence_value as i32);
            self.d3d_context
                .Signal(&self.d3d_fence, fence_value)
                .map_err(DisplayError::presentation)?;
        }

        let task = self
            .task_pool
            .CreateTask()
            .map_err(DisplayError::presentation)?;
        task.SetScanout(&self.scanouts[index])
            .map_err(DisplayError::presentation)?;
        // Scanout of this surface only happens once the GPU fence reaches
        // this frame's value.
        task.SetWait(&self.display_fence, fence_value)
            .map_err(DisplayError::presentation)?;
        self.task_pool
            .TryExecuteTask(&task)
            .map_err(DisplayError::presentation)?;

        unsafe { self.d3d_context.EndEvent() };
        Ok(())
    }

    /// Render a solid black screen.
    ///
    /// Performs a full wait_frame(), end_frame() sequence internally; used
    /// at shutdown so no stale frame is left on the physical display.
    pub fn blank_screen(&mut self) -> Result<()> {
        let index = self.wait_frame()?;
        let clear_color = [0.0f32; 4];
        unsafe {
            self.d3d_context
                .ClearRenderTargetView(&self.rtvs[index], &clear_color)
        };
        self.end_frame()
    }

    /// Display width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Display height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of swap surfaces.
    pub fn surface_count(&self) -> usize {
        self.ring.size()
    }

    /// The display-subsystem primary surfaces backing the swapchain.
    pub fn primary_surfaces(&self) -> &[DisplaySurface] {
        &self.primaries
    }

    /// The textures corresponding to each swapchain image.
    pub fn swapchain_textures(&self) -> &[ID3D11Texture2D] {
        &self.textures
    }

    /// The render target views corresponding to each swapchain image.
    pub fn swapchain_rtvs(&self) -> &[ID3D11RenderTargetView] {
        &self.rtvs
    }

    /// The device referenced by the engine.
    pub fn device(&self) -> &ID3D11Device5 {
        &self.d3d_device
    }

    /// The immediate device context referenced by the engine.
    pub fn immediate_context(&self) -> &ID3D11DeviceContext4 {
        &self.d3d_context
    }

    /// Fence value of the most recently submitted frame.
    pub fn fence_value(&self) -> u64 {
        self.ring.fence_value()
    }
}

impl Drop for PresentationEngine {
    fn drop(&mut self) {
        // Drain in-flight scanout before the claim releases the target.
        if let Err(err) = self.claim.device().WaitForVBlank(&self.source) {
            warn!("Final vblank wait failed during teardown: {err}");
        }
    }
}

/// Create the D3D11 fence and import it into the display subsystem.
fn create_fence_pair(
    claim: &ClaimedDisplay,
    device: &ID3D11Device5,
) -> Result<(ID3D11Fence, DisplayFence)> {
    unsafe {
        // A shared fence, so the display task pool can wait on render work.
        let d3d_fence: ID3D11Fence = device
            .CreateFence(0, D3D11_FENCE_FLAG_SHARED)
            .map_err(DisplayError::interop)?;

        let fence_handle = d3d_fence
            .CreateSharedHandle(None, GENERIC_ALL.0, PCWSTR::null())
            .map_err(DisplayError::interop)?;

        let interop: IDisplayDeviceInterop =
            claim.device().cast().map_err(DisplayError::interop)?;
        let display_fence: std::result::Result<DisplayFence, _> =
            interop.OpenSharedHandle(fence_handle);
        if let Err(err) = CloseHandle(fence_handle) {
            warn!("Failed to close shared fence handle: {err}");
        }
        let display_fence = display_fence.map_err(DisplayError::interop)?;

        Ok((d3d_fence, display_fence))
    }
}

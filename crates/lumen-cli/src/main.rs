//! Lumen CLI tools: display topology inspection and direct-mode smoke tests.

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lumen")]
#[command(about = "Lumen direct-display tools")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List connected display targets and whether each is a usable HMD
    Targets,

    /// Claim the HMD and present a short test-pattern sequence
    Claim {
        /// Number of frames to present before blanking
        #[arg(short, long, default_value_t = 300)]
        frames: u32,

        /// Number of swap surfaces
        #[arg(
            short,
            long,
            default_value_t = lumen_display::DEFAULT_SURFACE_COUNT as u8,
            value_parser = clap::value_parser!(u8).range(1..)
        )]
        surfaces: u8,
    },

    /// Show version information
    Version,
}

fn main() -> Result<()> {
    lumen_common::init_tracing();

    let args = Args::parse();

    match args.command {
        Command::Targets => run_targets(),
        Command::Claim { frames, surfaces } => run_claim(frames, usize::from(surfaces)),
        Command::Version => {
            println!("lumen {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

#[cfg(target_os = "windows")]
fn run_targets() -> Result<()> {
    use lumen_display::{DirectDisplayManager, DisplayDetector, InitStatus};

    let manager = DirectDisplayManager::new()?;

    println!("Connected displays:");
    for display in manager.all_displays()? {
        let vendor = display
            .edid()
            .ok()
            .and_then(|edid| lumen_display::edid::vendor_bytes(&edid).ok());
        let vendor = vendor
            .map(|bytes| format!("{:02x}{:02x}", bytes[0], bytes[1]))
            .unwrap_or_else(|| "????".to_string());
        println!(
            "- {} (adapter {:#x}, vendor {}, hmd: {}, direct target: {})",
            display.name(),
            display.adapter_luid_checked().unwrap_or_default(),
            vendor,
            display.is_hmd(),
            display.is_direct_target().unwrap_or(false),
        );
    }

    let mut detector = DisplayDetector::new();
    let luid = detector.enumerate(&manager)?;
    println!();
    println!("Detection status: {}", detector.status().as_str());
    println!("Adapter LUID:     {luid:#x}");
    if detector.status() == InitStatus::None {
        if let Some(display) = detector.selected_display() {
            println!("Selected HMD:     {}", display.name());
        }
    }
    Ok(())
}

#[cfg(target_os = "windows")]
fn run_claim(frames: u32, surfaces: usize) -> Result<()> {
    use lumen_display::{DirectDisplayManager, DisplayDetector, InitStatus, PresentationEngine};

    let manager = DirectDisplayManager::new()?;
    let mut detector = DisplayDetector::new();
    detector.enumerate(&manager)?;

    if detector.status() != InitStatus::None {
        anyhow::bail!(
            "cannot claim: detection status is {}",
            detector.status().as_str()
        );
    }
    let display = detector
        .selected_display()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("no display selected despite successful detection"))?;

    println!("Claiming {}...", display.name());
    let claim = manager.claim(&display)?;
    let mut engine = PresentationEngine::new(claim, surfaces, None)?;
    println!(
        "Direct mode up: {}x{}, {} surfaces",
        engine.width(),
        engine.height(),
        engine.surface_count()
    );

    for frame in 0..frames {
        let index = engine.wait_frame()?;
        // Cycle a tint so motion is visible on the panel.
        let phase = (frame % 90) as f32 / 90.0;
        let clear_color = [phase, 1.0 - phase, 0.25, 1.0];
        unsafe {
            engine
                .immediate_context()
                .ClearRenderTargetView(&engine.swapchain_rtvs()[index], &clear_color);
        }
        engine.end_frame()?;
    }

    tracing::info!(
        "Presented {frames} frames, final fence value {}",
        engine.fence_value()
    );
    println!("Blanking and releasing...");
    engine.blank_screen()?;
    drop(engine);
    println!("Done.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_surfaces_rejected_at_parse() {
        assert!(Args::try_parse_from(["lumen", "claim", "--surfaces", "0"]).is_err());
    }

    #[test]
    fn test_default_surface_count_matches_library() {
        let args = Args::try_parse_from(["lumen", "claim"]).unwrap();
        match args.command {
            Command::Claim { surfaces, .. } => {
                assert_eq!(usize::from(surfaces), lumen_display::DEFAULT_SURFACE_COUNT);
            }
            _ => panic!("expected claim subcommand"),
        }
    }
}

#[cfg(not(target_os = "windows"))]
fn run_targets() -> Result<()> {
    anyhow::bail!("direct display is only supported on Windows")
}

#[cfg(not(target_os = "windows"))]
fn run_claim(_frames: u32, _surfaces: usize) -> Result<()> {
    anyhow::bail!("direct display is only supported on Windows")
}

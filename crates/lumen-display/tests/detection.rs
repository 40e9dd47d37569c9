//! End-to-end detection flow over a simulated display topology: EDID
//! identification feeding the detector, then mode selection and the frame
//! ring, without touching the OS.

use lumen_display::detect::{DisplayDetector, DisplayHandle, DisplaySource, InitStatus};
use lumen_display::edid::{self, PNPID_CFR};
use lumen_display::error::Result;
use lumen_display::mode::{best_rate_index, RefreshRate};
use lumen_display::FrameRing;

const FALLBACK_LUID: u64 = 0x1000_0001;

/// A display as a simulated enumeration pass sees it: raw EDID plus the
/// OS-reported head-mounted usage flag.
#[derive(Debug, Clone)]
struct SimDisplay {
    name: &'static str,
    luid: u64,
    edid: Vec<u8>,
    head_mounted: bool,
}

impl SimDisplay {
    fn new(name: &'static str, luid: u64, vendor: [u8; 2], head_mounted: bool) -> Self {
        let mut edid = vec![0u8; 128];
        edid[8] = vendor[0];
        edid[9] = vendor[1];
        Self {
            name,
            luid,
            edid,
            head_mounted,
        }
    }

    fn is_direct_target(&self) -> Result<bool> {
        Ok(edid::is_target_vendor(&self.edid)? && self.head_mounted)
    }
}

impl DisplayHandle for SimDisplay {
    fn name(&self) -> String {
        self.name.to_string()
    }

    fn adapter_luid(&self) -> u64 {
        self.luid
    }
}

struct SimTopology {
    displays: Vec<SimDisplay>,
}

impl DisplaySource for SimTopology {
    type Display = SimDisplay;

    fn direct_candidates(&self) -> Result<Vec<SimDisplay>> {
        let mut candidates = Vec::new();
        for display in &self.displays {
            if display.is_direct_target()? {
                candidates.push(display.clone());
            }
        }
        Ok(candidates)
    }

    fn all_displays(&self) -> Result<Vec<SimDisplay>> {
        Ok(self.displays.clone())
    }

    fn fallback_adapter_luid(&self) -> u64 {
        FALLBACK_LUID
    }
}

fn hmd(luid: u64) -> SimDisplay {
    SimDisplay::new("Lumen HMD", luid, PNPID_CFR, true)
}

fn desktop_monitor(luid: u64) -> SimDisplay {
    SimDisplay::new("Desk Monitor", luid, [0x10, 0xac], false)
}

#[test]
fn detects_single_hmd_among_desktop_monitors() {
    let topology = SimTopology {
        displays: vec![desktop_monitor(1), hmd(42), desktop_monitor(2)],
    };
    let mut detector = DisplayDetector::new();
    let luid = detector.enumerate(&topology).unwrap();

    assert_eq!(detector.status(), InitStatus::None);
    assert_eq!(luid, 42);
    assert_eq!(detector.selected_display().unwrap().name(), "Lumen HMD");
}

#[test]
fn hmd_usage_flag_alone_is_not_enough() {
    // Right vendor but not head-mounted, and head-mounted but wrong vendor.
    let topology = SimTopology {
        displays: vec![
            SimDisplay::new("Vendor Panel", 5, PNPID_CFR, false),
            SimDisplay::new("Other HMD", 6, [0x10, 0xac], true),
        ],
    };
    let mut detector = DisplayDetector::new();
    let luid = detector.enumerate(&topology).unwrap();

    assert_eq!(detector.status(), InitStatus::NoDevice);
    assert_eq!(luid, FALLBACK_LUID);
}

#[test]
fn two_hmds_is_ambiguous() {
    let topology = SimTopology {
        displays: vec![hmd(1), hmd(2)],
    };
    let mut detector = DisplayDetector::new();
    detector.enumerate(&topology).unwrap();

    assert_eq!(detector.status(), InitStatus::TooManyDevices);
    assert!(detector.selected_display().is_none());
    assert_eq!(detector.adapter_luid(), FALLBACK_LUID);
}

#[test]
fn truncated_edid_fails_enumeration_loudly() {
    let mut broken = hmd(1);
    broken.edid.truncate(9);
    let topology = SimTopology {
        displays: vec![broken],
    };
    let mut detector = DisplayDetector::new();
    assert!(detector.enumerate(&topology).is_err());
}

#[test]
fn claim_scenario_mode_and_ring_bookkeeping() {
    // Claim-time mode negotiation: exactly one 90 Hz mode available.
    let modes = [RefreshRate::new(90, 1)];
    assert_eq!(best_rate_index(&modes), Some(0));

    // Two wait/end cycles on a double-buffered ring leave both counters at
    // slot 1 with two frames fenced.
    let mut ring = FrameRing::new(2);
    assert_eq!(ring.advance_waited(), 0);
    ring.advance_ended();
    assert_eq!(ring.advance_waited(), 1);
    ring.advance_ended();

    assert_eq!(ring.waited_index(), Some(1));
    assert_eq!(ring.ended_index(), Some(1));
    assert_eq!(ring.fence_value(), 2);
}

//! HMD detection state machine.
//!
//! Runs enumeration across the direct-mode candidates and settles on exactly
//! one display, or records a status code the host can query. Detection always
//! caches *some* adapter LUID so the host can still create a GPU device in a
//! degraded (headless) mode.

use tracing::debug;

use crate::error::Result;

/// Status codes surfaced to the host application.
///
/// The numeric values are part of the host contract; do not renumber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum InitStatus {
    None = 0,
    NotInitialized = 1,
    NoDevice = 100,
    TooManyDevices = 101,
}

impl InitStatus {
    pub fn as_code(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::NotInitialized => "NotInitialized",
            Self::NoDevice => "NoDevice",
            Self::TooManyDevices => "TooManyDevices",
        }
    }
}

/// A display produced by enumeration, as the detector sees it.
pub trait DisplayHandle: Clone {
    /// Human-readable display name.
    fn name(&self) -> String;

    /// Adapter LUID the display hangs off, as a 64-bit value.
    fn adapter_luid(&self) -> u64;
}

/// Source of enumerated displays.
///
/// Implemented by the Windows direct-display manager; tests drive the
/// detector with a mock.
pub trait DisplaySource {
    type Display: DisplayHandle;

    /// All connected displays that are direct-mode candidates for us.
    fn direct_candidates(&self) -> Result<Vec<Self::Display>>;

    /// Every connected display, for diagnostics when detection fails.
    fn all_displays(&self) -> Result<Vec<Self::Display>>;

    /// LUID of the default GPU adapter, used when no candidate is found.
    fn fallback_adapter_luid(&self) -> u64;
}

/// Caches the result of the last enumeration pass.
///
/// Re-running [`Self::enumerate`] always resets and recomputes; there is no
/// incremental diffing against previous topology.
pub struct DisplayDetector<S: DisplaySource> {
    status: InitStatus,
    selected: Option<S::Display>,
    luid: u64,
}

impl<S: DisplaySource> Default for DisplayDetector<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: DisplaySource> DisplayDetector<S> {
    pub fn new() -> Self {
        Self {
            status: InitStatus::NotInitialized,
            selected: None,
            luid: 0,
        }
    }

    /// Enumerate direct-mode displays and settle the detection state.
    ///
    /// Returns the adapter LUID to create the GPU device against. An `Err`
    /// means enumeration itself failed, which is distinct from finding no
    /// device.
    pub fn enumerate(&mut self, source: &S) -> Result<u64> {
        debug!("Enumerating displays...");
        // Reset first so a failed pass never leaves stale success state.
        self.selected = None;
        self.status = InitStatus::NotInitialized;
        self.luid = 0;
        let candidates = source.direct_candidates()?;
        if let [found] = candidates.as_slice() {
            debug!("Found exactly one display we can use, great! {}", found.name());
            self.luid = found.adapter_luid();
            self.selected = Some(found.clone());
            self.status = InitStatus::None;
            return Ok(self.luid);
        }

        // if we get here, we failed...
        self.luid = source.fallback_adapter_luid();
        if candidates.is_empty() {
            self.status = InitStatus::NoDevice;
            debug!("Found no displays we can use. List of all displays found, none of which are useful:");
            // Diagnostics only; a listing failure must not fail detection.
            match source.all_displays() {
                Ok(all) => {
                    for candidate in all {
                        debug!("- {}", candidate.name());
                    }
                }
                Err(err) => debug!("Could not list the other displays: {err}"),
            }
        } else {
            self.status = InitStatus::TooManyDevices;
            debug!("Found too many usable displays?");
            for candidate in &candidates {
                debug!("- {}", candidate.name());
            }
        }
        Ok(self.luid)
    }

    /// Status from the last [`Self::enumerate`] call.
    pub fn status(&self) -> InitStatus {
        self.status
    }

    /// Adapter LUID from the last [`Self::enumerate`] call.
    pub fn adapter_luid(&self) -> u64 {
        self.luid
    }

    /// The chosen HMD display. Populated only when status is
    /// [`InitStatus::None`].
    pub fn selected_display(&self) -> Option<&S::Display> {
        self.selected.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DisplayError;

    #[derive(Debug, Clone, PartialEq)]
    struct FakeDisplay {
        name: &'static str,
        luid: u64,
    }

    impl DisplayHandle for FakeDisplay {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn adapter_luid(&self) -> u64 {
            self.luid
        }
    }

    struct FakeSource {
        candidates: Vec<FakeDisplay>,
        all: Vec<FakeDisplay>,
        fail_enumeration: bool,
        fail_all_displays: bool,
    }

    impl FakeSource {
        fn with_candidates(candidates: Vec<FakeDisplay>) -> Self {
            Self {
                all: candidates.clone(),
                candidates,
                fail_enumeration: false,
                fail_all_displays: false,
            }
        }
    }

    impl DisplaySource for FakeSource {
        type Display = FakeDisplay;

        fn direct_candidates(&self) -> Result<Vec<FakeDisplay>> {
            if self.fail_enumeration {
                return Err(DisplayError::enumeration("forced failure"));
            }
            Ok(self.candidates.clone())
        }

        fn all_displays(&self) -> Result<Vec<FakeDisplay>> {
            if self.fail_all_displays {
                return Err(DisplayError::enumeration("forced listing failure"));
            }
            Ok(self.all.clone())
        }

        fn fallback_adapter_luid(&self) -> u64 {
            0xdead
        }
    }

    fn hmd(luid: u64) -> FakeDisplay {
        FakeDisplay { name: "HMD", luid }
    }

    #[test]
    fn test_starts_not_initialized() {
        let detector: DisplayDetector<FakeSource> = DisplayDetector::new();
        assert_eq!(detector.status(), InitStatus::NotInitialized);
        assert!(detector.selected_display().is_none());
    }

    #[test]
    fn test_exactly_one_candidate() {
        let source = FakeSource::with_candidates(vec![hmd(7)]);
        let mut detector = DisplayDetector::new();
        let luid = detector.enumerate(&source).unwrap();
        assert_eq!(luid, 7);
        assert_eq!(detector.status(), InitStatus::None);
        assert_eq!(detector.adapter_luid(), 7);
        assert_eq!(detector.selected_display(), Some(&hmd(7)));
    }

    #[test]
    fn test_no_candidates_falls_back_to_default_adapter() {
        let source = FakeSource::with_candidates(vec![]);
        let mut detector = DisplayDetector::new();
        let luid = detector.enumerate(&source).unwrap();
        assert_eq!(luid, 0xdead);
        assert_eq!(detector.status(), InitStatus::NoDevice);
        assert!(detector.selected_display().is_none());
    }

    #[test]
    fn test_too_many_candidates_does_not_guess() {
        let source = FakeSource::with_candidates(vec![hmd(1), hmd(2)]);
        let mut detector = DisplayDetector::new();
        let luid = detector.enumerate(&source).unwrap();
        assert_eq!(luid, 0xdead);
        assert_eq!(detector.status(), InitStatus::TooManyDevices);
        assert!(detector.selected_display().is_none());
    }

    #[test]
    fn test_enumeration_failure_is_not_no_device() {
        let mut source = FakeSource::with_candidates(vec![]);
        source.fail_enumeration = true;
        let mut detector = DisplayDetector::new();
        assert!(detector.enumerate(&source).is_err());
        // Status untouched by a failed enumeration.
        assert_eq!(detector.status(), InitStatus::NotInitialized);
    }

    #[test]
    fn test_failed_reenumeration_resets_previous_success() {
        let good = FakeSource::with_candidates(vec![hmd(7)]);
        let mut detector = DisplayDetector::new();
        detector.enumerate(&good).unwrap();
        assert_eq!(detector.status(), InitStatus::None);

        let mut bad = FakeSource::with_candidates(vec![hmd(7)]);
        bad.fail_enumeration = true;
        assert!(detector.enumerate(&bad).is_err());
        // A None status with no selected display must never be observable.
        assert_eq!(detector.status(), InitStatus::NotInitialized);
        assert!(detector.selected_display().is_none());
        assert_eq!(detector.adapter_luid(), 0);
    }

    #[test]
    fn test_diagnostic_listing_failure_does_not_fail_detection() {
        let mut source = FakeSource::with_candidates(vec![]);
        source.fail_all_displays = true;
        let mut detector = DisplayDetector::new();
        let luid = detector.enumerate(&source).unwrap();
        assert_eq!(luid, 0xdead);
        assert_eq!(detector.status(), InitStatus::NoDevice);
    }

    #[test]
    fn test_enumerate_is_idempotent_without_topology_change() {
        let source = FakeSource::with_candidates(vec![hmd(9)]);
        let mut detector = DisplayDetector::new();
        let first = detector.enumerate(&source).unwrap();
        let second = detector.enumerate(&source).unwrap();
        assert_eq!(first, second);
        assert_eq!(detector.status(), InitStatus::None);
    }

    #[test]
    fn test_reenumeration_recomputes_after_disconnect() {
        let mut detector = DisplayDetector::new();
        detector
            .enumerate(&FakeSource::with_candidates(vec![hmd(9)]))
            .unwrap();
        assert_eq!(detector.status(), InitStatus::None);

        detector
            .enumerate(&FakeSource::with_candidates(vec![]))
            .unwrap();
        assert_eq!(detector.status(), InitStatus::NoDevice);
        assert!(detector.selected_display().is_none());
    }

    #[test]
    fn test_status_codes_are_stable() {
        assert_eq!(InitStatus::None.as_code(), 0);
        assert_eq!(InitStatus::NotInitialized.as_code(), 1);
        assert_eq!(InitStatus::NoDevice.as_code(), 100);
        assert_eq!(InitStatus::TooManyDevices.as_code(), 101);
    }
}

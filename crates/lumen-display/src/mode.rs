//! Refresh-rate mode comparison.
//!
//! The display subsystem reports refresh rates as rationals; comparison
//! happens on the rational form to avoid rounding ambiguity at the source.

/// Max refresh rate we'll select.
///
/// Slightly higher than the nominal 90 because the display timing math can
/// result in not-quite-whole refresh rates.
pub const MAX_REFRESH_HZ: f64 = 91.0;

/// A rational vertical sync rate, as reported by the display subsystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshRate {
    pub numerator: u32,
    pub denominator: u32,
}

impl RefreshRate {
    pub fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    /// Refresh rate in Hz.
    pub fn hz(&self) -> f64 {
        f64::from(self.numerator) / f64::from(self.denominator)
    }
}

/// Is `candidate` strictly better than `incumbent`?
///
/// This is a "better than" relation, not a total order: it is only meant to
/// be folded left-to-right over candidates while tracking a running best,
/// starting from `None`. Do not use it as a general sort key.
pub fn better_than(candidate: Option<RefreshRate>, incumbent: Option<RefreshRate>) -> bool {
    let rate = match candidate {
        // nothing is never better
        None => return false,
        Some(rate) => rate,
    };
    let other = match incumbent {
        // something is always better than nothing
        None => return true,
        Some(other) => other,
    };

    // Prefer something no larger than MAX_REFRESH_HZ
    if rate.hz() > MAX_REFRESH_HZ && other.hz() <= MAX_REFRESH_HZ {
        return false;
    }
    if rate.hz() <= MAX_REFRESH_HZ && other.hz() > MAX_REFRESH_HZ {
        return true;
    }

    // On the same side of the ceiling, pick the higher one.
    rate.hz() > other.hz()
}

/// Fold the "better than" relation over a candidate list, returning the index
/// of the winning mode, if any.
pub fn best_rate_index(rates: &[RefreshRate]) -> Option<usize> {
    let mut best: Option<(usize, RefreshRate)> = None;
    for (index, rate) in rates.iter().enumerate() {
        if better_than(Some(*rate), best.map(|(_, rate)| rate)) {
            best = Some((index, *rate));
        }
    }
    best.map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hz(value: u32) -> RefreshRate {
        RefreshRate::new(value, 1)
    }

    #[test]
    fn test_ceiling_excludes_faster_mode() {
        // 95 Hz exceeds the 91 Hz ceiling, so 90 Hz wins either way round.
        assert!(better_than(Some(hz(90)), Some(hz(95))));
        assert!(!better_than(Some(hz(95)), Some(hz(90))));
        assert_eq!(best_rate_index(&[hz(90), hz(95)]), Some(0));
        assert_eq!(best_rate_index(&[hz(95), hz(90)]), Some(1));
    }

    #[test]
    fn test_higher_rate_wins_under_ceiling() {
        assert!(better_than(Some(hz(90)), Some(hz(72))));
        assert!(!better_than(Some(hz(72)), Some(hz(90))));
        assert_eq!(best_rate_index(&[hz(72), hz(90)]), Some(1));
    }

    #[test]
    fn test_something_beats_nothing() {
        assert!(better_than(Some(hz(120)), None));
        assert!(!better_than(None, Some(hz(120))));
        assert!(!better_than(None, None));
    }

    #[test]
    fn test_empty_candidates_yield_no_mode() {
        assert_eq!(best_rate_index(&[]), None);
    }

    #[test]
    fn test_all_over_ceiling_still_picks_highest() {
        // Both over the ceiling: same side, so the higher rate wins.
        assert_eq!(best_rate_index(&[hz(95), hz(120)]), Some(1));
    }

    #[test]
    fn test_fractional_rate_near_ceiling() {
        // 90.02 Hz timing survives the ceiling.
        let near_90 = RefreshRate::new(90020, 1000);
        assert!(near_90.hz() > 90.0 && near_90.hz() <= MAX_REFRESH_HZ);
        assert_eq!(best_rate_index(&[hz(60), near_90, hz(95)]), Some(1));
    }

    #[test]
    fn test_equal_rates_keep_first() {
        // Strict relation: an equal candidate does not replace the incumbent.
        assert!(!better_than(Some(hz(90)), Some(hz(90))));
        assert_eq!(best_rate_index(&[hz(90), hz(90)]), Some(0));
    }
}

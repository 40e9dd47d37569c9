//! Frame-slot ring bookkeeping for the presentation engine.
//!
//! Two independent indices cycle modulo the surface count: one advanced by
//! the vblank wait, one by frame submission. Under correct caller usage
//! (wait, then end, repeat) they stay within one step of each other, but
//! each is taken modulo the ring size from validated state, so call-order
//! violations select an unspecified surface rather than going out of bounds.
//!
//! # Thread Safety
//!
//! Not thread-safe; the presentation engine is single-threaded by contract.

/// Default number of swap surfaces.
pub const DEFAULT_SURFACE_COUNT: usize = 2;

/// Ring counters plus the monotonic presentation fence value.
#[derive(Debug, Clone)]
pub struct FrameRing {
    size: usize,
    waited: i32,
    ended: i32,
    // 64-bit and incremented once per frame; wraparound is unreachable at
    // realistic frame counts (~585 million years at 1000 fps).
    fence_value: u64,
}

impl FrameRing {
    /// Create ring bookkeeping for `size` surfaces.
    ///
    /// # Panics
    /// Panics if `size` is 0.
    pub fn new(size: usize) -> Self {
        assert!(size > 0, "surface count must be nonzero");
        Self {
            size,
            waited: -1,
            ended: -1,
            fence_value: 0,
        }
    }

    /// Number of surfaces in the ring.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Advance the waited index and return the surface slot to render into.
    pub fn advance_waited(&mut self) -> usize {
        self.waited = self.next(self.waited);
        self.waited as usize
    }

    /// Advance the ended index and bump the fence, returning the slot to
    /// scan out and the fence value that frame must wait for.
    pub fn advance_ended(&mut self) -> (usize, u64) {
        self.fence_value += 1;
        self.ended = self.next(self.ended);
        (self.ended as usize, self.fence_value)
    }

    /// Last fence value handed out by [`Self::advance_ended`].
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    /// Current waited slot, if a frame has been waited on.
    pub fn waited_index(&self) -> Option<usize> {
        (self.waited >= 0).then_some(self.waited as usize)
    }

    /// Current ended slot, if a frame has been submitted.
    pub fn ended_index(&self) -> Option<usize> {
        (self.ended >= 0).then_some(self.ended as usize)
    }

    fn next(&self, index: i32) -> i32 {
        let next = index + 1;
        if next >= self.size as i32 {
            0
        } else {
            next
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_waited_wraps_modulo_size() {
        let mut ring = FrameRing::new(2);
        assert_eq!(ring.advance_waited(), 0);
        assert_eq!(ring.advance_waited(), 1);
        assert_eq!(ring.advance_waited(), 0);
    }

    #[test]
    fn test_waited_ignores_ended_timing() {
        // The two counters are independent; ended never moves waited.
        let mut ring = FrameRing::new(2);
        assert_eq!(ring.advance_waited(), 0);
        ring.advance_ended();
        ring.advance_ended();
        ring.advance_ended();
        assert_eq!(ring.advance_waited(), 1);
        assert_eq!(ring.advance_waited(), 0);
    }

    #[test]
    fn test_fence_strictly_increases() {
        let mut ring = FrameRing::new(2);
        for expected in 1..=10u64 {
            let (_, value) = ring.advance_ended();
            assert_eq!(value, expected);
        }
        assert_eq!(ring.fence_value(), 10);
    }

    #[test]
    fn test_paired_wait_end_keeps_counters_in_step() {
        let mut ring = FrameRing::new(2);
        ring.advance_waited();
        ring.advance_ended();
        ring.advance_waited();
        ring.advance_ended();
        assert_eq!(ring.waited_index(), Some(1));
        assert_eq!(ring.ended_index(), Some(1));
    }

    #[test]
    fn test_triple_buffer_cycle() {
        let mut ring = FrameRing::new(3);
        let slots: Vec<usize> = (0..6).map(|_| ring.advance_waited()).collect();
        assert_eq!(slots, [0, 1, 2, 0, 1, 2]);
    }

    #[test]
    fn test_indices_start_unset() {
        let ring = FrameRing::new(2);
        assert_eq!(ring.waited_index(), None);
        assert_eq!(ring.ended_index(), None);
        assert_eq!(ring.fence_value(), 0);
    }

    #[test]
    #[should_panic(expected = "surface count must be nonzero")]
    fn test_zero_size_panics() {
        let _ = FrameRing::new(0);
    }
}

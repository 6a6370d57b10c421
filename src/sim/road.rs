//! Endless road via segment recycling
//!
//! A fixed ring of segments is kept tiled around the moving reference point:
//! whenever a segment falls too far behind, it is relocated to the far edge
//! ahead. The ribbon never allocates after construction and the tiling never
//! gaps or overlaps, including across large single-tick reference jumps.

use serde::{Deserialize, Serialize};

use crate::consts::{ROAD_BEHIND_MARGIN, ROAD_SEG_COUNT, ROAD_SEG_LENGTH};

/// One ground segment. Width and length are uniform; only z varies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub z: f32,
}

/// The recycled segment ring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoadRibbon {
    segments: Vec<RoadSegment>,
    seg_length: f32,
    behind_margin: f32,
}

impl RoadRibbon {
    /// Lay out the ribbon so the coverage invariant already holds on frame 1.
    pub fn new(reference_z: f32) -> Self {
        Self::with_layout(ROAD_SEG_COUNT, ROAD_SEG_LENGTH, ROAD_BEHIND_MARGIN, reference_z)
    }

    pub fn with_layout(count: usize, seg_length: f32, behind_margin: f32, reference_z: f32) -> Self {
        let mut ribbon = Self {
            segments: Vec::with_capacity(count),
            seg_length,
            behind_margin,
        };
        for _ in 0..count {
            ribbon.segments.push(RoadSegment { z: 0.0 });
        }
        ribbon.retile(reference_z);
        ribbon
    }

    pub fn segments(&self) -> &[RoadSegment] {
        &self.segments
    }

    pub fn seg_length(&self) -> f32 {
        self.seg_length
    }

    /// Total longitudinal span covered by the ribbon.
    pub fn span(&self) -> f32 {
        self.segments.len() as f32 * self.seg_length
    }

    fn extent(&self) -> (f32, f32) {
        let mut min_z = f32::INFINITY;
        let mut max_z = f32::NEG_INFINITY;
        for seg in &self.segments {
            min_z = min_z.min(seg.z);
            max_z = max_z.max(seg.z);
        }
        (min_z, max_z)
    }

    /// Lay the ribbon out fresh: rear segment just inside the behind margin,
    /// the rest extending ahead (-z) one length apart. Matches the steady
    /// state the recycle loops converge on.
    fn retile(&mut self, reference_z: f32) {
        let rear = reference_z + self.behind_margin - self.seg_length;
        for (i, seg) in self.segments.iter_mut().enumerate() {
            seg.z = rear - i as f32 * self.seg_length;
        }
    }

    /// Re-cover the window around the reference. Segments that trail the
    /// reference by more than the behind margin move to the far edge ahead;
    /// if the reference moved backward, front segments move to the rear edge.
    /// Both loops preserve the contiguous tiling.
    pub fn recycle(&mut self, reference_z: f32) {
        let rear_limit = reference_z + self.behind_margin;
        let (min_z, max_z) = self.extent();

        // A jump larger than the whole ribbon leaves nothing worth keeping.
        if min_z > rear_limit + self.span() || max_z < rear_limit - 2.0 * self.span() {
            self.retile(reference_z);
            return;
        }

        // Forward: rotate trailing segments to the front edge.
        loop {
            let (min_z, _) = self.extent();
            let Some(rear) = self
                .segments
                .iter_mut()
                .max_by(|a, b| a.z.total_cmp(&b.z))
            else {
                return;
            };
            if rear.z > rear_limit {
                rear.z = min_z - self.seg_length;
            } else {
                break;
            }
        }

        // Backward: rotate leading segments to the rear edge until the rear
        // segment is within one length of the limit again.
        loop {
            let (_, max_z) = self.extent();
            if max_z + self.seg_length > rear_limit {
                break;
            }
            if let Some(front) = self
                .segments
                .iter_mut()
                .min_by(|a, b| a.z.total_cmp(&b.z))
            {
                front.z = max_z + self.seg_length;
            } else {
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Contiguity + rear-edge bounds: the segment centers must sit one length
    /// apart, with the rear center at most `margin` behind the reference and
    /// within one length of that limit (so coverage extends maximally ahead).
    fn assert_covered(ribbon: &RoadRibbon, reference_z: f32) {
        let mut zs: Vec<f32> = ribbon.segments().iter().map(|s| s.z).collect();
        zs.sort_by(|a, b| a.total_cmp(b));
        for pair in zs.windows(2) {
            let gap = pair[1] - pair[0];
            assert!(
                (gap - ribbon.seg_length()).abs() < 1e-3,
                "tiling gap/overlap: {gap}"
            );
        }
        let rear = *zs.last().unwrap();
        let limit = reference_z + ROAD_BEHIND_MARGIN;
        assert!(rear <= limit + 1e-3, "rear {rear} exceeds limit {limit}");
        assert!(
            rear > limit - ribbon.seg_length() - 1e-3,
            "rear {rear} trails limit {limit} by over a segment"
        );
    }

    #[test]
    fn initial_layout_satisfies_coverage() {
        let ribbon = RoadRibbon::new(0.0);
        assert_eq!(ribbon.segments().len(), ROAD_SEG_COUNT);
        assert_covered(&ribbon, 0.0);
    }

    #[test]
    fn steady_forward_motion_keeps_coverage() {
        let mut ribbon = RoadRibbon::new(0.0);
        let mut reference = 0.0_f32;
        for _ in 0..5000 {
            reference -= 4.7 / 60.0;
            ribbon.recycle(reference);
            assert_covered(&ribbon, reference);
        }
    }

    #[test]
    fn large_forward_jump_recovers_in_one_tick() {
        let mut ribbon = RoadRibbon::new(0.0);
        ribbon.recycle(-1000.0);
        assert_covered(&ribbon, -1000.0);
    }

    #[test]
    fn backward_jump_recovers_in_one_tick() {
        let mut ribbon = RoadRibbon::new(0.0);
        let mut reference = 0.0_f32;
        for _ in 0..200 {
            reference -= 1.0;
            ribbon.recycle(reference);
        }
        // Reference snaps back toward the start.
        ribbon.recycle(10.0);
        assert_covered(&ribbon, 10.0);
    }

    proptest! {
        #[test]
        fn coverage_holds_for_arbitrary_reference_sequences(
            steps in proptest::collection::vec(-400.0f32..400.0, 1..60),
        ) {
            let mut ribbon = RoadRibbon::new(0.0);
            let mut reference = 0.0_f32;
            for step in steps {
                reference += step;
                ribbon.recycle(reference);

                let mut zs: Vec<f32> = ribbon.segments().iter().map(|s| s.z).collect();
                zs.sort_by(|a, b| a.total_cmp(b));
                for pair in zs.windows(2) {
                    prop_assert!((pair[1] - pair[0] - ribbon.seg_length()).abs() < 1e-2);
                }
                let rear = *zs.last().unwrap();
                let limit = reference + ROAD_BEHIND_MARGIN;
                prop_assert!(rear <= limit + 1e-2);
                prop_assert!(rear > limit - ribbon.seg_length() - 1e-2);
            }
        }
    }
}

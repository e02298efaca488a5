//! Profile segments in continuous and discrete form.

/// One constant-jerk interval of a profile.
///
/// Segment ids follow the seven-segment S-curve convention: 1/3 jerk up/down
/// while accelerating, 2 constant acceleration, 4 constant velocity, 5/7 the
/// decelerating mirrors of 3/1 and 6 the mirror of 2.
///
/// `si`/`se` are cumulative displacements at segment entry/exit, so the
/// analytic evaluators below report absolute displacement along the move.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Segment {
    /// Segment id, 1..=7.
    pub id: u8,
    /// Duration in seconds.
    pub t: f64,
    /// Entry velocity.
    pub vi: f64,
    /// Exit velocity.
    pub ve: f64,
    /// Entry acceleration.
    pub ai: f64,
    /// Exit acceleration.
    pub ae: f64,
    /// Jerk over the segment (constant; zero in segments 2, 4 and 6).
    pub j: f64,
    /// Cumulative displacement at segment entry.
    pub si: f64,
    /// Cumulative displacement at segment exit.
    pub se: f64,
}

impl Segment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(id: u8, t: f64, vi: f64, ve: f64, ai: f64, ae: f64, j: f64, si: f64, se: f64) -> Self {
        Self { id, t, vi, ve, ai, ae, j, si, se }
    }

    /// Displacement covered by this segment alone.
    pub fn s(&self) -> f64 {
        self.se - self.si
    }

    /// Acceleration at local time `t` from segment entry.
    pub fn accel_at(&self, t: f64) -> f64 {
        self.ai + self.j * t
    }

    /// Velocity at local time `t` from segment entry.
    pub fn velocity_at(&self, t: f64) -> f64 {
        self.vi + self.ai * t + 0.5 * self.j * t * t
    }

    /// Cumulative displacement at local time `t` from segment entry.
    pub fn displacement_at(&self, t: f64) -> f64 {
        self.si + self.vi * t + 0.5 * self.ai * t * t + self.j * t * t * t / 6.0
    }
}

/// A segment annotated with its slice of the step sequence.
///
/// `first_step..=last_step` are 1-based global step indices. When the
/// characterizer absorbs rounding residue from earlier segments, the step
/// that crosses the boundary lands `offset_t` seconds and `offset_s` units
/// into this segment, and `straddle_dt` is the full inter-step interval that
/// straddles the boundary. A segment that absorbs nothing has all three at
/// zero and its steps land on the local `k·beta` grid.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct DiscreteSegment {
    pub segment: Segment,
    /// Global index of the first step owned by this segment (1-based).
    pub first_step: u32,
    /// Global index of the last step owned by this segment (inclusive).
    pub last_step: u32,
    /// Inter-step interval crossing into this segment; 0 when no residue was
    /// absorbed here.
    pub straddle_dt: f64,
    /// Local time of the boundary-straddling step.
    pub offset_t: f64,
    /// Local displacement of the boundary-straddling step.
    pub offset_s: f64,
}

impl DiscreteSegment {
    pub fn new(segment: Segment, first_step: u32, last_step: u32) -> Self {
        Self { segment, first_step, last_step, straddle_dt: 0.0, offset_t: 0.0, offset_s: 0.0 }
    }

    pub fn with_straddle(mut self, straddle_dt: f64, offset_t: f64, offset_s: f64) -> Self {
        self.straddle_dt = straddle_dt;
        self.offset_t = offset_t;
        self.offset_s = offset_s;
        self
    }

    /// Number of steps owned by this segment.
    pub fn steps(&self) -> u32 {
        (self.last_step + 1).saturating_sub(self.first_step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn evaluators_match_kinematics() {
        // Jerk-up segment from rest: a(t) = jt, v(t) = j/2 t², s(t) = j/6 t³
        let j = 10000.0;
        let t = 0.05;
        let seg = Segment::new(1, t, 0.0, 12.5, 0.0, 500.0, j, 0.0, 0.208_333);

        assert!(approx_eq!(f64, seg.accel_at(t), 500.0, epsilon = 1e-9));
        assert!(approx_eq!(f64, seg.velocity_at(t), 12.5, epsilon = 1e-9));
        assert!(approx_eq!(f64, seg.displacement_at(t), j * t * t * t / 6.0, epsilon = 1e-9));
    }

    #[test]
    fn step_count_is_inclusive() {
        let seg = Segment::new(4, 1.0, 10.0, 10.0, 0.0, 0.0, 0.0, 0.0, 10.0);
        let d = DiscreteSegment::new(seg, 5, 12);
        assert_eq!(d.steps(), 8);

        // An empty range (no steps owned) reports zero
        let empty = DiscreteSegment::new(seg, 13, 12);
        assert_eq!(empty.steps(), 0);
    }
}

//! Shared curve state for the profile characterizers.

use tracing::debug;

use crate::errors::SolveError;
use crate::quantize;
use crate::roots;
use crate::segment::{DiscreteSegment, Segment};
use crate::SolverConfig;

/// Absolute tolerance for the Newton inversions done while characterizing
/// segment boundaries. Looser than the per-step tolerance; the residual
/// bookkeeping only needs boundary times to a microsecond.
pub(crate) const BOUNDS_NEWTON_TOL: f64 = 1e-6;

/// Exit accelerations above this magnitude below zero count as genuinely
/// negative in the jerk-down guard. Separates real step-rounding overshoot
/// (order of the jerk times a step interval) from Newton noise when the
/// segment quantizes exactly onto a step boundary.
const EXIT_ACCEL_TOL: f64 = 1e-6;

/// Step-rounding shortfall carried across segments until a later segment has
/// room to absorb it.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Residual {
    /// Unstepped displacement.
    pub s: f64,
    /// Time corresponding to the unstepped displacement.
    pub t: f64,
    /// Whole steps pending, `ceil(s * alpha)`.
    pub steps: u32,
}

impl Residual {
    /// Accumulates a segment's own rounding residue.
    pub fn accumulate(&mut self, s_err: f64, t_err: f64, alpha: f64) {
        self.s += s_err;
        self.t += t_err;
        self.steps = (self.s * alpha).ceil() as u32;
    }

    pub fn clear(&mut self) {
        *self = Residual::default();
    }
}

/// Outcome of the rounding-error bookkeeping for one segment.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SegmentFit {
    /// Step count owned by the segment, absorbed steps included.
    pub steps: u32,
    /// Displacement those steps cover, measured from segment entry.
    pub covered: f64,
    /// Inter-step interval straddling the entry boundary, 0 without absorb.
    pub straddle_dt: f64,
    /// Local time of the absorbed step.
    pub offset_t: f64,
    /// Local displacement of the absorbed step.
    pub offset_s: f64,
    /// The segment's own residual displacement past its last step.
    pub s_err: f64,
    /// The segment's own residual time past its last step.
    pub t_err: f64,
}

/// The curve under construction: continuous and discrete segment lists plus
/// the per-step interval vector filled in by the discretizer.
#[derive(Debug)]
pub(crate) struct Curve {
    pub alpha: f64,
    pub beta: f64,
    pub config: SolverConfig,

    pub segments: Vec<Segment>,
    pub discrete: Vec<DiscreteSegment>,
    pub deltas: Vec<f64>,

    /// Whether a constant-velocity segment (id 4) was emitted.
    pub has_cruise: bool,
}

impl Curve {
    pub fn new(alpha: f64, config: SolverConfig) -> Self {
        Self {
            alpha,
            beta: 1.0 / alpha,
            config,
            segments: Vec::with_capacity(7),
            discrete: Vec::with_capacity(7),
            deltas: Vec::new(),
            has_cruise: false,
        }
    }

    pub fn push_segment(&mut self, segment: Segment) {
        if segment.id == 4 {
            self.has_cruise = true;
        }
        self.segments.push(segment);
    }

    pub fn push_discrete(&mut self, segment: DiscreteSegment) {
        self.discrete.push(segment);
    }

    /// Quantizes a displacement with the configured ceiling tolerance.
    pub fn quantize(&self, s: f64) -> u32 {
        quantize::steps(s, self.alpha, self.config.epsilon)
    }

    /// Runs the absorb-then-residual bookkeeping for one segment.
    ///
    /// `s`/`t` are the segment's continuous displacement and duration, and
    /// `invert` maps a local displacement onto local time. When steps are
    /// pending from earlier segments and the required extra displacement fits
    /// inside this segment, the pending steps land here: the first step of
    /// the segment moves to the absorption point and the straddle interval is
    /// composed from the carried time plus the time to reach that point.
    /// `reserve_exit` makes the segment keep symmetric room at its far end;
    /// the cruise segment needs this because its exit boundary must absorb
    /// the mirrored residue of the deceleration half.
    ///
    /// Whether or not anything was absorbed, the segment's own rounding
    /// residue (continuous displacement past the last step) is accumulated
    /// into `residual` for the segments that follow.
    pub fn fit_segment(
        &self,
        residual: &mut Residual,
        s: f64,
        t: f64,
        reserve_exit: bool,
        mut invert: impl FnMut(f64) -> Option<f64>,
    ) -> Result<SegmentFit, SolveError> {
        let beta = self.beta;

        let mut fit = SegmentFit {
            steps: self.quantize(s),
            ..SegmentFit::default()
        };
        fit.covered = f64::from(fit.steps) * beta;

        if residual.steps > 0 {
            let fix = f64::from(residual.steps) * beta - residual.s;
            let room = if reserve_exit { 2.0 * fix <= s } else { fix <= s };

            if room {
                fit.offset_t = invert(fix).ok_or(SolveError::NumericalStagnation)?;
                fit.offset_s = fix;

                let stp = self.quantize(s - if reserve_exit { 2.0 * fix } else { fix });
                fit.covered = fix + f64::from(stp) * beta;
                fit.steps = stp + residual.steps;
                fit.straddle_dt = residual.t + fit.offset_t;

                residual.clear();
            }
        }

        if s - fit.covered > self.config.epsilon {
            let reached = invert(fit.covered).ok_or(SolveError::NumericalStagnation)?;
            fit.t_err = t - reached;
            fit.s_err = s - fit.covered;
            residual.accumulate(fit.s_err, fit.t_err, self.alpha);
        }

        Ok(fit)
    }

    /// Variant of [`Curve::fit_segment`] for the jerk-down segment (id 3).
    ///
    /// The jerk is negative there, so rounding the segment down to whole
    /// steps can pull the exit acceleration below zero, which is unphysical
    /// in the accelerating half. Steps are given back one at a time until the
    /// exit acceleration recovers; the mirrored segment later recovers the
    /// count from the residual. If the segment is down to a single step and
    /// the acceleration is still negative, the profile shape is not viable.
    pub fn fit_jerk_down_segment(
        &self,
        residual: &mut Residual,
        seg: &Segment,
    ) -> Result<SegmentFit, SolveError> {
        let s = seg.s();
        let t = seg.t;
        let beta = self.beta;

        let invert = |x: f64| {
            roots::cubic_newton(seg.j, 3.0 * seg.ai, 6.0 * seg.vi, -6.0 * x, t, BOUNDS_NEWTON_TOL)
        };

        let mut fit = SegmentFit {
            steps: self.quantize(s),
            ..SegmentFit::default()
        };
        fit.covered = f64::from(fit.steps) * beta;

        if residual.steps > 0 {
            let fix = f64::from(residual.steps) * beta - residual.s;
            if fix <= s {
                fit.offset_t = invert(fix).ok_or(SolveError::NumericalStagnation)?;
                fit.offset_s = fix;

                let stp = self.quantize(s - fix);
                fit.covered = fix + f64::from(stp) * beta;
                fit.steps = stp + residual.steps;
                fit.straddle_dt = residual.t + fit.offset_t;

                residual.clear();
            }
        }

        let mut reached = invert(fit.covered).ok_or(SolveError::NumericalStagnation)?;
        while seg.accel_at(reached) < -EXIT_ACCEL_TOL && fit.steps > 1 {
            fit.steps -= 1;
            fit.covered -= beta;
            reached = invert(fit.covered).ok_or(SolveError::NumericalStagnation)?;
        }
        if seg.accel_at(reached) < -EXIT_ACCEL_TOL {
            return Err(SolveError::NegativeTerminalAcceleration);
        }

        if s - fit.covered > self.config.epsilon {
            fit.t_err = t - reached;
            fit.s_err = s - fit.covered;
            residual.accumulate(fit.s_err, fit.t_err, self.alpha);
        }

        Ok(fit)
    }

    /// Step count for a mirror segment: the partner's displacement
    /// requantized with its residual set aside, plus the whole steps that
    /// residual has grown into. This is what keeps the total step count and
    /// the Δ palindrome intact when the accelerating half ends short of a
    /// step boundary.
    pub fn mirror_steps(&self, s: f64, s_err: f64) -> u32 {
        self.quantize(s - s_err) + (s_err * self.alpha).ceil() as u32
    }

    pub fn total_time(&self) -> f64 {
        self.segments.iter().map(|seg| seg.t).sum()
    }

    pub fn total_steps(&self) -> u32 {
        self.discrete.last().map_or(0, |seg| seg.last_step)
    }

    pub fn peak_velocity(&self) -> f64 {
        self.segments.iter().fold(0.0, |max, seg| seg.ve.max(max))
    }

    pub fn peak_acceleration(&self) -> f64 {
        self.segments.iter().fold(0.0, |max, seg| seg.ae.max(max))
    }

    /// Emits the continuous-form segment table through `tracing`.
    pub fn dump_continuous(&self) {
        debug!("| continuous  t(ms) |        vi |        ve |        ai |        ae |         s |");
        let mut t = 0.0;
        let mut s = 0.0;
        for seg in &self.segments {
            t += seg.t;
            s += seg.s();
            debug!(
                "| {:>6} {:>10.4} | {:>9.4} | {:>9.4} | {:>9.4} | {:>9.4} | {:>9.4} |",
                seg.id,
                seg.t * 1000.0,
                seg.vi,
                seg.ve,
                seg.ai,
                seg.ae,
                seg.s(),
            );
        }
        debug!("| total {:>11.4} |           |           |           |           | {:>9.4} |", t, s);
    }

    /// Emits the discrete-form segment table through `tracing`.
    pub fn dump_discrete(&self) {
        debug!("| discrete    t(ms) |        vi |        ve |        ai |        ae |         s |   steps |");
        let mut t = 0.0;
        let mut s = 0.0;
        let mut steps = 0;
        for seg in &self.discrete {
            t += seg.segment.t;
            s += seg.segment.s();
            steps += seg.steps();
            debug!(
                "| {:>6} {:>10.4} | {:>9.4} | {:>9.4} | {:>9.4} | {:>9.4} | {:>9.4} | {:>7} |",
                seg.segment.id,
                seg.segment.t * 1000.0,
                seg.segment.vi,
                seg.segment.ve,
                seg.segment.ai,
                seg.segment.ae,
                seg.segment.s(),
                seg.steps(),
            );
        }
        debug!(
            "| total {:>11.4} |           |           |           |           | {:>9.4} | {:>7} |",
            t, s, steps
        );
    }
}

//! The full seven-segment S-curve: constraint solving and characterization.

use crate::curve::{Curve, Residual, SegmentFit, BOUNDS_NEWTON_TOL};
use crate::discretize;
use crate::errors::SolveError;
use crate::request::{EffectiveConstraints, MotionRequest};
use crate::roots;
use crate::segment::{DiscreteSegment, Segment};
use crate::SolverConfig;

/// Solver state for a full S-curve: jerk-up, constant-acceleration, jerk-down
/// to the peak velocity, optional cruise, then the mirrored deceleration.
pub(crate) struct FullSCurve {
    curve: Curve,
    c: EffectiveConstraints,
}

impl FullSCurve {
    pub fn new(req: &MotionRequest, alpha: f64, config: SolverConfig) -> Self {
        Self {
            curve: Curve::new(alpha, config),
            c: EffectiveConstraints::new(req),
        }
    }

    /// Runs the solver pipeline and returns the characterized, discretized
    /// curve.
    pub fn solve(mut self) -> Result<Curve, SolveError> {
        if self.c.t > 0.0 {
            // The motion-only pass still tunes the constraints first; its
            // verdict is superseded by the time-and-motion pass.
            let _ = self.solve_motion();
            if !self.solve_time_and_motion() {
                return Err(SolveError::TimeTargetInfeasible);
            }
        } else if !self.solve_motion() {
            return Err(SolveError::ConstraintsInfeasible);
        }

        self.bounds()?;
        discretize::discretize(&mut self.curve)?;
        Ok(self.curve)
    }

    /// Minimum half-profile displacements the current constraints impose on
    /// segments 1, 2 and 3.
    fn min_displacement(&self) -> [f64; 3] {
        let c = &self.c;

        // Segment 1 depends on entry velocity, acceleration and jerk
        let s1 = (6.0 * c.a * c.j * c.v0 + c.a.powi(3)) / (6.0 * c.j * c.j);

        // Segment 2 additionally depends on the target velocity
        let s2 = (c.v * c.v * c.j - c.a * c.a * c.v - c.v0 * c.v0 * c.j - c.a * c.a * c.v0)
            / (2.0 * c.a * c.j);

        // Segment 3 depends on target velocity, acceleration and jerk
        let s3 = (6.0 * c.v * c.a * c.j - c.a.powi(3)) / (6.0 * c.j * c.j);

        [s1, s2, s3]
    }

    /// Whether every half-profile segment covers at least one step and the
    /// half-profile fits in half the displacement.
    fn admits_min_displacement(&self) -> bool {
        let min_s = self.min_displacement();
        min_s.iter().all(|&s| s >= self.curve.beta)
            && min_s.iter().sum::<f64>() <= self.c.s / 2.0
    }

    /// Tunes acceleration and velocity down until the displacement
    /// constraints are satisfiable, by monotone bisection on acceleration.
    fn solve_motion(&mut self) -> bool {
        // The acceleration at which segment 2 vanishes entirely.
        let a_peak = (self.c.j * (self.c.v - self.c.v0)).sqrt();

        if a_peak < self.c.a {
            // The requested ceiling would leave no constant-acceleration
            // segment; re-derive it so segment 2 keeps at least
            // `min_segment_steps` of displacement.
            let min_steps = f64::from(self.curve.config.min_segment_steps);
            if let Some(a) = roots::quadratic_pos(
                self.c.v + self.c.v0,
                2.0 * min_steps * self.curve.beta * self.c.j,
                -self.c.j * (self.c.v * self.c.v - self.c.v0 * self.c.v0),
            ) {
                self.c.update_a(a);
            }
        }

        if self.admits_min_displacement() {
            return true;
        }

        let mut min_a = 0.0;
        let mut max_a = self.c.a;
        let mut accepted: Option<(f64, f64)> = None;

        let iterations = bisect_iterations(max_a - min_a, self.curve.config.solve_error);
        for _ in 0..iterations {
            self.c.update_a(0.5 * (min_a + max_a));

            // The velocity reachable within S at the trial acceleration.
            let candidate = roots::quadratic_pos(
                1.0,
                self.c.a * self.c.a / self.c.j,
                (self.c.a * self.c.a * self.c.v0) / self.c.j
                    - self.c.v0 * self.c.v0
                    - self.c.s * self.c.a,
            );

            match candidate {
                Some(v) if v > self.c.v0 && v < self.c.v => {
                    self.c.update_v(v);
                    if self.admits_min_displacement() {
                        min_a = self.c.a;
                        accepted = Some((self.c.a, v));
                    } else {
                        max_a = self.c.a;
                    }
                    self.c.restore_v();
                }
                // A saturated candidate means this trial acceleration reaches
                // the velocity ceiling inside S: the feasible region lies at
                // higher accelerations, towards the cruise regime.
                Some(v) if v >= self.c.v => min_a = self.c.a,
                _ => max_a = self.c.a,
            }

            self.c.restore_a();
        }

        match accepted {
            Some((a, v)) => {
                self.c.update_a(a);
                self.c.update_v(v);
                true
            }
            None => false,
        }
    }

    /// One attempt at deriving the peak velocity directly from the time
    /// target at the current acceleration. Commits the velocity on success.
    fn solve_time_step(&mut self) -> bool {
        let min_v = self.c.v0 + self.c.a * self.c.a / self.c.j;

        // Smaller root of the quadratic in v obtained from the seven-segment
        // time/displacement identity.
        let candidate = roots::quadratic_neg(
            self.c.j,
            -self.c.a * self.c.j * self.c.t - 2.0 * self.c.j * self.c.v0 + self.c.a * self.c.a,
            self.c.j * self.c.v0 * self.c.v0 - self.c.a * self.c.a * self.c.v0
                + self.c.a * self.c.j * self.c.s,
        );

        let mut solved = false;
        if let Some(v) = candidate {
            if v > min_v && v <= self.c.v {
                self.c.update_v(v);
                solved = self.admits_min_displacement();
                self.c.restore_v();

                if solved {
                    self.c.update_v(v);
                }
            }
        }

        solved
    }

    /// Solves for a profile that meets the total-time target, retrying the
    /// direct derivation at bisected accelerations when the fast path fails.
    fn solve_time_and_motion(&mut self) -> bool {
        if self.c.s <= self.c.v0 * self.c.t {
            // Cruising at the entry velocity alone would already overrun the
            // displacement within the target time.
            return false;
        }

        if self.solve_time_step() {
            return true;
        }

        let mut min_a = 0.0;
        let mut max_a = self.c.a;
        let mut accepted: Option<(f64, f64)> = None;

        let iterations = bisect_iterations(max_a - min_a, self.curve.config.solve_error);
        for _ in 0..iterations {
            self.c.update_a(0.5 * (min_a + max_a));

            if self.solve_time_step() {
                min_a = self.c.a;
                accepted = Some((self.c.a, self.c.v));
            } else {
                max_a = self.c.a;
            }

            self.c.restore_a();
        }

        match accepted {
            Some((a, v)) => {
                self.c.update_a(a);
                self.c.update_v(v);
                true
            }
            None => false,
        }
    }

    /// Characterizes the seven segments in continuous and discrete form,
    /// propagating step-rounding residue through the absorb pass.
    fn bounds(&mut self) -> Result<(), SolveError> {
        let c = self.c;
        let [s1, s2, s3] = self.min_displacement();

        let mut residual = Residual::default();

        // Segment 1: jerk up from the entry velocity.
        let t1 = c.a / c.j;
        let seg1 = Segment::new(
            1,
            t1,
            c.v0,
            c.v0 + c.a * c.a / (2.0 * c.j),
            0.0,
            c.a,
            c.j,
            0.0,
            s1,
        );
        self.curve.push_segment(seg1);

        let fit1 = self.curve.fit_segment(&mut residual, s1, t1, false, |s| {
            roots::cubic_newton(seg1.j, 3.0 * seg1.ai, 6.0 * seg1.vi, -6.0 * s, t1, BOUNDS_NEWTON_TOL)
        })?;
        let mut last_step = fit1.steps;
        self.curve.push_discrete(DiscreteSegment::new(seg1, 1, last_step));

        // Segment 2: constant acceleration.
        let t2 = (c.v - c.v0 - c.a * c.a / c.j) / c.a;
        let seg2 = Segment::new(
            2,
            t2,
            seg1.ve,
            c.v - c.a * c.a / (2.0 * c.j),
            c.a,
            c.a,
            0.0,
            seg1.se,
            seg1.se + s2,
        );
        self.curve.push_segment(seg2);

        let fit2 = self.curve.fit_segment(&mut residual, s2, t2, false, |s| {
            roots::quadratic_pos(0.5 * seg2.ai, seg2.vi, -s)
        })?;
        let mut first_step = last_step + 1;
        last_step += fit2.steps;
        self.curve.push_discrete(
            DiscreteSegment::new(seg2, first_step, last_step).with_straddle(
                fit2.straddle_dt,
                fit2.offset_t,
                fit2.offset_s,
            ),
        );

        // Segment 3: jerk down onto the peak velocity.
        let t3 = c.a / c.j;
        let seg3 = Segment::new(3, t3, seg2.ve, c.v, c.a, 0.0, -c.j, seg2.se, seg2.se + s3);
        self.curve.push_segment(seg3);

        let fit3 = self.curve.fit_jerk_down_segment(&mut residual, &seg3)?;
        first_step = last_step + 1;
        last_step += fit3.steps;
        self.curve.push_discrete(
            DiscreteSegment::new(seg3, first_step, last_step).with_straddle(
                fit3.straddle_dt,
                fit3.offset_t,
                fit3.offset_s,
            ),
        );

        // Segment 4: cruise at the peak velocity, if any displacement is
        // left for it.
        let s4 = c.s - 2.0 * (s1 + s2 + s3);
        let mut fit4 = SegmentFit::default();
        let mut midpoint = seg3;
        if s4 > self.curve.config.epsilon {
            let t4 = s4 / seg3.ve;
            let seg4 = Segment::new(
                4,
                t4,
                seg3.ve,
                seg3.ve,
                0.0,
                0.0,
                0.0,
                seg3.se,
                seg3.se + s4,
            );
            self.curve.push_segment(seg4);

            fit4 = self
                .curve
                .fit_segment(&mut residual, s4, t4, true, |s| Some(s / seg4.vi))?;
            first_step = last_step + 1;
            last_step += fit4.steps;
            self.curve.push_discrete(
                DiscreteSegment::new(seg4, first_step, last_step).with_straddle(
                    fit4.straddle_dt,
                    fit4.offset_t,
                    fit4.offset_s,
                ),
            );
            midpoint = seg4;
        }

        // Segment 5: mirror of segment 3. The straddle interval re-emits the
        // partner's residual on this side of the midpoint, which keeps the
        // interval sequence palindromic.
        let seg5 = Segment::new(
            5,
            seg3.t,
            midpoint.ve,
            seg3.vi,
            0.0,
            -seg3.ai,
            seg3.j,
            midpoint.se,
            midpoint.se + seg3.s(),
        );
        self.curve.push_segment(seg5);

        let n5 = self.curve.mirror_steps(s3, fit3.s_err);
        let straddle5 = if self.curve.has_cruise {
            fit3.t_err + fit4.offset_t
        } else {
            2.0 * fit3.t_err
        };
        first_step = last_step + 1;
        last_step += n5;
        self.curve.push_discrete(
            DiscreteSegment::new(seg5, first_step, last_step).with_straddle(
                straddle5,
                fit3.t_err,
                fit3.s_err,
            ),
        );

        // Segment 6: mirror of segment 2.
        let seg6 = Segment::new(
            6,
            seg2.t,
            seg2.ve,
            seg2.vi,
            -seg2.ae,
            -seg2.ae,
            seg2.j,
            seg5.se,
            seg5.se + seg2.s(),
        );
        self.curve.push_segment(seg6);

        let n6 = self.curve.mirror_steps(s2, fit2.s_err);
        first_step = last_step + 1;
        last_step += n6;
        self.curve.push_discrete(
            DiscreteSegment::new(seg6, first_step, last_step).with_straddle(
                fit3.offset_t + fit2.t_err,
                fit2.t_err,
                fit2.s_err,
            ),
        );

        // Segment 7: mirror of segment 1, decelerating back onto the entry
        // velocity.
        let seg7 = Segment::new(
            7,
            seg1.t,
            seg1.ve,
            seg1.vi,
            -seg1.ae,
            -seg1.ai,
            seg1.j,
            seg6.se,
            seg6.se + seg1.s(),
        );
        self.curve.push_segment(seg7);

        let n7 = self.curve.mirror_steps(s1, fit1.s_err);
        first_step = last_step + 1;
        last_step += n7;
        self.curve.push_discrete(
            DiscreteSegment::new(seg7, first_step, last_step).with_straddle(
                fit2.offset_t + fit1.t_err,
                fit1.t_err,
                fit1.s_err,
            ),
        );

        if self.curve.config.debug_bounds {
            self.curve.dump_continuous();
            self.curve.dump_discrete();
        }

        Ok(())
    }
}

/// Bisection iteration count that narrows `range` down to `tolerance`.
fn bisect_iterations(range: f64, tolerance: f64) -> u32 {
    (range / tolerance).log2().ceil() as u32
}

//! The partial S-curve: the constant-acceleration segments collapsed away.
//!
//! Used when the displacement is too short for the full profile shape: the
//! axis jerks up to the working acceleration and straight back down, with an
//! optional cruise in the middle, so only segments 1, 3, 4, 5 and 7 exist.

use crate::curve::{Curve, Residual, SegmentFit, BOUNDS_NEWTON_TOL};
use crate::discretize;
use crate::errors::SolveError;
use crate::request::{EffectiveConstraints, MotionRequest};
use crate::roots;
use crate::segment::{DiscreteSegment, Segment};
use crate::SolverConfig;

/// Solver state for a partial S-curve.
pub(crate) struct PartialSCurve {
    curve: Curve,
    c: EffectiveConstraints,
    /// Total whole steps the request resolves to.
    steps: u32,
}

impl PartialSCurve {
    pub fn new(req: &MotionRequest, alpha: f64, config: SolverConfig) -> Self {
        Self {
            curve: Curve::new(alpha, config),
            c: EffectiveConstraints::new(req),
            steps: (req.s * alpha).floor() as u32,
        }
    }

    /// Runs the solver pipeline and returns the characterized, discretized
    /// curve.
    pub fn solve(mut self) -> Result<Curve, SolveError> {
        if self.c.t > 0.0 {
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

    /// Minimum half-profile displacements for segments 1 and 3. Both depend
    /// only on entry velocity, acceleration and jerk; the peak velocity is
    /// whatever the back-to-back jerk segments reach.
    fn min_displacement(&self) -> [f64; 2] {
        let c = &self.c;

        let s1 = (6.0 * c.a * c.j * c.v0 + c.a.powi(3)) / (6.0 * c.j * c.j);
        let s3 = (6.0 * c.a * c.j * c.v0 + 5.0 * c.a.powi(3)) / (6.0 * c.j * c.j);

        [s1, s3]
    }

    fn admits_min_displacement(&self) -> bool {
        let min_s = self.min_displacement();
        min_s.iter().all(|&s| s >= self.curve.beta)
            && min_s.iter().sum::<f64>() <= self.c.s / 2.0
    }

    /// Tunes the acceleration down until both jerk segments fit in half the
    /// displacement, keeping the entry velocity and jerk invariant.
    fn solve_motion(&mut self) -> bool {
        if self.admits_min_displacement() {
            let v = self.c.v0 + self.c.a * self.c.a / self.c.j;
            if v > self.c.v {
                // The jerk segments would overshoot the velocity ceiling;
                // pull the acceleration down to peak exactly at it.
                let a = (self.c.j * (self.c.v - self.c.v0)).sqrt();
                self.c.update_a(a);
            } else {
                self.c.update_v(v);
            }
            return true;
        }

        // Solve the half-displacement identity for the acceleration that
        // makes the two jerk segments cover exactly half the steps.
        let candidate = roots::cubic_newton(
            1.0 / (self.c.j * self.c.j),
            0.0,
            2.0 * self.c.v0 / self.c.j,
            -(f64::from(self.steps) / 2.0) * self.curve.beta,
            self.c.a,
            BOUNDS_NEWTON_TOL,
        );

        let Some(root) = candidate else {
            return false;
        };

        let mut a = root;
        let mut v = self.c.v0 + a * a / self.c.j;
        if v > self.c.v {
            a = (self.c.j * (self.c.v - self.c.v0)).sqrt();
            v = self.c.v;
        }

        self.c.update_a(a);
        self.c.update_v(v);

        // The tuned acceleration puts the jerk segments at exactly half the
        // displacement, so only the per-segment step minimum is left to
        // check.
        let min_s = self.min_displacement();
        if min_s.iter().all(|&s| s >= self.curve.beta) {
            true
        } else {
            self.c.restore_a();
            self.c.restore_v();
            false
        }
    }

    /// Solves for an acceleration that meets the total-time target.
    fn solve_time_and_motion(&mut self) -> bool {
        if self.c.s <= self.c.v0 * self.c.t {
            return false;
        }

        // Candidate acceleration from the partial-profile time identity.
        let candidate = roots::cubic_newton(
            2.0,
            -self.c.t * self.c.j,
            0.0,
            self.c.j * self.c.j * (self.c.s - self.c.t * self.c.v0),
            self.c.a,
            BOUNDS_NEWTON_TOL,
        );

        let Some(a) = candidate else {
            return false;
        };
        if !(a > 0.0 && a < self.c.a) {
            return false;
        }

        let v = self.c.v0 + a * a / self.c.j;
        if !(v > self.c.v0 && v < self.c.v) {
            return false;
        }

        self.c.update_a(a);
        self.c.update_v(v);

        if self.admits_min_displacement() {
            true
        } else {
            self.c.restore_a();
            self.c.restore_v();
            false
        }
    }

    /// Characterizes the five segments in continuous and discrete form with
    /// the same residual-absorbing pass the full profile uses.
    fn bounds(&mut self) -> Result<(), SolveError> {
        let c = self.c;
        let [s1, s3] = self.min_displacement();

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

        // Segment 3: jerk straight back down; the peak velocity is reached
        // here rather than in a constant-acceleration segment.
        let t3 = c.a / c.j;
        let seg3 = Segment::new(
            3,
            t3,
            seg1.ve,
            c.v0 + c.a * c.a / c.j,
            c.a,
            0.0,
            -c.j,
            seg1.se,
            seg1.se + s3,
        );
        self.curve.push_segment(seg3);

        let fit3 = self.curve.fit_jerk_down_segment(&mut residual, &seg3)?;
        let mut first_step = last_step + 1;
        last_step += fit3.steps;
        self.curve.push_discrete(
            DiscreteSegment::new(seg3, first_step, last_step).with_straddle(
                fit3.straddle_dt,
                fit3.offset_t,
                fit3.offset_s,
            ),
        );

        // Segment 4: cruise at the peak, if any displacement is left.
        let s4 = c.s - 2.0 * (s1 + s3);
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

        // Segment 5: mirror of segment 3.
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

        // Segment 7: mirror of segment 1, back onto the entry velocity.
        let seg7 = Segment::new(
            7,
            seg1.t,
            seg1.ve,
            seg1.vi,
            -seg1.ae,
            -seg1.ai,
            seg1.j,
            seg5.se,
            seg5.se + seg1.s(),
        );
        self.curve.push_segment(seg7);

        let n7 = self.curve.mirror_steps(s1, fit1.s_err);
        first_step = last_step + 1;
        last_step += n7;
        self.curve.push_discrete(
            DiscreteSegment::new(seg7, first_step, last_step).with_straddle(
                fit3.offset_t + fit1.t_err,
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

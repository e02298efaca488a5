//! Step discretization: walking the discrete segments and inverting each
//! displacement law one step at a time.

use tracing::debug;

use crate::curve::Curve;
use crate::errors::SolveError;
use crate::roots;
use crate::segment::DiscreteSegment;

/// Absolute tolerance for the per-step Newton inversion.
const STEP_NEWTON_TOL: f64 = 1e-9;

/// The inverse of a segment's local displacement law, tagged by polynomial
/// degree so the hot loop stays monomorphic.
#[derive(Debug, Clone, Copy)]
enum InverseLaw {
    /// Segments 1/3/5/7: solve j·t³ + 3ai·t² + 6vi·t − 6s = 0 by warm-started
    /// Newton.
    Cubic { j: f64, ai: f64, vi: f64 },
    /// Segments 2/6: closed-form positive root of ai/2·t² + vi·t − s = 0.
    Quadratic { ai: f64, vi: f64 },
    /// Segment 4: t = s / vi.
    Linear { vi: f64 },
}

impl InverseLaw {
    fn for_segment(seg: &DiscreteSegment) -> Self {
        let base = &seg.segment;
        match base.id {
            2 | 6 => InverseLaw::Quadratic { ai: base.ai, vi: base.vi },
            4 => InverseLaw::Linear { vi: base.vi },
            _ => InverseLaw::Cubic { j: base.j, ai: base.ai, vi: base.vi },
        }
    }

    /// Local time at which the segment has covered local displacement `s`.
    fn invert(&self, s: f64, x0: f64) -> Option<f64> {
        match *self {
            InverseLaw::Cubic { j, ai, vi } => {
                roots::cubic_newton(j, 3.0 * ai, 6.0 * vi, -6.0 * s, x0, STEP_NEWTON_TOL)
            }
            InverseLaw::Quadratic { ai, vi } => roots::quadratic_pos(0.5 * ai, vi, -s),
            InverseLaw::Linear { vi } => Some(s / vi),
        }
    }
}

/// Initial Newton guess for the first step of a cubic segment.
///
/// At entry velocity `vi` a step takes about `beta / vi`; from standstill the
/// pure-jerk law gives the estimate instead.
fn first_step_guess(beta: f64, vi: f64, j: f64) -> f64 {
    if vi > 0.0 {
        beta / vi
    } else {
        (6.0 * beta / j.abs()).cbrt()
    }
}

/// Produces the per-step interval vector for a fully characterized curve.
///
/// Each segment contributes `steps()` intervals. A segment that absorbed
/// rounding residue first emits its straddle interval, then steps on the
/// `offset_s + k·beta` grid; all other segments step on their local `k·beta`
/// grid. Cubic segments keep a warm-start state so Newton stays super-linear
/// from step to step.
pub(crate) fn discretize(curve: &mut Curve) -> Result<(), SolveError> {
    let beta = curve.beta;
    let trace_steps = curve.config.debug_discretize;
    let mut deltas: Vec<f64> = Vec::with_capacity(curve.total_steps() as usize);

    let mut step: u32 = 0;

    for seg in &curve.discrete {
        let base = &seg.segment;
        let law = InverseLaw::for_segment(seg);

        let mut t;
        let mut acc_s;
        let mut segment_step: u32 = 0;

        if seg.straddle_dt > 0.0 || base.t == 0.0 {
            // The step straddling the boundary belongs to this segment.
            deltas.push(seg.straddle_dt);
            t = seg.offset_t;
            acc_s = seg.offset_s;
            step += 1;

            if trace_steps {
                debug!(
                    "step {:>5}  delta {:>12.1}ns  t {:.9}  s {:.6}  v {:.4}",
                    step,
                    seg.straddle_dt * 1e9,
                    t,
                    base.displacement_at(t),
                    base.velocity_at(t),
                );
            }
        } else {
            t = 0.0;
            acc_s = 0.0;
        }

        let mut x0 = first_step_guess(beta, base.vi, base.j);

        while step < seg.last_step {
            let delta = match law {
                InverseLaw::Linear { vi } => beta / vi,
                _ => {
                    let prev_t = t;
                    t = law
                        .invert(acc_s + beta, x0)
                        .ok_or(SolveError::NumericalStagnation)?;
                    if matches!(law, InverseLaw::Cubic { .. }) {
                        x0 = beta / base.velocity_at(t) + t;
                    }
                    t - prev_t
                }
            };

            deltas.push(delta);
            step += 1;
            segment_step += 1;
            acc_s = seg.offset_s + f64::from(segment_step) * beta;

            if trace_steps {
                debug!(
                    "step {:>5}  delta {:>12.1}ns  t {:.9}  s {:.6}  v {:.4}",
                    step,
                    delta * 1e9,
                    t,
                    base.displacement_at(t),
                    base.velocity_at(t),
                );
            }
        }
    }

    curve.deltas = deltas;
    Ok(())
}

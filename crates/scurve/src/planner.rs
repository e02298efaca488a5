//! The profile façade: one request in, one solved profile out.

use core::fmt;

use tracing::debug;

use crate::curve::Curve;
use crate::errors::SolveError;
use crate::full::FullSCurve;
use crate::partial::PartialSCurve;
use crate::request::MotionRequest;
use crate::segment::{DiscreteSegment, Segment};
use crate::SolverConfig;

/// Which profile shape a solve produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub enum ProfileKind {
    FullSCurve,
    PartialSCurve,
}

impl fmt::Display for ProfileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileKind::FullSCurve => f.write_str("Full S-Curve"),
            ProfileKind::PartialSCurve => f.write_str("Partial S-Curve"),
        }
    }
}

/// A solved motion profile.
///
/// Owns the continuous segment list (for analysis and plotting), the
/// discrete segment list (step ranges and boundary straddles) and the
/// inter-step interval vector, one entry per step of the move.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct Profile {
    kind: ProfileKind,
    segments: Vec<Segment>,
    discrete_segments: Vec<DiscreteSegment>,
    deltas: Vec<f64>,
    total_time: f64,
    peak_velocity: f64,
    peak_acceleration: f64,
}

impl Profile {
    pub(crate) fn from_curve(curve: Curve, kind: ProfileKind) -> Self {
        Self {
            kind,
            total_time: curve.total_time(),
            peak_velocity: curve.peak_velocity(),
            peak_acceleration: curve.peak_acceleration(),
            segments: curve.segments,
            discrete_segments: curve.discrete,
            deltas: curve.deltas,
        }
    }

    pub fn kind(&self) -> ProfileKind {
        self.kind
    }

    /// The continuous segments, at most seven, in execution order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The discrete segments with their step ranges.
    pub fn discrete_segments(&self) -> &[DiscreteSegment] {
        &self.discrete_segments
    }

    /// Inter-step time intervals; `deltas()[k]` is the time from step `k` to
    /// step `k + 1`, with step 0 at motion start.
    pub fn deltas(&self) -> &[f64] {
        &self.deltas
    }

    pub fn total_steps(&self) -> u32 {
        self.deltas.len() as u32
    }

    /// Duration of the continuous profile in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn peak_velocity(&self) -> f64 {
        self.peak_velocity
    }

    pub fn peak_acceleration(&self) -> f64 {
        self.peak_acceleration
    }
}

/// Plans a step profile for a single motion request.
///
/// The planner first tries the full seven-segment shape and falls back to
/// the partial shape when the full one cannot fit the constraints.
#[derive(Debug, Clone, Copy)]
pub struct Planner {
    req: MotionRequest,
    alpha: f64,
    config: SolverConfig,
}

impl Planner {
    /// Creates a planner at `alpha` steps per displacement unit with default
    /// configuration.
    pub fn new(req: MotionRequest, alpha: f64) -> Self {
        Self::with_config(req, alpha, SolverConfig::default())
    }

    pub fn with_config(req: MotionRequest, alpha: f64, config: SolverConfig) -> Self {
        Self { req, alpha, config }
    }

    /// Solves the request into a profile, or reports why it cannot be done.
    pub fn solve(&self) -> Result<Profile, SolveError> {
        if !self.req.is_well_formed() || !(self.alpha > 0.0) {
            return Err(SolveError::ConstraintsInfeasible);
        }

        match FullSCurve::new(&self.req, self.alpha, self.config).solve() {
            Ok(curve) => Ok(Profile::from_curve(curve, ProfileKind::FullSCurve)),
            Err(full_error) => {
                debug!(%full_error, "full S-curve rejected, trying partial");
                let curve = PartialSCurve::new(&self.req, self.alpha, self.config).solve()?;
                Ok(Profile::from_curve(curve, ProfileKind::PartialSCurve))
            }
        }
    }
}

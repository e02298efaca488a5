//! # S-Curve Motion Profile Crate
//!
//! A deterministic, single-axis, jerk-limited S-curve profile generator with
//! exact step discretization for stepper-like actuators.
//!
//! Provides the core motion primitives:
//! - Constraint solving (monotone bisection over acceleration and velocity,
//!   with an optional total-time target)
//! - Seven- and five-segment profile characterization with step-rounding
//!   residual propagation across segment boundaries
//! - Per-step time-interval generation by inverting each segment's
//!   displacement law (warm-started Newton for the cubic segments)
//!
//! One [`Planner`] turns one [`MotionRequest`] into one [`Profile`] carrying
//! the continuous segments, their discrete counterparts and the inter-step
//! interval vector. Solving is synchronous, deterministic and does no I/O;
//! planners for different requests share nothing and can run on any number
//! of threads.

pub mod errors;
pub mod planner;
pub mod request;
pub mod segment;

mod curve;
mod discretize;
mod full;
mod partial;
mod quantize;
mod roots;

// Re-export core types for easier access
pub use errors::SolveError;
pub use planner::{Planner, Profile, ProfileKind};
pub use request::MotionRequest;
pub use segment::{DiscreteSegment, Segment};

/// Tunables for the solver and discretizer.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct SolverConfig {
    /// Tolerance under which an almost-whole step counts as whole when
    /// quantizing a displacement.
    pub epsilon: f64,
    /// Interval on the acceleration axis at which bisection stops.
    pub solve_error: f64,
    /// Steps the constant-acceleration segment is kept at when the requested
    /// ceiling would make it vanish.
    pub min_segment_steps: u32,
    /// Emit the continuous/discrete segment tables after characterization.
    pub debug_bounds: bool,
    /// Emit a per-step trace while discretizing.
    pub debug_discretize: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            epsilon: 1e-9,
            solve_error: 0.01,
            min_segment_steps: 2,
            debug_bounds: false,
            debug_discretize: false,
        }
    }
}

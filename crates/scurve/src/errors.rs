//! Error types for profile solving.

use thiserror::Error;

/// Represents a failure to turn a motion request into a step profile.
///
/// Errors are values: the solver never panics on an unsatisfiable request,
/// and a rejected bisection trial never leaves the scratch constraints
/// half-mutated.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveError {
    /// The displacement constraints cannot be met even after bisecting the
    /// acceleration ceiling all the way down.
    #[error("displacement constraints cannot be satisfied at any acceleration")]
    ConstraintsInfeasible,

    /// The total-time target cannot be met for the requested displacement.
    #[error("total-time target cannot be met for the requested displacement")]
    TimeTargetInfeasible,

    /// Step rounding drove the exit acceleration of the jerk-down segment
    /// negative and shrinking its step count did not recover it.
    #[error("step rounding drove the jerk-down exit acceleration negative")]
    NegativeTerminalAcceleration,

    /// Newton iteration diverged while inverting a displacement law.
    #[error("newton iteration diverged while inverting the displacement law")]
    NumericalStagnation,
}

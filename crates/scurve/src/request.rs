//! Motion requests and the solver's mutable view of them.

/// A single-axis motion request.
///
/// Units are caller-defined; velocities, accelerations and jerk are per
/// second, per second squared and per second cubed of the same length unit as
/// the displacement. The request describes forward motion only; callers
/// handle direction by reflection.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize, serde::Deserialize))]
pub struct MotionRequest {
    /// Entry velocity, >= 0.
    pub v0: f64,
    /// Velocity ceiling, > `v0`.
    pub v: f64,
    /// Acceleration ceiling, > 0.
    pub a: f64,
    /// Jerk ceiling, > 0.
    pub j: f64,
    /// Total displacement, > 0.
    pub s: f64,
    /// Total-time target in seconds; 0 means "no time target".
    pub t: f64,
}

impl MotionRequest {
    /// Creates a request without a time target.
    pub fn new(v0: f64, v: f64, a: f64, j: f64, s: f64) -> Self {
        Self { v0, v, a, j, s, t: 0.0 }
    }

    /// Returns the request with a total-time target attached.
    pub fn with_time_target(mut self, t: f64) -> Self {
        self.t = t;
        self
    }

    /// Whether the request's ceilings are usable at all. The solvers reject
    /// anything else before touching the numerics.
    pub(crate) fn is_well_formed(&self) -> bool {
        self.v0 >= 0.0 && self.v > self.v0 && self.a > 0.0 && self.j > 0.0 && self.s > 0.0
    }
}

/// The solver's scratch copy of a request.
///
/// Bisection tunes acceleration and velocity down from their ceilings; each
/// axis supports a single level of update/restore. The solver never nests
/// updates deeper than that, so two saved scalars replace an undo stack.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EffectiveConstraints {
    pub v0: f64,
    pub v: f64,
    pub a: f64,
    pub j: f64,
    pub s: f64,
    pub t: f64,

    a_saved: f64,
    v_saved: f64,
}

impl EffectiveConstraints {
    pub fn new(req: &MotionRequest) -> Self {
        Self {
            v0: req.v0,
            v: req.v,
            a: req.a,
            j: req.j,
            s: req.s,
            t: req.t,
            a_saved: req.a,
            v_saved: req.v,
        }
    }

    pub fn update_a(&mut self, a: f64) {
        self.a_saved = self.a;
        self.a = a;
    }

    pub fn restore_a(&mut self) {
        self.a = self.a_saved;
    }

    pub fn update_v(&mut self, v: f64) {
        self.v_saved = self.v;
        self.v = v;
    }

    pub fn restore_v(&mut self) {
        self.v = self.v_saved;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_and_restore_are_single_level() {
        let req = MotionRequest::new(0.0, 100.0, 500.0, 10000.0, 1.0);
        let mut c = EffectiveConstraints::new(&req);

        c.update_a(250.0);
        assert_eq!(c.a, 250.0);
        c.restore_a();
        assert_eq!(c.a, 500.0);

        // A second update overwrites the saved value; restore goes back one
        // level only.
        c.update_v(50.0);
        c.update_v(25.0);
        c.restore_v();
        assert_eq!(c.v, 50.0);
    }

    #[test]
    fn degenerate_requests_are_rejected() {
        assert!(MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 1.0).is_well_formed());
        assert!(!MotionRequest::new(8.33, 8.33, 500.0, 10000.0, 1.0).is_well_formed());
        assert!(!MotionRequest::new(8.33, 100.0, 0.0, 10000.0, 1.0).is_well_formed());
        assert!(!MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 0.0).is_well_formed());
        assert!(!MotionRequest::new(-1.0, 100.0, 500.0, 10000.0, 1.0).is_well_formed());
    }
}

//! Polynomial root finders used to invert segment displacement laws.
//!
//! The cubic solver is a damped Newton iteration rather than a closed form:
//! Cardano is unstable near a vanishing discriminant, and the discretizer
//! calls the solver once per step with an engineered initial guess, so a
//! warm-started Newton converges in two to five iterations.

/// Hard cap on Newton iterations. With the per-step warm start the loop
/// terminates in a handful of iterations; the cap only bounds pathological
/// inputs.
const MAX_ITERATIONS: u32 = 32;

/// Finds a root of `a·x³ + b·x² + c·x + d` by damped Newton iteration
/// starting from `x0`.
///
/// Iteration stops when the step size drops to `tol`, or when it repeats
/// exactly (stagnation at the limit of f64 resolution). A strictly growing
/// step size means the iteration is diverging and there is no root to be
/// found from this guess; `None` is returned.
pub fn cubic_newton(a: f64, b: f64, c: f64, d: f64, x0: f64, tol: f64) -> Option<f64> {
    let f = |x: f64| a * x * x * x + b * x * x + c * x + d;
    let df = |x: f64| 3.0 * a * x * x + 2.0 * b * x + c;

    let mut x0 = x0;
    let mut x1 = x0 - f(x0) / df(x0);
    let mut error = (x1 - x0).abs();
    let mut prev_error = f64::MAX;

    let mut iterations = 0;
    while error > tol && error != prev_error {
        x0 = x1;
        x1 = x0 - f(x0) / df(x0);

        prev_error = error;
        error = (x1 - x0).abs();

        if error > prev_error {
            return None;
        }

        iterations += 1;
        if iterations >= MAX_ITERATIONS {
            return None;
        }
    }

    if x1.is_finite() {
        Some(x1)
    } else {
        None
    }
}

/// Returns the positive root of `a·x² + b·x + c`, or `None` when the
/// discriminant is negative or the root is negative. A zero root is
/// admissible.
pub fn quadratic_pos(a: f64, b: f64, c: f64) -> Option<f64> {
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let root = (-b + discriminant.sqrt()) / (2.0 * a);
    if root >= 0.0 {
        Some(root)
    } else {
        None
    }
}

/// Returns the smaller (negative-branch) root of `a·x² + b·x + c`, or `None`
/// when the discriminant is negative or the root is negative.
pub fn quadratic_neg(a: f64, b: f64, c: f64) -> Option<f64> {
    let discriminant = b * b - 4.0 * a * c;

    if discriminant < 0.0 {
        return None;
    }

    let root = (-b - discriminant.sqrt()) / (2.0 * a);
    if root >= 0.0 {
        Some(root)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    #[test]
    fn cubic_newton_finds_simple_root() {
        // x³ - 8 = 0 -> x = 2
        let root = cubic_newton(1.0, 0.0, 0.0, -8.0, 3.0, 1e-9).unwrap();
        assert!(approx_eq!(f64, root, 2.0, epsilon = 1e-9));
    }

    #[test]
    fn cubic_newton_inverts_displacement_law() {
        // s(t) = j/6·t³ + v·t with j = 10000, v = 8.33: solve s(t) = 0.0025.
        // Coefficients in the discretizer's form: j·t³ + 6v·t - 6s = 0.
        let j = 10000.0;
        let v = 8.33;
        let s = 0.0025;
        let t = cubic_newton(j, 0.0, 6.0 * v, -6.0 * s, s / v, 1e-9).unwrap();
        let covered = j / 6.0 * t * t * t + v * t;
        assert!(approx_eq!(f64, covered, s, epsilon = 1e-12));
    }

    #[test]
    fn cubic_newton_rejects_divergence() {
        // x² + 1 (as a degenerate cubic) has no real root; from x0 = 0.5 the
        // iteration oscillates with a growing step and must report failure
        // instead of looping.
        let result = cubic_newton(0.0, 1.0, 0.0, 1.0, 0.5, 1e-9);
        assert!(result.is_none());
    }

    #[test]
    fn quadratic_pos_picks_positive_branch() {
        // x² - x - 6 = 0 -> roots 3 and -2
        let root = quadratic_pos(1.0, -1.0, -6.0).unwrap();
        assert!(approx_eq!(f64, root, 3.0, epsilon = 1e-12));
    }

    #[test]
    fn quadratic_pos_rejects_negative_root() {
        // x² + 3x + 2 = 0 -> roots -1 and -2, both negative
        assert!(quadratic_pos(1.0, 3.0, 2.0).is_none());
    }

    #[test]
    fn quadratic_pos_accepts_zero_root() {
        // x² + 2x = 0 -> picks 0 over -2
        let root = quadratic_pos(1.0, 2.0, 0.0).unwrap();
        assert_eq!(root, 0.0);
    }

    #[test]
    fn quadratic_neg_picks_smaller_branch() {
        // x² - 5x + 6 = 0 -> roots 2 and 3, smaller is 2
        let root = quadratic_neg(1.0, -5.0, 6.0).unwrap();
        assert!(approx_eq!(f64, root, 2.0, epsilon = 1e-12));
    }

    #[test]
    fn quadratic_rejects_complex_roots() {
        assert!(quadratic_pos(1.0, 0.0, 1.0).is_none());
        assert!(quadratic_neg(1.0, 0.0, 1.0).is_none());
    }
}

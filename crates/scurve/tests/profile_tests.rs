//! Invariant suite for solved profiles.
//!
//! Every accepted profile must satisfy, in both continuous and discrete
//! form: segment adjacency, velocity/acceleration ceilings, the per-step
//! displacement quantum, interval monotonicity per kinematic regime, and
//! symmetry of the interval sequence. The scenarios pin down exact step
//! counts at alpha = 400 (beta = 0.0025).

use scurve::{MotionRequest, Planner, Profile, ProfileKind, SolveError, SolverConfig};

const ALPHA: f64 = 400.0;
const BETA: f64 = 1.0 / ALPHA;

const S_EPSILON: f64 = 1e-4;
const V_EPSILON: f64 = 1e-4;
const A_EPSILON: f64 = 1e-4;
const T_EPSILON: f64 = 1e-4;

/// Adjacency and ceiling checks over the continuous segment list.
fn check_continuous_bounds(profile: &Profile, req: &MotionRequest) {
    let segments = profile.segments();
    let first = &segments[0];

    let mut se = first.si;
    let mut ve = first.vi;
    let mut ae = first.ai;

    for seg in segments {
        assert!(
            (seg.si - se).abs() <= S_EPSILON,
            "s adjacency failed entering segment {}: {} vs {}",
            seg.id,
            seg.si,
            se
        );
        assert!(
            (seg.vi - ve).abs() <= V_EPSILON,
            "v adjacency failed entering segment {}: {} vs {}",
            seg.id,
            seg.vi,
            ve
        );
        assert!(
            (seg.ai - ae).abs() <= A_EPSILON,
            "a adjacency failed entering segment {}: {} vs {}",
            seg.id,
            seg.ai,
            ae
        );

        assert!(seg.vi <= req.v, "vi exceeds the velocity ceiling in segment {}", seg.id);
        assert!(seg.vi >= req.v0, "vi below the entry velocity in segment {}", seg.id);
        assert!(seg.ve <= req.v, "ve exceeds the velocity ceiling in segment {}", seg.id);
        assert!(seg.ve >= req.v0, "ve below the entry velocity in segment {}", seg.id);
        assert!(seg.ai <= req.a, "ai exceeds the acceleration ceiling in segment {}", seg.id);
        assert!(seg.ae <= req.a, "ae exceeds the acceleration ceiling in segment {}", seg.id);

        se = seg.se;
        ve = seg.ve;
        ae = seg.ae;
    }
}

/// Adjacency and ceiling checks over the discrete segment list. The cruise
/// segment is acceleration-transparent: its entry and exit accelerations are
/// identically zero and the jerk-down exit acceleration carries across it.
fn check_discrete_bounds(profile: &Profile, req: &MotionRequest) {
    let discrete = profile.discrete_segments();
    let first = &discrete[0].segment;

    let mut se = first.si;
    let mut ve = first.vi;
    let mut ae = first.ai;

    for d in discrete {
        let seg = &d.segment;

        assert!(
            (seg.si - se).abs() <= S_EPSILON,
            "s adjacency failed entering discrete segment {}",
            seg.id
        );
        assert!(
            (seg.vi - ve).abs() <= V_EPSILON,
            "v adjacency failed entering discrete segment {}",
            seg.id
        );

        if seg.id != 4 {
            assert!(
                (seg.ai - ae).abs() <= A_EPSILON,
                "a adjacency failed entering discrete segment {}",
                seg.id
            );
        } else {
            assert_eq!(seg.ai, 0.0, "cruise segment entry acceleration not zero");
            assert_eq!(seg.ae, 0.0, "cruise segment exit acceleration not zero");
        }

        assert!(seg.vi <= req.v && seg.vi >= req.v0, "vi out of bounds in discrete segment {}", seg.id);
        assert!(seg.ve <= req.v && seg.ve >= req.v0, "ve out of bounds in discrete segment {}", seg.id);
        assert!(seg.ai <= req.a, "ai exceeds ceiling in discrete segment {}", seg.id);
        assert!(seg.ae <= req.a, "ae exceeds ceiling in discrete segment {}", seg.id);

        se = seg.se;
        ve = seg.ve;
        if seg.id != 4 {
            ae = if seg.id == 3 { -seg.ae } else { seg.ae };
        }
    }
}

/// Walks the interval vector segment by segment: every step must land on the
/// global `k * beta` grid, intervals must shrink while accelerating, grow
/// while decelerating and stay flat while cruising, and the whole vector
/// must read the same forwards and backwards.
fn check_deltas(profile: &Profile) {
    let deltas = profile.deltas();

    for d in profile.discrete_segments() {
        if d.steps() == 0 {
            continue;
        }
        let seg = &d.segment;
        let accelerating = seg.id < 4;
        let decelerating = seg.id > 4;

        let mut local_t = 0.0;
        for (k, step) in (d.first_step..=d.last_step).enumerate() {
            let idx = (step - 1) as usize;
            let delta = deltas[idx];

            if k == 0 && d.straddle_dt > 0.0 {
                local_t = d.offset_t;
            } else {
                local_t += delta;
            }

            let on_grid = f64::from(step) * BETA;
            let s_here = seg.displacement_at(local_t);
            assert!(
                (s_here - on_grid).abs() <= S_EPSILON,
                "step {} left the beta grid in segment {}: {} vs {}",
                step,
                seg.id,
                s_here,
                on_grid
            );

            // Monotonicity holds between consecutive steps of one segment;
            // a straddle interval spanning the velocity peak may be shorter
            // than the last interval of the previous segment.
            if k > 0 {
                let diff = (deltas[idx - 1] * 1e12).floor() - (delta * 1e12).floor();
                if accelerating {
                    assert!(
                        diff >= 1.0,
                        "interval not shrinking in accelerating segment {} at step {}",
                        seg.id,
                        step
                    );
                } else if decelerating {
                    assert!(
                        diff <= 1.0,
                        "interval not growing in decelerating segment {} at step {}",
                        seg.id,
                        step
                    );
                } else {
                    assert!(
                        diff >= 0.0,
                        "interval grew in the cruise segment at step {}",
                        step
                    );
                }
            }
        }
    }

    // The interval sequence is palindromic across the whole move.
    let n = deltas.len();
    for i in 0..n / 2 {
        assert!(
            (deltas[i] - deltas[n - 1 - i]).abs() <= 1e-9,
            "interval symmetry failed at {} / {}: {} vs {}",
            i,
            n - 1 - i,
            deltas[i],
            deltas[n - 1 - i]
        );
    }
}

fn check_profile(profile: &Profile, req: &MotionRequest) {
    check_continuous_bounds(profile, req);
    check_discrete_bounds(profile, req);
    check_deltas(profile);

    let steps: u32 = profile.discrete_segments().iter().map(|d| d.steps()).sum();
    assert_eq!(steps, profile.total_steps(), "segment step ranges disagree with the interval count");
}

#[test]
fn full_scurve_seed_scenarios() {
    let cases: &[(f64, u32)] = &[
        (0.0625, 25),
        (0.0650, 26),
        (1.0000, 400),
        (10.0025, 4001),
        (100.0050, 40002),
    ];

    for &(s, expected_steps) in cases {
        let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, s);
        let profile = Planner::new(req, ALPHA)
            .solve()
            .unwrap_or_else(|e| panic!("solve failed for displacement {}: {}", s, e));

        assert_eq!(
            profile.kind(),
            ProfileKind::FullSCurve,
            "unexpected profile kind for displacement {}",
            s
        );
        assert_eq!(
            profile.total_steps(),
            expected_steps,
            "step count mismatch for displacement {}",
            s
        );

        check_profile(&profile, &req);
    }
}

#[test]
fn time_target_fits_total_time() {
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 10.0).with_time_target(0.4);
    let profile = Planner::new(req, ALPHA).solve().expect("time-target solve failed");

    assert_eq!(profile.kind(), ProfileKind::FullSCurve);
    assert_eq!(profile.total_steps(), 4000);

    let total: f64 = profile.deltas().iter().sum();
    assert!(
        (total - 0.4).abs() <= T_EPSILON,
        "interval sum {} missed the 0.4s target",
        total
    );
    assert!((profile.total_time() - 0.4).abs() <= T_EPSILON);

    check_profile(&profile, &req);
}

#[test]
fn short_move_falls_back_to_partial() {
    // Too little displacement for the full shape at this entry velocity: no
    // acceleration leaves both jerk segments and the constant-acceleration
    // segment a whole step each.
    let req = MotionRequest::new(8.33, 100.0, 20.0, 10000.0, 0.0125);
    let profile = Planner::new(req, ALPHA).solve().expect("partial fallback failed");

    assert_eq!(profile.kind(), ProfileKind::PartialSCurve);
    assert_eq!(profile.total_steps(), 5);
    // No cruise: segments 1, 3, 5, 7 only
    assert_eq!(profile.segments().len(), 4);

    check_profile(&profile, &req);
}

#[test]
fn velocity_limited_move_keeps_minimum_cruise_accel_segment() {
    // The velocity ceiling is close to the entry velocity, so the requested
    // acceleration would make segment 2 vanish; the solver re-derives the
    // ceiling to leave it exactly `min_segment_steps` of displacement.
    let req = MotionRequest::new(10.0, 12.0, 500.0, 10000.0, 5.0);
    let profile = Planner::new(req, ALPHA).solve().expect("velocity-limited solve failed");

    assert_eq!(profile.kind(), ProfileKind::FullSCurve);
    assert_eq!(profile.total_steps(), 2000);

    let seg2 = profile
        .discrete_segments()
        .iter()
        .find(|d| d.segment.id == 2)
        .expect("constant-acceleration segment missing");
    assert_eq!(seg2.steps(), 2, "cruise-acceleration segment not held at the step minimum");

    assert!(profile.peak_velocity() <= 12.0 + V_EPSILON);
    assert!(profile.peak_acceleration() < 500.0);

    check_profile(&profile, &req);
}

#[test]
fn sub_step_displacement_is_infeasible() {
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 0.001);
    let result = Planner::new(req, ALPHA).solve();
    assert_eq!(result.unwrap_err(), SolveError::ConstraintsInfeasible);
}

#[test]
fn overrunning_time_target_is_infeasible() {
    // Cruising at the entry velocity alone would cover the displacement in
    // S / v0 = 0.12s; a 1s target cannot be met without slowing below v0.
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 1.0).with_time_target(1.0);
    let result = Planner::new(req, ALPHA).solve();
    assert_eq!(result.unwrap_err(), SolveError::TimeTargetInfeasible);
}

#[test]
fn degenerate_requests_are_rejected() {
    let no_headroom = MotionRequest::new(8.33, 8.33, 500.0, 10000.0, 1.0);
    assert_eq!(
        Planner::new(no_headroom, ALPHA).solve().unwrap_err(),
        SolveError::ConstraintsInfeasible
    );

    let zero_displacement = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 0.0);
    assert_eq!(
        Planner::new(zero_displacement, ALPHA).solve().unwrap_err(),
        SolveError::ConstraintsInfeasible
    );
}

#[test]
fn solve_is_deterministic() {
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 1.0);
    let a = Planner::new(req, ALPHA).solve().unwrap();
    let b = Planner::new(req, ALPHA).solve().unwrap();

    assert_eq!(a.deltas().len(), b.deltas().len());
    for (x, y) in a.deltas().iter().zip(b.deltas()) {
        assert_eq!(x.to_bits(), y.to_bits(), "interval vectors differ between solves");
    }
}

#[test]
fn profile_metadata_reflects_the_solved_curve() {
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 10.0025);
    let profile = Planner::new(req, ALPHA).solve().unwrap();

    assert!(profile.total_time() > 0.0);
    assert!(profile.peak_velocity() > req.v0 && profile.peak_velocity() <= req.v);
    assert!(profile.peak_acceleration() > 0.0 && profile.peak_acceleration() <= req.a);

    // The last continuous segment ends at the requested displacement.
    let last = profile.segments().last().unwrap();
    assert!((last.se - req.s).abs() <= S_EPSILON);

    assert_eq!(ProfileKind::FullSCurve.to_string(), "Full S-Curve");
    assert_eq!(ProfileKind::PartialSCurve.to_string(), "Partial S-Curve");
}

#[test]
fn debug_dumps_do_not_disturb_the_result() {
    let quiet = Planner::new(MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 1.0), ALPHA)
        .solve()
        .unwrap();

    let config = SolverConfig {
        debug_bounds: true,
        debug_discretize: true,
        ..SolverConfig::default()
    };
    let loud = Planner::with_config(
        MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 1.0),
        ALPHA,
        config,
    )
    .solve()
    .unwrap();

    assert_eq!(quiet, loud);
}

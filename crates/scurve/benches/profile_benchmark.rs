use criterion::{black_box, criterion_group, criterion_main, Criterion};
use scurve::{MotionRequest, Planner};

fn benchmark_solve(c: &mut Criterion) {
    // A long move: 100 units at 400 steps/unit discretizes into ~40k
    // intervals, so this is dominated by the per-step Newton inversions.
    let long_move = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 100.005);

    c.bench_function("solve_long_move", |b| {
        b.iter(|| {
            let profile = Planner::new(black_box(long_move), black_box(400.0))
                .solve()
                .expect("benchmark move must solve");
            black_box(profile.total_steps())
        })
    });

    // A short move exercises the constraint bisection and the partial
    // fallback rather than step generation.
    let short_move = MotionRequest::new(8.33, 100.0, 20.0, 10000.0, 0.0125);

    c.bench_function("solve_short_move", |b| {
        b.iter(|| {
            let profile = Planner::new(black_box(short_move), black_box(400.0))
                .solve()
                .expect("benchmark move must solve");
            black_box(profile.total_steps())
        })
    });
}

criterion_group!(benches, benchmark_solve);
criterion_main!(benches);

//! Solves a motion request and prints the resulting profile, with the
//! diagnostic segment tables enabled.

use scurve::{MotionRequest, Planner, SolverConfig};

fn main() {
    // The diagnostic tables are emitted at debug level.
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let alpha = 400.0;
    let req = MotionRequest::new(8.33, 100.0, 500.0, 10000.0, 10.0).with_time_target(0.4);

    let config = SolverConfig {
        debug_bounds: true,
        debug_discretize: false,
        ..SolverConfig::default()
    };

    match Planner::with_config(req, alpha, config).solve() {
        Ok(profile) => {
            println!("kind:              {}", profile.kind());
            println!("segments:          {}", profile.segments().len());
            println!("total steps:       {}", profile.total_steps());
            println!("total time:        {:.6} s", profile.total_time());
            println!("peak velocity:     {:.4} units/s", profile.peak_velocity());
            println!("peak acceleration: {:.4} units/s^2", profile.peak_acceleration());

            let deltas = profile.deltas();
            println!(
                "first/last interval: {:.1} us / {:.1} us",
                deltas.first().unwrap() * 1e6,
                deltas.last().unwrap() * 1e6
            );
        }
        Err(e) => eprintln!("solve failed: {e}"),
    }
}

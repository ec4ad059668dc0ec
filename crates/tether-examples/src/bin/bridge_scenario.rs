use tether_core::{simulate, BridgeParams, TerminalMode};

fn main() {
    tracing_subscriber::fmt::init();

    // Tether pulled from the origin to (5, 3) with 100 segments of length 0.5
    let target: (f64, f64) = (5.0, 3.0);
    let delta = 0.5;
    let n_steps = 100;
    let seed = 123;

    println!("Bridge to ({}, {}) with {} steps of length {}", target.0, target.1, n_steps, delta);
    println!("Contour length: {}, chord length: {:.4}",
             delta * n_steps as f64, (target.0 * target.0 + target.1 * target.1).sqrt());
    println!();

    for terminal in [TerminalMode::Snap, TerminalMode::Redistribute] {
        let params = BridgeParams::new(target, delta, n_steps)
            .with_seed(seed)
            .with_terminal(terminal);

        let run = match simulate(&params) {
            Ok(run) => run,
            Err(err) => {
                eprintln!("{:?}: {}", terminal, err);
                continue;
            }
        };
        let report = run.validation();
        let trajectory = &run.trajectory;

        println!("{:?}:", terminal);
        println!("  points: {}", trajectory.len());
        println!("  step length: mean {:.9}, std {:.3e}, min {:.9}, max {:.9}",
                 report.all_steps.mean, report.all_steps.std, report.all_steps.min, report.all_steps.max);
        println!("  exact steps: {} of {}, max deviation {:.3e}",
                 trajectory.exact_steps(), trajectory.n_steps(), report.exact_steps.max_deviation(delta));
        println!("  endpoint error before correction: {:.6}", report.pre_correction_error);
        println!("  endpoint error after correction:  {:.3e}", report.all_steps.final_distance);
        if run.correction.applied() {
            println!("  correction weights: {:?}", run.correction.weights);
        }

        let mid = &trajectory[trajectory.len() / 2];
        println!("  midpoint: ({:.4}, {:.4})", mid.x(), mid.y());
        println!();
    }
}

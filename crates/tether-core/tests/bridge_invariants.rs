use tether_core::{
    generate_bridge, simulate, validate_exact, BridgeError, BridgeGenerator, BridgeParams,
    BridgeResult, Direction, DriftBlend, NoiseGenerator, Position, StepDirector, StepRuleKind,
    StepState, TerminalMode,
};

const STEP_TOL: f64 = 1e-9;
const END_TOL: f64 = 1e-12;

fn all_variants(params: &BridgeParams) -> Vec<BridgeParams> {
    let mut out = Vec::new();
    for rule in [StepRuleKind::DriftBlend, StepRuleKind::Projection] {
        for terminal in [TerminalMode::Snap, TerminalMode::Redistribute] {
            out.push(params.clone().with_rule(rule).with_terminal(terminal));
        }
    }
    out
}

#[test]
fn steps_outside_the_tail_have_length_delta() {
    let cases = [
        ((5.0, 3.0), 0.5, 100u32),
        ((1.0, 0.0), 0.1, 3),
        ((-2.0, 7.5), 0.25, 60),
        ((0.0, 0.0), 1.0, 20),
        ((40.0, 0.0), 0.1, 30),
    ];

    for (target, delta, n) in cases {
        for seed in 0..20u64 {
            let base = BridgeParams::new(target, delta, n).with_seed(seed);
            for params in all_variants(&base) {
                let run = simulate(&params).unwrap();
                let trajectory = &run.trajectory;
                assert_eq!(trajectory.len(), n as usize + 1);
                assert!(trajectory.approximate_tail() <= 5.min(n as usize));

                for (i, len) in trajectory.step_lengths().enumerate().take(trajectory.exact_steps()) {
                    assert!(
                        (len - delta).abs() < STEP_TOL,
                        "{:?}: step {} has length {} (delta {})",
                        params, i + 1, len, delta
                    );
                }

                let stats = validate_exact(trajectory, &params.target);
                assert!(stats.max_deviation(delta) < STEP_TOL);
            }
        }
    }
}

#[test]
fn every_run_ends_exactly_on_target() {
    for seed in 0..50u64 {
        let base = BridgeParams::new((3.3, -1.7), 0.3, 40).with_seed(seed);
        for params in all_variants(&base) {
            let run = simulate(&params).unwrap();
            let last = run.trajectory.final_point().unwrap();
            assert!(last.distance_to(&params.target) < END_TOL);
            assert_eq!(*run.trajectory.initial_point().unwrap(), Position::origin());
        }
    }
}

#[test]
fn degenerate_step_counts() {
    let zero = generate_bridge((2.0, 1.0), 0.5, 0, Some(1)).unwrap();
    assert_eq!(zero.points(), &[Position::origin()]);

    for terminal in [TerminalMode::Snap, TerminalMode::Redistribute] {
        let params = BridgeParams::new((2.0, 1.0), 0.5, 1).with_seed(1).with_terminal(terminal);
        let run = simulate(&params).unwrap();
        assert_eq!(run.trajectory.points(), &[Position::origin(), Position::new(2.0, 1.0)]);
    }
}

#[test]
fn invalid_parameters_are_rejected_before_stepping() {
    assert!(matches!(
        generate_bridge((1.0, 1.0), 0.0, 10, Some(1)),
        Err(BridgeError::InvalidParameter { name: "delta", .. })
    ));
    assert!(matches!(
        generate_bridge((1.0, 1.0), -1.0, 10, None),
        Err(BridgeError::InvalidParameter { name: "delta", .. })
    ));
    assert!(matches!(
        generate_bridge((f64::INFINITY, 1.0), 0.1, 10, None),
        Err(BridgeError::InvalidParameter { name: "target", .. })
    ));
}

#[test]
fn reference_scenario() {
    let trajectory = generate_bridge((5.0, 3.0), 0.5, 100, Some(123)).unwrap();
    assert_eq!(trajectory.len(), 101);
    assert_eq!(trajectory[0], Position::origin());
    assert!(trajectory[100].distance_to(&Position::new(5.0, 3.0)) < END_TOL);
    for len in trajectory.step_lengths().take(95) {
        assert!((len - 0.5).abs() < STEP_TOL);
    }

    let params = BridgeParams::new((5.0, 3.0), 0.5, 100)
        .with_seed(123)
        .with_terminal(TerminalMode::Redistribute);
    let run = simulate(&params).unwrap();
    let report = run.validation();
    assert!(report.pre_correction_error.is_finite());
    assert!(report.all_steps.final_distance < END_TOL);
    assert_eq!(report.all_steps.n_steps, 100);
    assert!((report.exact_steps.mean - 0.5).abs() < STEP_TOL);
}

#[test]
fn unseeded_runs_still_satisfy_invariants() {
    let trajectory = generate_bridge((1.0, 2.0), 0.2, 25, None).unwrap();
    assert_eq!(trajectory.len(), 26);
    assert!(trajectory.final_point().unwrap().distance_to(&Position::new(1.0, 2.0)) < END_TOL);
}

/// Delegates to the drift blend but reports a degenerate direction at one step.
struct DegenerateAt(u32);

impl StepDirector for DegenerateAt {
    fn direct(&self, state: &StepState, noise: &mut NoiseGenerator) -> BridgeResult<Direction> {
        if state.step == self.0 {
            return Err(BridgeError::DegenerateDirection { step: state.step, redraws: 8 });
        }
        DriftBlend.direct(state, noise)
    }
}

#[test]
fn degenerate_direction_aborts_the_run() {
    let params = BridgeParams::new((1.0, 1.0), 0.1, 20);
    let mut noise = NoiseGenerator::new(1);
    let err = BridgeGenerator::new(DegenerateAt(3)).run(&params, &mut noise).unwrap_err();
    assert!(matches!(err, BridgeError::DegenerateDirection { step: 3, redraws: 8 }));

    // A failure past the directed steps is never reached.
    let mut noise = NoiseGenerator::new(1);
    let run = BridgeGenerator::new(DegenerateAt(21)).run(&params, &mut noise).unwrap();
    assert_eq!(run.trajectory.len(), 21);
}

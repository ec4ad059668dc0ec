use tether_core::directors::drift_strength;
use tether_core::{simulate, BridgeParams, TerminalMode, MAX_DRIFT_STRENGTH};

#[test]
fn realized_strengths_never_exceed_clamp() {
    for seed in 0..30u64 {
        let params = BridgeParams::new((6.0, -2.0), 0.2, 50).with_seed(seed);
        let run = simulate(&params).unwrap();
        assert_eq!(run.drift_strengths.len(), 49);
        for s in &run.drift_strengths {
            assert!((0.0..=MAX_DRIFT_STRENGTH).contains(s), "strength {} out of range", s);
        }
    }
}

#[test]
fn out_of_reach_target_pins_strength_at_clamp() {
    // The target is 10 away but the whole contour is 2.5 long, so the naive
    // ratio exceeds 0.9 at every step.
    let params = BridgeParams::new((10.0, 0.0), 0.1, 25)
        .with_seed(5)
        .with_terminal(TerminalMode::Redistribute);
    let run = simulate(&params).unwrap();
    assert_eq!(run.drift_strengths.len(), 25);
    assert!(run.drift_strengths.iter().all(|&s| s == MAX_DRIFT_STRENGTH));
}

#[test]
fn naive_ratio_above_clamp_is_cut() {
    assert_eq!(drift_strength(5.0, 1.0, 5), MAX_DRIFT_STRENGTH);
    assert_eq!(drift_strength(4.6, 1.0, 5), MAX_DRIFT_STRENGTH);
    assert!(drift_strength(4.4, 1.0, 5) < MAX_DRIFT_STRENGTH);
}

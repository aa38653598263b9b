//! Determinism tests - the same scene always produces identical outputs

use forcefield_core::tests::test_helpers::{results_approx_equal, run_scene_source};

const COUPLED_SCENE: &str = r#"
particle a at (0.0, 0.0) velocity (1.0, 2.0) damping 0.95
particle b at (3.0, 0.0) mass 2.0 gravity (0.0, -9.8)
particle c at (1.5, 2.5) inverse_mass 0.5
spring a -> b k = 10.0 rest = 2.0
spring b -> a k = 10.0 rest = 2.0
spring b -> c k = 4.0 rest = 1.0
spring c -> b k = 4.0 rest = 1.0
attractor c -> a power = 25.0
attractor a -> (0.0, -5.0) power = -5.0
simulate dt = 0.01 steps = 1000
detect pa = position(a)
detect vb = velocity(b)
detect gap = distance(a, c)
"#;

#[test]
fn test_multiple_runs_determinism() {
    let results: Vec<_> = (0..5)
        .map(|_| run_scene_source(COUPLED_SCENE).expect("Run failed"))
        .collect();

    for i in 1..results.len() {
        assert!(
            results_approx_equal(&results[0], &results[i], 0.0),
            "Run {} should match run 0",
            i
        );
    }
}

#[test]
fn test_sequential_mode_determinism() {
    let source = COUPLED_SCENE.replace("steps = 1000", "steps = 1000 mode = sequential");
    let first = run_scene_source(&source).expect("First run failed");
    let second = run_scene_source(&source).expect("Second run failed");

    assert!(results_approx_equal(&first, &second, 0.0));
}

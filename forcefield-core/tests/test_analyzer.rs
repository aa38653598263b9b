//! Analyzer tests for scene validation

use forcefield_core::{analyze_scene, parse_scene, Diagnostics};

fn analyze(source: &str) -> Diagnostics {
    let scene = parse_scene(source).unwrap();
    analyze_scene(&scene)
}

fn has_error(diagnostics: &Diagnostics, needle: &str) -> bool {
    diagnostics.errors().any(|e| e.message.contains(needle))
}

#[test]
fn test_valid_scene_has_no_diagnostics() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0) damping 0.9 mass 2.0
particle b at (3.0, 0.0)
spring a -> b k = 4.0 rest = 2.0
spring b -> a k = 4.0 rest = 2.0
attractor a -> (0.0, 10.0) power = 50.0
simulate dt = 0.02 steps = 100
detect gap = distance(a, b)
"#,
    );
    assert!(diagnostics.is_empty(), "{:?}", diagnostics);
}

#[test]
fn test_duplicate_particle_names() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
particle a at (1.0, 0.0)
simulate dt = 0.02 steps = 1
"#,
    );
    assert!(has_error(&diagnostics, "duplicate particle name 'a'"));
}

#[test]
fn test_unknown_particle_in_generator_owner_and_anchor() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
spring ghost -> a k = 1.0 rest = 1.0
attractor a -> phantom power = 10.0
simulate dt = 0.02 steps = 1
"#,
    );
    assert!(has_error(&diagnostics, "unknown particle 'ghost' in spring owner"));
    assert!(has_error(&diagnostics, "unknown particle 'phantom' in attractor anchor"));
}

#[test]
fn test_unknown_particle_in_detector() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
simulate dt = 0.02 steps = 1
detect gap = distance(a, b)
"#,
    );
    assert!(has_error(&diagnostics, "unknown particle 'b' in detector 'gap'"));
}

#[test]
fn test_out_of_range_physical_parameters() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0) damping 1.5
particle b at (0.0, 0.0) mass 0.0
particle c at (0.0, 0.0) inverse_mass -2.0
spring a -> b k = 1.0 rest = -1.0
simulate dt = 0.0 steps = 1
"#,
    );
    assert!(has_error(&diagnostics, "damping of particle 'a'"));
    assert!(has_error(&diagnostics, "mass of particle 'b' must be positive"));
    assert!(has_error(&diagnostics, "inverse mass of particle 'c'"));
    assert!(has_error(&diagnostics, "rest length must be non-negative"));
    assert!(has_error(&diagnostics, "dt must be positive"));
}

#[test]
fn test_warnings_do_not_count_as_errors() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
spring a -> a k = 1.0 rest = 1.0
attractor a -> (1.0, 1.0) power = 0.0
simulate dt = 0.02 steps = 0
"#,
    );
    assert!(!diagnostics.has_errors());
    let warnings: Vec<_> = diagnostics.warnings().map(|w| w.message.clone()).collect();
    assert_eq!(warnings.len(), 3, "{:?}", warnings);
    assert!(warnings.iter().any(|w| w.contains("anchored to itself")));
    assert!(warnings.iter().any(|w| w.contains("zero power")));
    assert!(warnings.iter().any(|w| w.contains("zero steps")));
}

#[test]
fn test_duplicate_detector_names() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
simulate dt = 0.02 steps = 1
detect x = position(a)
detect x = speed(a)
"#,
    );
    assert!(has_error(&diagnostics, "duplicate detector name 'x'"));
}

#[test]
fn test_diagnostics_carry_line_spans() {
    let source = "particle a at (0.0, 0.0)\n\nspring a -> nobody k = 1.0 rest = 1.0\nsimulate dt = 0.02 steps = 1";
    let diagnostics = analyze(source);
    let error = diagnostics.errors().next().unwrap();

    let location = error.span.unwrap().location(source);
    assert_eq!(location.line, 3);
    assert!(error.render(source).contains("at line 3: spring a -> nobody"));
}

#[test]
fn test_non_finite_generator_parameters() {
    let diagnostics = analyze(
        r#"
particle a at (0.0, 0.0)
spring a -> (1.0, 0.0) k = inf rest = 0.5
spring a -> (1.0, 0.0) k = 1.0 rest = NaN
attractor a -> (5.0, 0.0) power = -inf
constant a force (NaN, 0.0)
simulate dt = 0.1 steps = 2
"#,
    );
    assert_eq!(diagnostics.errors().count(), 4, "{:?}", diagnostics);
    assert!(has_error(&diagnostics, "spring constant must be finite"));
    assert!(has_error(&diagnostics, "spring rest length must be finite"));
    assert!(has_error(&diagnostics, "attractor power must be finite"));
    assert!(has_error(&diagnostics, "constant force on 'a' must be finite"));
}

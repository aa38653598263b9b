//! Scene parser tests

use forcefield_core::ast::{AnchorDecl, DetectorKind, GeneratorDeclKind, MassDecl, StepMode};
use forcefield_core::diagnostics::format_parse_error;
use forcefield_core::parse_scene;
use glam::Vec2;

#[test]
fn test_parse_particle_defaults() {
    let scene = parse_scene(
        r#"
particle a at (1.0, -2.5)
simulate dt = 0.02 steps = 10
"#,
    )
    .unwrap();

    assert_eq!(scene.particles.len(), 1);
    let p = &scene.particles[0];
    assert_eq!(p.name, "a");
    assert_eq!(p.position, Vec2::new(1.0, -2.5));
    assert_eq!(p.velocity, Vec2::ZERO);
    assert_eq!(p.damping, 1.0);
    assert_eq!(p.mass, MassDecl::InverseMass(1.0));
    assert_eq!(p.gravity, Vec2::ZERO);
}

#[test]
fn test_parse_particle_options() {
    let scene = parse_scene(
        r#"
particle shell at (300, 0) velocity (-5.0, 0.0) damping 0.7 mass 0.001 gravity (-20.0, 0.0)
particle wall at (0.0, 0.0) inverse_mass = 0
simulate dt = 0.02 steps = 10
"#,
    )
    .unwrap();

    let shell = &scene.particles[0];
    assert_eq!(shell.position, Vec2::new(300.0, 0.0));
    assert_eq!(shell.velocity, Vec2::new(-5.0, 0.0));
    assert_eq!(shell.damping, 0.7);
    assert_eq!(shell.mass, MassDecl::Mass(0.001));
    assert_eq!(shell.gravity, Vec2::new(-20.0, 0.0));
    assert_eq!(scene.particles[1].mass, MassDecl::InverseMass(0.0));
}

#[test]
fn test_parse_generators() {
    let scene = parse_scene(
        r#"
particle a at (0.0, 0.0)
particle b at (5.0, 0.0)
spring a -> b k = 5.5 rest = 15.0
spring b -> (1.0, 2.0) k = 2.0 rest = 0.5 disabled
attractor a -> b power = -100.0
constant b force (0.0, -9.8)
simulate dt = 0.02 steps = 10
"#,
    )
    .unwrap();

    assert_eq!(scene.generators.len(), 4);

    let spring = &scene.generators[0];
    assert_eq!(spring.owner, "a");
    assert!(spring.enabled);
    match &spring.kind {
        GeneratorDeclKind::Spring { anchor, k, rest } => {
            assert_eq!(*anchor, AnchorDecl::Particle("b".to_string()));
            assert_eq!(*k, 5.5);
            assert_eq!(*rest, 15.0);
        }
        other => panic!("expected spring, got {:?}", other),
    }

    let fixed = &scene.generators[1];
    assert!(!fixed.enabled);
    assert_eq!(fixed.kind.anchor(), Some(&AnchorDecl::Point(Vec2::new(1.0, 2.0))));

    match &scene.generators[2].kind {
        GeneratorDeclKind::Attractor { power, .. } => assert_eq!(*power, -100.0),
        other => panic!("expected attractor, got {:?}", other),
    }
    match &scene.generators[3].kind {
        GeneratorDeclKind::Constant { force } => assert_eq!(*force, Vec2::new(0.0, -9.8)),
        other => panic!("expected constant, got {:?}", other),
    }
}

#[test]
fn test_parse_simulate_and_detectors() {
    let scene = parse_scene(
        r#"
# comment lines and blank lines are skipped

particle a at (0.0, 0.0)
particle b at (1.0, 0.0)
simulate dt = 0.01 steps = 300 mode = sequential
detect pa = position(a)
detect va = velocity(a)
detect sa = speed(a)
detect gap = distance(a, b)
"#,
    )
    .unwrap();

    assert_eq!(scene.simulate.dt, 0.01);
    assert_eq!(scene.simulate.steps, 300);
    assert_eq!(scene.simulate.mode, StepMode::Sequential);

    let kinds: Vec<_> = scene.detectors.iter().map(|d| d.kind.clone()).collect();
    assert_eq!(
        kinds,
        vec![
            DetectorKind::Position("a".to_string()),
            DetectorKind::Velocity("a".to_string()),
            DetectorKind::Speed("a".to_string()),
            DetectorKind::Distance {
                a: "a".to_string(),
                b: "b".to_string()
            },
        ]
    );
}

#[test]
fn test_default_mode_is_batch() {
    let scene = parse_scene("simulate dt = 0.02 steps = 1").unwrap();
    assert_eq!(scene.simulate.mode, StepMode::Batch);
}

#[test]
fn test_missing_simulate_is_an_error() {
    let err = parse_scene("particle a at (0.0, 0.0)").unwrap_err();
    assert!(err.to_string().contains("Missing 'simulate'"));
    assert!(err.span().is_none());
}

#[test]
fn test_duplicate_simulate_is_an_error() {
    let err = parse_scene("simulate dt = 0.02 steps = 1\nsimulate dt = 0.02 steps = 2").unwrap_err();
    assert!(err.to_string().contains("Duplicate 'simulate'"));
}

#[test]
fn test_unknown_keyword_reports_line() {
    let source = "particle a at (0.0, 0.0)\nwell a at (1.0, 1.0)\nsimulate dt = 0.02 steps = 1";
    let err = parse_scene(source).unwrap_err();

    assert!(err.to_string().contains("Unexpected token: well"));
    let rendered = format_parse_error(&err, source);
    assert!(rendered.contains("at line 2"), "{}", rendered);
}

#[test]
fn test_malformed_lines_are_rejected() {
    let cases = [
        "particle a (0.0, 0.0)",
        "particle a at (0.0)",
        "particle a at (0.0, 0.0) spin 3",
        "particle 1a at (0.0, 0.0)",
        "spring a -> b k = 1.0",
        "spring a b k = 1.0 rest = 1.0",
        "attractor a -> b",
        "constant a force up",
        "detect x = momentum(a)",
        "detect x = distance(a)",
        "simulate dt = 0.02 steps = -3",
        "simulate dt = 0.02 steps = 3 mode = parallel",
    ];

    for line in cases {
        let source = format!("{}\nsimulate dt = 0.02 steps = 1", line);
        assert!(parse_scene(&source).is_err(), "should reject: {}", line);
    }
}

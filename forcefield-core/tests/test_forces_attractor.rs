//! Unit tests for the inverse-square attractor

use forcefield_core::tests::test_helpers::{approx_eq_f32, approx_eq_vec2, approx_eq_vec2_rel, steps_for};
use forcefield_core::{AttractorForce, ForceGenerator, Particle, World, DEFAULT_FIXED_DT};
use glam::Vec2;

#[test]
fn test_attractor_pulls_toward_target() {
    let attractor = AttractorForce::new(Vec2::new(10.0, 0.0), 100.0);
    let force = attractor.force_at(Vec2::ZERO, Vec2::new(10.0, 0.0));

    // 100 / 10^2 = 1 toward +x
    assert!(approx_eq_vec2(force, Vec2::new(1.0, 0.0), 1e-6));
}

#[test]
fn test_attractor_falls_off_with_square_of_distance() {
    let attractor = AttractorForce::new(Vec2::ZERO, 50.0);
    let near = attractor.force_at(Vec2::new(0.0, 2.0), Vec2::ZERO).length();
    let far = attractor.force_at(Vec2::new(0.0, 4.0), Vec2::ZERO).length();

    assert!(approx_eq_f32(near / far, 4.0, 1e-5));
}

#[test]
fn test_attractor_sign_flips_direction() {
    let setup = |power: f32| {
        let mut world = World::new();
        let target = world.insert(Particle::new(Vec2::new(3.0, 4.0)));
        let a = world.insert(Particle::new(Vec2::ZERO));
        world.attach(a, AttractorForce::new(target, power)).unwrap();
        world.step(DEFAULT_FIXED_DT);
        world.get(a).unwrap().velocity
    };

    let attract = setup(25.0);
    let repel = setup(-25.0);
    let axis = Vec2::new(3.0, 4.0).normalize();

    assert!(attract.dot(axis) > 0.0);
    assert!(repel.dot(axis) < 0.0);
    assert!(approx_eq_vec2(attract, -repel, 1e-7));
}

#[test]
fn test_attractor_coincident_target_gives_zero_force() {
    let mut particle = Particle::new(Vec2::new(2.0, 2.0));
    let attractor = AttractorForce::new(Vec2::new(2.0, 2.0), 1000.0);
    particle.attach(attractor);

    assert_eq!(attractor.compute_force(&particle, &()), Vec2::ZERO);

    particle.advance_fixed_step(DEFAULT_FIXED_DT, &());
    assert!(particle.position.is_finite());
    assert_eq!(particle.velocity, Vec2::ZERO);
}

#[test]
fn test_attractor_toggle_follows_enabled_flag() {
    let mut world = World::new();
    let target = world.insert(Particle::new(Vec2::new(0.0, 10.0)));
    let a = world.insert(Particle::new(Vec2::ZERO));
    let id = world
        .attach_with(a, AttractorForce::new(target, 100.0), false)
        .unwrap();

    world.step(DEFAULT_FIXED_DT);
    assert_eq!(world.get(a).unwrap().velocity, Vec2::ZERO);

    // e.g. mouse button pressed
    world.set_enabled(a, id, true).unwrap();
    world.step(DEFAULT_FIXED_DT);
    assert!(world.get(a).unwrap().velocity.y > 0.0);

    world.set_enabled(a, id, false).unwrap();
    let before = world.get(a).unwrap().velocity;
    world.step(DEFAULT_FIXED_DT);
    assert_eq!(world.get(a).unwrap().velocity, before);
}

fn run_attractor_reference(particle: Particle, power: f32, duration: f32) -> Particle {
    let mut world = World::new();
    let a = world.insert(particle);
    let target = world.insert(Particle::new(Vec2::new(10.0, 0.0)));
    world.attach(a, AttractorForce::new(target, power)).unwrap();

    for _ in 0..steps_for(duration, DEFAULT_FIXED_DT) {
        world.step(DEFAULT_FIXED_DT);
    }
    world.remove(a).unwrap()
}

#[test]
fn test_attractor_reference_trajectories() {
    let start = Vec2::new(-10.0, 0.0);
    let cases = [
        (
            "attraction",
            Particle::new(start),
            100.0,
            Vec2::new(-8.86139, 0.0),
            Vec2::new(0.77936, 0.0),
        ),
        (
            "repulsion",
            Particle::new(start),
            -100.0,
            Vec2::new(-11.09801, 0.0),
            Vec2::new(-0.72400, 0.0),
        ),
        (
            "repulsion with damping and gravity",
            Particle::builder(start)
                .damping(0.75)
                .gravity(Vec2::ONE * 1.5)
                .build()
                .unwrap(),
            -100.0,
            Vec2::new(-5.80606, 5.17637),
            Vec2::new(2.41742, 3.08670),
        ),
    ];

    for (name, particle, power, position, velocity) in cases {
        let result = run_attractor_reference(particle, power, 3.0);
        assert!(
            approx_eq_vec2_rel(result.position, position, 1e-4),
            "{}: position {:?}, expected {:?}",
            name,
            result.position,
            position
        );
        assert!(
            approx_eq_vec2_rel(result.velocity, velocity, 1e-4),
            "{}: velocity {:?}, expected {:?}",
            name,
            result.velocity,
            velocity
        );
    }
}

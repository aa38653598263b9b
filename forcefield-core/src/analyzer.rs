//! Static checks on parsed scenes
//!
//! Catches mistakes before a world is built: bad references, out-of-range
//! physical parameters and suspicious wiring.

use crate::ast::{AnchorDecl, GeneratorDeclKind, MassDecl, Scene};
use crate::diagnostics::{Diagnostic, Diagnostics};
use std::collections::HashSet;

/// Analyze a scene and return diagnostics
pub fn analyze_scene(scene: &Scene) -> Diagnostics {
    let mut diagnostics = Diagnostics::new();

    let mut particle_names = HashSet::new();
    for particle in &scene.particles {
        if !particle_names.insert(particle.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                format!("duplicate particle name '{}'", particle.name),
                particle.span,
            ));
        }

        if !(0.0..=1.0).contains(&particle.damping) {
            diagnostics.push(Diagnostic::error(
                format!(
                    "damping of particle '{}' must be within [0, 1], got {}",
                    particle.name, particle.damping
                ),
                particle.span,
            ));
        }

        match particle.mass {
            MassDecl::Mass(m) if !(m.is_finite() && m > 0.0) => {
                diagnostics.push(Diagnostic::error(
                    format!("mass of particle '{}' must be positive, got {}", particle.name, m),
                    particle.span,
                ));
            }
            MassDecl::InverseMass(im) if !(im.is_finite() && im >= 0.0) => {
                diagnostics.push(Diagnostic::error(
                    format!(
                        "inverse mass of particle '{}' must be non-negative, got {}",
                        particle.name, im
                    ),
                    particle.span,
                ));
            }
            _ => {}
        }

        if !particle.position.is_finite()
            || !particle.velocity.is_finite()
            || !particle.gravity.is_finite()
        {
            diagnostics.push(Diagnostic::error(
                format!("particle '{}' has a non-finite vector", particle.name),
                particle.span,
            ));
        }
    }

    for generator in &scene.generators {
        let keyword = generator.kind.keyword();
        if !particle_names.contains(generator.owner.as_str()) {
            diagnostics.push(Diagnostic::error(
                format!("unknown particle '{}' in {} owner", generator.owner, keyword),
                generator.span,
            ));
        }

        match generator.kind.anchor() {
            Some(AnchorDecl::Particle(name)) => {
                if !particle_names.contains(name.as_str()) {
                    diagnostics.push(Diagnostic::error(
                        format!("unknown particle '{}' in {} anchor", name, keyword),
                        generator.span,
                    ));
                } else if *name == generator.owner {
                    diagnostics.push(Diagnostic::warning(
                        format!(
                            "{} on '{}' is anchored to itself and will never apply force",
                            keyword, generator.owner
                        ),
                        generator.span,
                    ));
                }
            }
            Some(AnchorDecl::Point(point)) if !point.is_finite() => {
                diagnostics.push(Diagnostic::error(
                    format!("{} anchor point must be finite", keyword),
                    generator.span,
                ));
            }
            _ => {}
        }

        match &generator.kind {
            GeneratorDeclKind::Spring { k, rest, .. } => {
                if !k.is_finite() {
                    diagnostics.push(Diagnostic::error(
                        format!("spring constant must be finite, got {}", k),
                        generator.span,
                    ));
                }
                if !rest.is_finite() {
                    diagnostics.push(Diagnostic::error(
                        format!("spring rest length must be finite, got {}", rest),
                        generator.span,
                    ));
                } else if *rest < 0.0 {
                    diagnostics.push(Diagnostic::error(
                        format!("spring rest length must be non-negative, got {}", rest),
                        generator.span,
                    ));
                }
            }
            GeneratorDeclKind::Attractor { power, .. } => {
                if !power.is_finite() {
                    diagnostics.push(Diagnostic::error(
                        format!("attractor power must be finite, got {}", power),
                        generator.span,
                    ));
                } else if *power == 0.0 {
                    diagnostics.push(Diagnostic::warning(
                        format!("attractor on '{}' has zero power", generator.owner),
                        generator.span,
                    ));
                }
            }
            GeneratorDeclKind::Constant { force } => {
                if !force.is_finite() {
                    diagnostics.push(Diagnostic::error(
                        format!("constant force on '{}' must be finite", generator.owner),
                        generator.span,
                    ));
                }
            }
        }
    }

    let simulate = &scene.simulate;
    if !(simulate.dt.is_finite() && simulate.dt > 0.0) {
        diagnostics.push(Diagnostic::error(
            format!("dt must be positive, got {}", simulate.dt),
            simulate.span,
        ));
    }
    if simulate.steps == 0 {
        diagnostics.push(Diagnostic::warning("simulation runs zero steps", simulate.span));
    }

    let mut detector_names = HashSet::new();
    for detector in &scene.detectors {
        if !detector_names.insert(detector.name.as_str()) {
            diagnostics.push(Diagnostic::error(
                format!("duplicate detector name '{}'", detector.name),
                detector.span,
            ));
        }
        for name in detector.kind.particles() {
            if !particle_names.contains(name) {
                diagnostics.push(Diagnostic::error(
                    format!("unknown particle '{}' in detector '{}'", name, detector.name),
                    detector.span,
                ));
            }
        }
    }

    diagnostics
}

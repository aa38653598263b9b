use crate::analyzer::analyze_scene;
use crate::ast::{AnchorDecl, DetectorKind, GeneratorDeclKind, MassDecl, Scene, StepMode};
use crate::diagnostics::Diagnostics;
use crate::engine::{ParticleHandle, World};
use crate::error::SimError;
use crate::force::{Anchor, AttractorForce, ConstantForce, ForceKind, SpringForce};
use crate::parser::{parse_scene, ParseError};
use crate::particle::{Particle, ParticleState};
use glam::Vec2;
use log::{debug, info};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Anything that can stop a scene from running
#[derive(Debug, Error)]
pub enum SceneError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("scene has {} error(s)", .0.errors().count())]
    Analysis(Diagnostics),
    #[error(transparent)]
    Sim(#[from] SimError),
    #[error("particle '{0}' not found")]
    UnknownParticle(String),
}

/// Value read by a detector
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectorValue {
    Scalar(f32),
    Vector(Vec2),
}

impl DetectorValue {
    pub fn as_scalar(&self) -> Option<f32> {
        match self {
            DetectorValue::Scalar(value) => Some(*value),
            DetectorValue::Vector(_) => None,
        }
    }

    pub fn as_vector(&self) -> Option<Vec2> {
        match self {
            DetectorValue::Vector(value) => Some(*value),
            DetectorValue::Scalar(_) => None,
        }
    }
}

impl fmt::Display for DetectorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectorValue::Scalar(value) => write!(f, "{}", value),
            DetectorValue::Vector(value) => write!(f, "({}, {})", value.x, value.y),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DetectorResult {
    pub name: String,
    pub value: DetectorValue,
}

/// Final result of running a scene
#[derive(Debug)]
pub struct SimulationResult {
    pub steps: usize,
    pub detectors: Vec<DetectorResult>,
}

impl SimulationResult {
    pub fn detector(&self, name: &str) -> Option<DetectorValue> {
        self.detectors
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value)
    }
}

/// A world built from a scene, with particle names resolved to handles
#[derive(Debug)]
pub struct SimulationContext {
    pub world: World,
    pub dt: f32,
    pub steps: usize,
    pub mode: StepMode,
    /// Declaration order
    names: Vec<(String, ParticleHandle)>,
    lookup: HashMap<String, ParticleHandle>,
    steps_taken: usize,
}

impl SimulationContext {
    pub fn handle(&self, name: &str) -> Option<ParticleHandle> {
        self.lookup.get(name).copied()
    }

    pub fn particle(&self, name: &str) -> Result<&Particle, SceneError> {
        let handle = self
            .handle(name)
            .ok_or_else(|| SceneError::UnknownParticle(name.to_string()))?;
        Ok(self.world.particle(handle)?)
    }

    pub fn steps_taken(&self) -> usize {
        self.steps_taken
    }

    /// Advance one fixed step in the configured mode.
    pub fn step(&mut self) -> Result<(), SceneError> {
        match self.mode {
            StepMode::Batch => self.world.step(self.dt),
            StepMode::Sequential => {
                for (_, handle) in &self.names {
                    self.world.advance_particle(*handle, self.dt)?;
                }
            }
        }
        self.steps_taken += 1;
        Ok(())
    }

    pub fn run(&mut self) -> Result<(), SceneError> {
        for _ in 0..self.steps {
            self.step()?;
        }
        Ok(())
    }
}

/// Named snapshot of one particle
#[derive(Debug, Clone)]
pub struct NamedState {
    pub name: String,
    pub state: ParticleState,
}

/// Main entry point: parse, check and run a scene
pub fn run_scene(source: &str) -> Result<SimulationResult, SceneError> {
    let scene = parse_scene(source)?;
    let mut ctx = build_simulation_context(&scene)?;
    ctx.run()?;
    info!("ran {} steps of dt={}", ctx.steps_taken(), ctx.dt);

    let detectors = evaluate_detectors(&scene, &ctx)?;
    Ok(SimulationResult {
        steps: ctx.steps_taken(),
        detectors,
    })
}

pub fn build_simulation_context_from_source(source: &str) -> Result<SimulationContext, SceneError> {
    let scene = parse_scene(source)?;
    build_simulation_context(&scene)
}

/// Analyze a scene and build its world. Analysis errors abort the build.
pub fn build_simulation_context(scene: &Scene) -> Result<SimulationContext, SceneError> {
    let diagnostics = analyze_scene(scene);
    if diagnostics.has_errors() {
        return Err(SceneError::Analysis(diagnostics));
    }
    for warning in diagnostics.warnings() {
        log::warn!("{}", warning);
    }

    let mut world = World::new();
    let mut names = Vec::with_capacity(scene.particles.len());
    let mut lookup = HashMap::new();

    for decl in &scene.particles {
        let builder = Particle::builder(decl.position)
            .velocity(decl.velocity)
            .damping(decl.damping)
            .gravity(decl.gravity);
        let builder = match decl.mass {
            MassDecl::Mass(m) => builder.mass(m),
            MassDecl::InverseMass(im) => builder.inverse_mass(im),
        };
        let handle = world.insert(builder.build()?);
        names.push((decl.name.clone(), handle));
        lookup.insert(decl.name.clone(), handle);
    }

    let resolve = |anchor: &AnchorDecl| -> Result<Anchor, SceneError> {
        match anchor {
            AnchorDecl::Particle(name) => lookup
                .get(name)
                .map(|h| Anchor::Particle(*h))
                .ok_or_else(|| SceneError::UnknownParticle(name.clone())),
            AnchorDecl::Point(point) => Ok(Anchor::Point(*point)),
        }
    };

    for decl in &scene.generators {
        let owner = *lookup
            .get(&decl.owner)
            .ok_or_else(|| SceneError::UnknownParticle(decl.owner.clone()))?;
        let kind: ForceKind = match &decl.kind {
            GeneratorDeclKind::Spring { anchor, k, rest } => {
                SpringForce::new(resolve(anchor)?, *k, *rest).into()
            }
            GeneratorDeclKind::Attractor { target, power } => {
                AttractorForce::new(resolve(target)?, *power).into()
            }
            GeneratorDeclKind::Constant { force } => ConstantForce::new(*force).into(),
        };
        world.attach_with(owner, kind, decl.enabled)?;
    }

    debug!(
        "built world with {} particles and {} generators",
        world.len(),
        scene.generators.len()
    );

    Ok(SimulationContext {
        world,
        dt: scene.simulate.dt,
        steps: scene.simulate.steps,
        mode: scene.simulate.mode,
        names,
        lookup,
        steps_taken: 0,
    })
}

/// Evaluate all detectors on the current world state
pub fn evaluate_detectors(
    scene: &Scene,
    ctx: &SimulationContext,
) -> Result<Vec<DetectorResult>, SceneError> {
    scene
        .detectors
        .iter()
        .map(|detector| {
            let value = match &detector.kind {
                DetectorKind::Position(name) => DetectorValue::Vector(ctx.particle(name)?.position),
                DetectorKind::Velocity(name) => DetectorValue::Vector(ctx.particle(name)?.velocity),
                DetectorKind::Speed(name) => {
                    DetectorValue::Scalar(ctx.particle(name)?.velocity.length())
                }
                DetectorKind::Distance { a, b } => {
                    let a = ctx.particle(a)?.position;
                    let b = ctx.particle(b)?.position;
                    DetectorValue::Scalar(a.distance(b))
                }
            };
            Ok(DetectorResult {
                name: detector.name.clone(),
                value,
            })
        })
        .collect()
}

/// Current state of every particle, in declaration order
pub fn get_particle_states(ctx: &SimulationContext) -> Vec<NamedState> {
    ctx.names
        .iter()
        .filter_map(|(name, handle)| {
            ctx.world.get(*handle).map(|particle| NamedState {
                name: name.clone(),
                state: particle.state(),
            })
        })
        .collect()
}

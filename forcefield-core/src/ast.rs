use crate::diagnostics::Span;
use glam::Vec2;

/// A parsed scene file
#[derive(Debug, Clone)]
pub struct Scene {
    pub particles: Vec<ParticleDecl>,
    pub generators: Vec<GeneratorDecl>,
    pub simulate: SimulateDecl,
    pub detectors: Vec<DetectorDecl>,
}

/// `particle name at (x, y) [velocity (x, y)] [damping d] [mass m | inverse_mass im] [gravity (x, y)]`
#[derive(Debug, Clone)]
pub struct ParticleDecl {
    pub name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damping: f32,
    pub mass: MassDecl,
    pub gravity: Vec2,
    pub span: Option<Span>,
}

/// How a particle's mass was written
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MassDecl {
    Mass(f32),
    InverseMass(f32),
}

/// `spring a -> b k = .. rest = ..`, `attractor a -> (x, y) power = ..`, `constant a force (x, y)`
#[derive(Debug, Clone)]
pub struct GeneratorDecl {
    pub owner: String,
    pub kind: GeneratorDeclKind,
    pub enabled: bool,
    pub span: Option<Span>,
}

#[derive(Debug, Clone)]
pub enum GeneratorDeclKind {
    Spring {
        anchor: AnchorDecl,
        k: f32,
        rest: f32,
    },
    Attractor {
        target: AnchorDecl,
        power: f32,
    },
    Constant {
        force: Vec2,
    },
}

impl GeneratorDeclKind {
    pub fn keyword(&self) -> &'static str {
        match self {
            GeneratorDeclKind::Spring { .. } => "spring",
            GeneratorDeclKind::Attractor { .. } => "attractor",
            GeneratorDeclKind::Constant { .. } => "constant",
        }
    }

    pub fn anchor(&self) -> Option<&AnchorDecl> {
        match self {
            GeneratorDeclKind::Spring { anchor, .. } => Some(anchor),
            GeneratorDeclKind::Attractor { target, .. } => Some(target),
            GeneratorDeclKind::Constant { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnchorDecl {
    Particle(String),
    Point(Vec2),
}

/// Order in which particles advance within one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StepMode {
    /// Compute all forces, then integrate all particles.
    #[default]
    Batch,
    /// Advance particles one after another in declaration order.
    Sequential,
}

/// `simulate dt = x steps = n [mode = batch|sequential]`
#[derive(Debug, Clone)]
pub struct SimulateDecl {
    pub dt: f32,
    pub steps: usize,
    pub mode: StepMode,
    pub span: Option<Span>,
}

/// `detect name = kind(...)`
#[derive(Debug, Clone)]
pub struct DetectorDecl {
    pub name: String,
    pub kind: DetectorKind,
    pub span: Option<Span>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetectorKind {
    Position(String),
    Velocity(String),
    Speed(String),
    Distance { a: String, b: String },
}

impl DetectorKind {
    pub fn particles(&self) -> Vec<&str> {
        match self {
            DetectorKind::Position(name)
            | DetectorKind::Velocity(name)
            | DetectorKind::Speed(name) => vec![name.as_str()],
            DetectorKind::Distance { a, b } => vec![a.as_str(), b.as_str()],
        }
    }
}

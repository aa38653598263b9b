//! Force generators
//!
//! A generator is attached to one owner particle and, each step, yields a
//! force for that particle's accumulator. Anchors and targets are read through
//! a [`PositionSource`], so a generator never holds on to another particle.

use crate::engine::ParticleHandle;
use crate::particle::Particle;
use glam::Vec2;
use std::fmt;

/// Positions of other particles, looked up by handle.
pub trait PositionSource {
    /// `None` when the handle no longer refers to a live particle.
    fn position_of(&self, handle: ParticleHandle) -> Option<Vec2>;
}

/// No other particles. Only fixed-point anchors resolve.
impl PositionSource for () {
    fn position_of(&self, _handle: ParticleHandle) -> Option<Vec2> {
        None
    }
}

/// Where a spring is anchored or an attractor points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Anchor {
    Particle(ParticleHandle),
    Point(Vec2),
}

impl Anchor {
    pub fn resolve(&self, positions: &dyn PositionSource) -> Option<Vec2> {
        match self {
            Anchor::Particle(handle) => positions.position_of(*handle),
            Anchor::Point(point) => Some(*point),
        }
    }
}

impl From<ParticleHandle> for Anchor {
    fn from(handle: ParticleHandle) -> Self {
        Anchor::Particle(handle)
    }
}

impl From<Vec2> for Anchor {
    fn from(point: Vec2) -> Self {
        Anchor::Point(point)
    }
}

/// Computes the force one generator applies to its owner this step.
pub trait ForceGenerator {
    fn compute_force(&self, particle: &Particle, positions: &dyn PositionSource) -> Vec2;
}

/// Hookean spring between the owner and an anchor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringForce {
    pub anchor: Anchor,
    pub spring_constant: f32,
    pub rest_length: f32,
}

impl SpringForce {
    pub fn new(anchor: impl Into<Anchor>, spring_constant: f32, rest_length: f32) -> Self {
        Self {
            anchor: anchor.into(),
            spring_constant,
            rest_length,
        }
    }

    /// Spring force on a particle at `position` from an anchor at `anchor`.
    pub fn force_at(&self, position: Vec2, anchor: Vec2) -> Vec2 {
        let offset = position - anchor;
        let length = offset.length();
        if length <= 0.0 {
            // Coincident endpoints have no direction.
            return Vec2::ZERO;
        }
        let stretch = length - self.rest_length;
        let direction = offset / length;
        direction * (-self.spring_constant * stretch)
    }
}

impl ForceGenerator for SpringForce {
    fn compute_force(&self, particle: &Particle, positions: &dyn PositionSource) -> Vec2 {
        match self.anchor.resolve(positions) {
            Some(anchor) => self.force_at(particle.position, anchor),
            None => Vec2::ZERO,
        }
    }
}

/// Inverse-square pull toward a target; negative `power` repels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttractorForce {
    pub target: Anchor,
    pub power: f32,
}

impl AttractorForce {
    pub fn new(target: impl Into<Anchor>, power: f32) -> Self {
        Self {
            target: target.into(),
            power,
        }
    }

    pub fn force_at(&self, position: Vec2, target: Vec2) -> Vec2 {
        let offset = target - position;
        let dist_sqr = offset.length_squared();
        if dist_sqr <= 0.0 {
            return Vec2::ZERO;
        }
        let direction = offset / dist_sqr.sqrt();
        direction * self.power / dist_sqr
    }
}

impl ForceGenerator for AttractorForce {
    fn compute_force(&self, particle: &Particle, positions: &dyn PositionSource) -> Vec2 {
        match self.target.resolve(positions) {
            Some(target) => self.force_at(particle.position, target),
            None => Vec2::ZERO,
        }
    }
}

/// The same force every step, e.g. thrust or wind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstantForce {
    pub force: Vec2,
}

impl ConstantForce {
    pub fn new(force: Vec2) -> Self {
        Self { force }
    }
}

impl ForceGenerator for ConstantForce {
    fn compute_force(&self, _particle: &Particle, _positions: &dyn PositionSource) -> Vec2 {
        self.force
    }
}

/// Every generator variant a particle can carry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ForceKind {
    Spring(SpringForce),
    Attractor(AttractorForce),
    Constant(ConstantForce),
}

impl ForceKind {
    /// The particle this generator reads, if any.
    pub fn anchor_handle(&self) -> Option<ParticleHandle> {
        let anchor = match self {
            ForceKind::Spring(spring) => spring.anchor,
            ForceKind::Attractor(attractor) => attractor.target,
            ForceKind::Constant(_) => return None,
        };
        match anchor {
            Anchor::Particle(handle) => Some(handle),
            Anchor::Point(_) => None,
        }
    }
}

impl ForceGenerator for ForceKind {
    fn compute_force(&self, particle: &Particle, positions: &dyn PositionSource) -> Vec2 {
        match self {
            ForceKind::Spring(spring) => spring.compute_force(particle, positions),
            ForceKind::Attractor(attractor) => attractor.compute_force(particle, positions),
            ForceKind::Constant(constant) => constant.compute_force(particle, positions),
        }
    }
}

impl From<SpringForce> for ForceKind {
    fn from(spring: SpringForce) -> Self {
        ForceKind::Spring(spring)
    }
}

impl From<AttractorForce> for ForceKind {
    fn from(attractor: AttractorForce) -> Self {
        ForceKind::Attractor(attractor)
    }
}

impl From<ConstantForce> for ForceKind {
    fn from(constant: ConstantForce) -> Self {
        ForceKind::Constant(constant)
    }
}

/// Identifies a generator on its owner particle. Ids are never reused by the
/// same particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorId(pub(crate) u32);

impl fmt::Display for GeneratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A generator attached to a particle, with its on/off switch.
#[derive(Debug, Clone)]
pub struct Generator {
    id: GeneratorId,
    pub enabled: bool,
    pub kind: ForceKind,
}

impl Generator {
    pub(crate) fn new(id: GeneratorId, kind: ForceKind, enabled: bool) -> Self {
        Self { id, enabled, kind }
    }

    pub fn id(&self) -> GeneratorId {
        self.id
    }
}

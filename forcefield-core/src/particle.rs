use crate::error::SimError;
use crate::force::{ForceGenerator, ForceKind, Generator, GeneratorId, PositionSource};
use crate::integrator::integrate;
use glam::Vec2;

/// A point mass driven by force generators.
///
/// Kinematic fields are public so drivers can read them back (and spawners can
/// tweak them between steps). The force accumulator is only reachable through
/// [`Particle::add_force`] and [`Particle::clear_forces`].
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Acceleration derived during the last integration.
    pub acceleration: Vec2,
    /// Constant per-particle acceleration field.
    pub gravity: Vec2,
    /// Fraction of velocity retained per unit time, applied as `damping^dt`.
    pub damping: f32,
    /// Zero means immovable.
    pub inverse_mass: f32,
    pub(crate) accumulated_force: Vec2,
    generators: Vec<Generator>,
    next_generator_id: u32,
}

impl Particle {
    /// A particle at rest with unit inverse mass, no damping and no gravity.
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            acceleration: Vec2::ZERO,
            gravity: Vec2::ZERO,
            damping: 1.0,
            inverse_mass: 1.0,
            accumulated_force: Vec2::ZERO,
            generators: Vec::new(),
            next_generator_id: 0,
        }
    }

    pub fn builder(position: Vec2) -> ParticleBuilder {
        ParticleBuilder::new(position)
    }

    pub fn add_force(&mut self, force: Vec2) {
        self.accumulated_force += force;
    }

    pub fn clear_forces(&mut self) {
        self.accumulated_force = Vec2::ZERO;
    }

    pub fn accumulated_force(&self) -> Vec2 {
        self.accumulated_force
    }

    pub fn mass(&self) -> f32 {
        if self.inverse_mass > 0.0 {
            1.0 / self.inverse_mass
        } else {
            f32::INFINITY
        }
    }

    pub fn is_immovable(&self) -> bool {
        self.inverse_mass == 0.0
    }

    /// Attach an enabled generator and return its id.
    pub fn attach(&mut self, kind: impl Into<ForceKind>) -> GeneratorId {
        self.attach_with(kind, true)
    }

    pub fn attach_with(&mut self, kind: impl Into<ForceKind>, enabled: bool) -> GeneratorId {
        let id = GeneratorId(self.next_generator_id);
        self.next_generator_id += 1;
        self.generators.push(Generator::new(id, kind.into(), enabled));
        id
    }

    pub fn detach(&mut self, id: GeneratorId) -> Result<ForceKind, SimError> {
        let index = self
            .generators
            .iter()
            .position(|g| g.id() == id)
            .ok_or(SimError::UnknownGenerator(id))?;
        Ok(self.generators.remove(index).kind)
    }

    pub fn generators(&self) -> &[Generator] {
        &self.generators
    }

    pub fn generator(&self, id: GeneratorId) -> Option<&Generator> {
        self.generators.iter().find(|g| g.id() == id)
    }

    pub fn generator_mut(&mut self, id: GeneratorId) -> Option<&mut Generator> {
        self.generators.iter_mut().find(|g| g.id() == id)
    }

    pub fn set_generator_enabled(&mut self, id: GeneratorId, enabled: bool) -> Result<(), SimError> {
        let generator = self
            .generator_mut(id)
            .ok_or(SimError::UnknownGenerator(id))?;
        generator.enabled = enabled;
        Ok(())
    }

    /// Sum of what the enabled generators would contribute right now, without
    /// touching the accumulator.
    pub fn generator_force(&self, positions: &dyn PositionSource) -> Vec2 {
        self.generators
            .iter()
            .filter(|g| g.enabled)
            .fold(Vec2::ZERO, |total, g| total + g.kind.compute_force(self, positions))
    }

    /// Run every enabled generator and add each result to the accumulator.
    /// Disabled generators are not evaluated at all.
    pub fn accumulate_forces(&mut self, positions: &dyn PositionSource) {
        let generators = std::mem::take(&mut self.generators);
        for generator in generators.iter().filter(|g| g.enabled) {
            let force = generator.kind.compute_force(self, positions);
            self.add_force(force);
        }
        self.generators = generators;
    }

    /// Accumulate, integrate, clear.
    ///
    /// Anchors are resolved through `positions`. For coupled particles the
    /// caller decides whether those are pre-step snapshots (see
    /// [`crate::World::step`]) or live positions.
    pub fn advance_fixed_step(&mut self, dt: f32, positions: &dyn PositionSource) {
        self.accumulate_forces(positions);
        integrate(self, dt);
        self.clear_forces();
    }

    pub fn state(&self) -> ParticleState {
        ParticleState {
            position: self.position,
            velocity: self.velocity,
            acceleration: self.acceleration,
        }
    }
}

/// Read-only kinematic view of a particle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleState {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
}

/// Validated construction of a [`Particle`].
///
/// ```
/// use forcefield_core::Particle;
/// use glam::Vec2;
///
/// let particle = Particle::builder(Vec2::new(300.0, 0.0))
///     .velocity(Vec2::new(-5.0, 0.0))
///     .mass(0.25)
///     .damping(0.7)
///     .gravity(Vec2::new(-20.0, 0.0))
///     .build()
///     .unwrap();
/// assert_eq!(particle.inverse_mass, 4.0);
/// ```
#[derive(Debug, Clone)]
pub struct ParticleBuilder {
    position: Vec2,
    velocity: Vec2,
    gravity: Vec2,
    damping: f32,
    mass: Mass,
}

#[derive(Debug, Clone, Copy)]
enum Mass {
    Inverse(f32),
    Direct(f32),
}

impl ParticleBuilder {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            gravity: Vec2::ZERO,
            damping: 1.0,
            mass: Mass::Inverse(1.0),
        }
    }

    pub fn velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn gravity(mut self, gravity: Vec2) -> Self {
        self.gravity = gravity;
        self
    }

    pub fn damping(mut self, damping: f32) -> Self {
        self.damping = damping;
        self
    }

    pub fn inverse_mass(mut self, inverse_mass: f32) -> Self {
        self.mass = Mass::Inverse(inverse_mass);
        self
    }

    /// Sets `inverse_mass = 1 / mass`.
    pub fn mass(mut self, mass: f32) -> Self {
        self.mass = Mass::Direct(mass);
        self
    }

    pub fn build(self) -> Result<Particle, SimError> {
        let inverse_mass = match self.mass {
            Mass::Inverse(im) if im.is_finite() && im >= 0.0 => im,
            Mass::Inverse(im) => return Err(SimError::InvalidInverseMass(im)),
            Mass::Direct(m) if m.is_finite() && m > 0.0 => 1.0 / m,
            Mass::Direct(m) => return Err(SimError::InvalidMass(m)),
        };
        if !(0.0..=1.0).contains(&self.damping) {
            return Err(SimError::InvalidDamping(self.damping));
        }
        if !self.position.is_finite() {
            return Err(SimError::NonFiniteState { field: "position" });
        }
        if !self.velocity.is_finite() {
            return Err(SimError::NonFiniteState { field: "velocity" });
        }
        if !self.gravity.is_finite() {
            return Err(SimError::NonFiniteState { field: "gravity" });
        }

        let mut particle = Particle::new(self.position);
        particle.velocity = self.velocity;
        particle.gravity = self.gravity;
        particle.damping = self.damping;
        particle.inverse_mass = inverse_mass;
        Ok(particle)
    }
}

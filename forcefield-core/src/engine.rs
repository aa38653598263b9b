use crate::error::SimError;
use crate::force::{ForceKind, GeneratorId, PositionSource, SpringForce};
use crate::integrator::integrate;
use crate::particle::{Particle, ParticleState};
use glam::Vec2;
use log::{debug, trace, warn};
use std::fmt;

/// Generational index of a particle in a [`World`].
///
/// A handle outlives the particle it names without dangling: once the slot is
/// reused the generation no longer matches and lookups return `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParticleHandle {
    index: u32,
    generation: u32,
}

impl ParticleHandle {
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

impl fmt::Display for ParticleHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    particle: Option<Particle>,
}

/// Positions of every live particle, frozen at one instant.
#[derive(Debug, Clone, Default)]
pub struct PositionSnapshot {
    entries: Vec<Option<(u32, Vec2)>>,
}

impl PositionSource for PositionSnapshot {
    fn position_of(&self, handle: ParticleHandle) -> Option<Vec2> {
        match self.entries.get(handle.index())? {
            Some((generation, position)) if *generation == handle.generation => Some(*position),
            _ => None,
        }
    }
}

/// The particle arena and step driver
#[derive(Debug, Default, Clone)]
pub struct World {
    slots: Vec<Slot>,
    free: Vec<u32>,
    len: usize,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn insert(&mut self, particle: Particle) -> ParticleHandle {
        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.particle = Some(particle);
                ParticleHandle {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    particle: Some(particle),
                });
                ParticleHandle {
                    index,
                    generation: 0,
                }
            }
        };
        self.len += 1;
        debug!("inserted particle {}", handle);
        handle
    }

    /// Remove a particle along with its generators. Generators on other
    /// particles that anchor to it go inert.
    pub fn remove(&mut self, handle: ParticleHandle) -> Option<Particle> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        let particle = slot.particle.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        debug!("removed particle {}", handle);
        Some(particle)
    }

    pub fn contains(&self, handle: ParticleHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn get(&self, handle: ParticleHandle) -> Option<&Particle> {
        let slot = self.slots.get(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.particle.as_ref()
    }

    pub fn get_mut(&mut self, handle: ParticleHandle) -> Option<&mut Particle> {
        let slot = self.slots.get_mut(handle.index())?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.particle.as_mut()
    }

    pub fn particle(&self, handle: ParticleHandle) -> Result<&Particle, SimError> {
        self.get(handle).ok_or(SimError::StaleHandle(handle))
    }

    pub fn particle_mut(&mut self, handle: ParticleHandle) -> Result<&mut Particle, SimError> {
        self.get_mut(handle).ok_or(SimError::StaleHandle(handle))
    }

    /// Live particles in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (ParticleHandle, &Particle)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.particle.as_ref().map(|particle| {
                (
                    ParticleHandle {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    particle,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParticleHandle, &mut Particle)> {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.particle.as_mut().map(|particle| {
                (
                    ParticleHandle {
                        index: index as u32,
                        generation,
                    },
                    particle,
                )
            })
        })
    }

    pub fn handles(&self) -> Vec<ParticleHandle> {
        self.iter().map(|(handle, _)| handle).collect()
    }

    pub fn attach(
        &mut self,
        owner: ParticleHandle,
        kind: impl Into<ForceKind>,
    ) -> Result<GeneratorId, SimError> {
        let id = self.particle_mut(owner)?.attach(kind);
        debug!("attached generator {} to particle {}", id, owner);
        Ok(id)
    }

    pub fn attach_with(
        &mut self,
        owner: ParticleHandle,
        kind: impl Into<ForceKind>,
        enabled: bool,
    ) -> Result<GeneratorId, SimError> {
        let id = self.particle_mut(owner)?.attach_with(kind, enabled);
        debug!(
            "attached generator {} to particle {} (enabled: {})",
            id, owner, enabled
        );
        Ok(id)
    }

    pub fn detach(&mut self, owner: ParticleHandle, id: GeneratorId) -> Result<ForceKind, SimError> {
        let kind = self.particle_mut(owner)?.detach(id)?;
        debug!("detached generator {} from particle {}", id, owner);
        Ok(kind)
    }

    pub fn set_enabled(
        &mut self,
        owner: ParticleHandle,
        id: GeneratorId,
        enabled: bool,
    ) -> Result<(), SimError> {
        self.particle_mut(owner)?.set_generator_enabled(id, enabled)
    }

    /// Link two particles with one spring each, so both feel the pull.
    pub fn link_spring(
        &mut self,
        a: ParticleHandle,
        b: ParticleHandle,
        spring_constant: f32,
        rest_length: f32,
    ) -> Result<(GeneratorId, GeneratorId), SimError> {
        // Validate both ends before attaching anything.
        self.particle(a)?;
        self.particle(b)?;
        let on_a = self.attach(a, SpringForce::new(b, spring_constant, rest_length))?;
        let on_b = self.attach(b, SpringForce::new(a, spring_constant, rest_length))?;
        Ok((on_a, on_b))
    }

    pub fn snapshot_positions(&self) -> PositionSnapshot {
        PositionSnapshot {
            entries: self
                .slots
                .iter()
                .map(|slot| {
                    slot.particle
                        .as_ref()
                        .map(|particle| (slot.generation, particle.position))
                })
                .collect(),
        }
    }

    /// Force the enabled generators would put on `handle` right now.
    pub fn net_force(&self, handle: ParticleHandle) -> Option<Vec2> {
        Some(self.get(handle)?.generator_force(self))
    }

    /// Phase one: every particle accumulates forces from the same pre-step
    /// snapshot.
    pub fn compute_forces(&mut self) {
        let snapshot = self.snapshot_positions();
        for (_, particle) in self.iter_mut() {
            particle.accumulate_forces(&snapshot);
        }
    }

    /// Phase two.
    pub fn integrate_all(&mut self, dt: f32) {
        for (_, particle) in self.iter_mut() {
            integrate(particle, dt);
        }
    }

    /// Phase three.
    pub fn clear_all_forces(&mut self) {
        for (_, particle) in self.iter_mut() {
            particle.clear_forces();
        }
    }

    /// Advance every particle by one fixed step.
    ///
    /// Forces for the whole batch are computed before anyone integrates, so the
    /// result does not depend on particle order.
    pub fn step(&mut self, dt: f32) {
        trace!("step dt={} particles={}", dt, self.len);
        self.compute_forces();
        self.integrate_all(dt);
        self.clear_all_forces();
    }

    /// Advance a single particle, reading anchors from the world as it is now.
    ///
    /// Calling this for each particle in turn is a sequential update: later
    /// particles see earlier ones already moved. Use [`World::step`] for
    /// coupled systems.
    pub fn advance_particle(&mut self, handle: ParticleHandle, dt: f32) -> Result<(), SimError> {
        let force = match self.get(handle) {
            Some(particle) => particle.generator_force(self),
            None => {
                warn!("advance_particle called with stale handle {}", handle);
                return Err(SimError::StaleHandle(handle));
            }
        };
        let particle = self.particle_mut(handle)?;
        particle.add_force(force);
        integrate(particle, dt);
        particle.clear_forces();
        Ok(())
    }

    pub fn states(&self) -> Vec<(ParticleHandle, ParticleState)> {
        self.iter()
            .map(|(handle, particle)| (handle, particle.state()))
            .collect()
    }
}

impl PositionSource for World {
    fn position_of(&self, handle: ParticleHandle) -> Option<Vec2> {
        self.get(handle).map(|particle| particle.position)
    }
}

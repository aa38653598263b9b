use crate::engine::ParticleHandle;
use crate::force::GeneratorId;
use thiserror::Error;

/// Errors raised at the simulation API boundary.
///
/// Stepping never produces these; they come from building particles or
/// addressing particles and generators that no longer exist.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    #[error("inverse mass must be finite and non-negative, got {0}")]
    InvalidInverseMass(f32),
    #[error("mass must be finite and positive, got {0}")]
    InvalidMass(f32),
    #[error("damping must be within [0, 1], got {0}")]
    InvalidDamping(f32),
    #[error("fixed timestep must be finite and positive, got {0}")]
    InvalidTimestep(f32),
    #[error("{field} must be finite")]
    NonFiniteState { field: &'static str },
    #[error("particle handle {0} is stale or was never issued")]
    StaleHandle(ParticleHandle),
    #[error("no generator with id {0} is attached to this particle")]
    UnknownGenerator(GeneratorId),
}

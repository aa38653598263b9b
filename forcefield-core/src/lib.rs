//! Fixed-step 2D particle dynamics.
//!
//! Particles carry force generators (springs, inverse-square attractors,
//! constant forces). Each fixed step accumulates their forces, integrates with
//! semi-implicit Euler and clears the accumulator.

pub mod analyzer;
pub mod ast;
pub mod clock;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod force;
pub mod integrator;
pub mod parser;
pub mod particle;
pub mod runtime;

pub use analyzer::analyze_scene;
pub use clock::{FixedTimestep, DEFAULT_FIXED_DT};
pub use diagnostics::{Diagnostic, DiagnosticSeverity, Diagnostics, SourceLocation, Span};
pub use engine::{ParticleHandle, PositionSnapshot, World};
pub use error::SimError;
pub use force::{
    Anchor, AttractorForce, ConstantForce, ForceGenerator, ForceKind, Generator, GeneratorId,
    PositionSource, SpringForce,
};
pub use integrator::integrate;
pub use parser::{parse_scene, ParseError};
pub use particle::{Particle, ParticleBuilder, ParticleState};
pub use runtime::{
    build_simulation_context, build_simulation_context_from_source, get_particle_states,
    run_scene, DetectorResult, DetectorValue, NamedState, SceneError, SimulationContext,
    SimulationResult,
};

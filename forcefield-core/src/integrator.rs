use crate::particle::Particle;

/// Advance one particle by `dt` using semi-implicit Euler.
///
/// Position moves with the velocity from before this call; the new velocity
/// only shows up in position next step. Damping decays velocity by
/// `damping^dt`, so the decay rate does not depend on the step size.
///
/// The accumulator is read but left alone; clearing it is the caller's job.
pub fn integrate(particle: &mut Particle, dt: f32) {
    particle.position += particle.velocity * dt;

    particle.acceleration = particle.accumulated_force * particle.inverse_mass + particle.gravity;

    particle.velocity += particle.acceleration * dt;
    particle.velocity *= particle.damping.powf(dt);
}

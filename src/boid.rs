use glam::{EulerRot, Quat, Vec3};
use rand::rngs::StdRng;
use rand::Rng;

use crate::config::SwarmConfig;

/// One flock member. The force fields hold the per-rule contributions from
/// the most recent tick and stay readable until the next one.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Boid {
    pub position: Vec3,
    pub forward: Vec3,
    pub velocity: Vec3,
    pub separation: Vec3,
    pub cohesion: Vec3,
    pub alignment: Vec3,
    pub wander: Vec3,
    pub obstacle: Vec3,
    pub total_force: Vec3,
}

impl Boid {
    pub(crate) fn reset_forces(&mut self) {
        self.separation = Vec3::ZERO;
        self.cohesion = Vec3::ZERO;
        self.alignment = Vec3::ZERO;
        self.wander = Vec3::ZERO;
        self.obstacle = Vec3::ZERO;
        self.total_force = Vec3::ZERO;
    }
}

pub(crate) fn spawn_flock(config: &SwarmConfig, rng: &mut StdRng) -> Vec<Boid> {
    (0..config.number_of_boids)
        .map(|_| spawn_boid(config, rng))
        .collect()
}

fn spawn_boid(config: &SwarmConfig, rng: &mut StdRng) -> Boid {
    // Cube root of the radius sample keeps placement volumetric-uniform
    // inside the spawn ball.
    let distance = if config.initialization_radius > 0.0 {
        rng.random_range(0.0..config.initialization_radius).cbrt()
    } else {
        0.0
    };
    let position = config.spawn_origin + random_rotation(rng, 0.0, 360.0) * Vec3::Z * distance;

    let spread = config.initialization_forward_random_range * 0.5;
    let forward = random_rotation(rng, -spread, spread) * Vec3::Z;

    Boid {
        position,
        forward,
        velocity: forward.normalize_or_zero(),
        ..Boid::default()
    }
}

fn random_rotation(rng: &mut StdRng, min_deg: f32, max_deg: f32) -> Quat {
    let x = angle_between(rng, min_deg, max_deg);
    let y = angle_between(rng, min_deg, max_deg);
    let z = angle_between(rng, min_deg, max_deg);
    Quat::from_euler(EulerRot::YXZ, y.to_radians(), x.to_radians(), z.to_radians())
}

fn angle_between(rng: &mut StdRng, min_deg: f32, max_deg: f32) -> f32 {
    if max_deg > min_deg {
        rng.random_range(min_deg..max_deg)
    } else {
        min_deg
    }
}

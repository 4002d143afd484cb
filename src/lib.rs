mod boid;
mod config;
mod error;
mod forces;
mod neighbours;
mod obstacles;
mod step;

pub use boid::Boid;
pub use config::SwarmConfig;
pub use error::{ConfigError, SimError, SimResult};
pub use glam::Vec3;
pub use obstacles::{NoObstacles, ObstacleSource, SphereObstacles};
pub use step::RunState;

use rand::rngs::StdRng;
use rand::SeedableRng;
use wasm_bindgen::prelude::*;

pub(crate) const EPSILON: f32 = 1.0e-6;

/// A fixed-size flock of boids advanced by a host-driven fixed-step loop.
/// Construction validates the config and spawns the flock; a returned swarm
/// is always ready to tick.
pub struct Swarm {
    config: SwarmConfig,
    boids: Vec<Boid>,
    new_velocities: Vec<Vec3>,
    new_positions: Vec<Vec3>,
    neighbour_scratch: Vec<usize>,
    obstacles: Box<dyn ObstacleSource>,
    goal: Option<Vec3>,
    flock_center: Option<Vec3>,
    run_state: RunState,
    tick_index: u64,
    neighbours_visited_last_tick: usize,
}

impl Swarm {
    pub fn new(config: SwarmConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rng = spawn_rng(config.seed)?;
        let boids = boid::spawn_flock(&config, &mut rng);
        let count = boids.len();
        Ok(Self {
            config,
            boids,
            new_velocities: vec![Vec3::ZERO; count],
            new_positions: vec![Vec3::ZERO; count],
            neighbour_scratch: Vec::new(),
            obstacles: Box::new(NoObstacles),
            goal: None,
            flock_center: None,
            run_state: RunState::Ready,
            tick_index: 0,
            neighbours_visited_last_tick: 0,
        })
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Committed state of the whole flock as of the last tick.
    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn boid(&self, index: usize) -> SimResult<&Boid> {
        self.boids.get(index).ok_or(SimError::BoidIndex {
            index,
            len: self.boids.len(),
        })
    }

    pub fn config(&self) -> &SwarmConfig {
        &self.config
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Number of ticks applied since construction.
    pub fn tick_index(&self) -> u64 {
        self.tick_index
    }

    /// Total neighbour relations found during the last tick.
    pub fn neighbours_visited_last_tick(&self) -> usize {
        self.neighbours_visited_last_tick
    }

    /// Neighbourhood centre last seen by boid 0, once it has had one.
    pub fn flock_center(&self) -> Option<Vec3> {
        self.flock_center
    }

    pub fn goal(&self) -> Option<Vec3> {
        self.goal
    }

    /// Stores a navigation goal for hosts that track one. No rule reads it
    /// yet, so the flock's motion is unaffected.
    pub fn set_goal(&mut self, position: Vec3) {
        self.goal = Some(position);
    }

    /// Swaps in the obstacle geometry queried on every tick.
    pub fn set_obstacle_source(&mut self, source: Box<dyn ObstacleSource>) {
        self.obstacles = source;
    }

    /// Rewrites one boid's position and velocity, re-deriving its forward.
    /// The flock size never changes; out-of-range indices and non-finite
    /// values are errors and leave the boid untouched.
    pub fn place_boid(&mut self, index: usize, position: Vec3, velocity: Vec3) -> SimResult<()> {
        if !position.is_finite() {
            return Err(SimError::NonFinitePlacement {
                name: "position",
                value: position,
            });
        }
        if !velocity.is_finite() {
            return Err(SimError::NonFinitePlacement {
                name: "velocity",
                value: velocity,
            });
        }
        let len = self.boids.len();
        let boid = self
            .boids
            .get_mut(index)
            .ok_or(SimError::BoidIndex { index, len })?;
        boid.position = position;
        boid.velocity = velocity;
        if let Some(forward) = velocity.try_normalize() {
            boid.forward = forward;
        }
        Ok(())
    }
}

fn spawn_rng(seed: Option<u64>) -> Result<StdRng, ConfigError> {
    match seed {
        Some(seed) => Ok(StdRng::seed_from_u64(seed)),
        None => StdRng::try_from_os_rng().map_err(|err| ConfigError::Entropy(err.to_string())),
    }
}

/// JS-facing wrapper owning a [`Swarm`] plus flat render mirrors of the
/// committed positions and headings.
#[wasm_bindgen]
pub struct SwarmSim {
    swarm: Swarm,
    spheres: SphereObstacles,
    render_positions: Vec<f32>,
    render_forwards: Vec<f32>,
}

#[wasm_bindgen]
impl SwarmSim {
    /// Builds a swarm of `count` boids with the reference config,
    /// deterministic when `seed` is given.
    #[wasm_bindgen(constructor)]
    pub fn new(count: usize, seed: Option<u32>) -> Result<SwarmSim, JsError> {
        let mut config = SwarmConfig::default().with_number_of_boids(count);
        if let Some(seed) = seed {
            config = config.with_seed(u64::from(seed));
        }
        let mut sim = SwarmSim {
            swarm: Swarm::new(config)?,
            spheres: SphereObstacles::new(),
            render_positions: Vec::new(),
            render_forwards: Vec::new(),
        };
        sim.sync_render_buffers();
        Ok(sim)
    }

    /// Reference-config swarm seeded from OS entropy.
    pub fn with_defaults() -> Result<SwarmSim, JsError> {
        SwarmSim::new(SwarmConfig::default().number_of_boids, None)
    }

    pub fn step(&mut self, dt: f32) {
        self.swarm.tick(dt);
        self.sync_render_buffers();
    }

    pub fn stop(&mut self) {
        self.swarm.stop();
    }

    pub fn count(&self) -> usize {
        self.swarm.len()
    }

    pub fn tick_index(&self) -> u64 {
        self.swarm.tick_index()
    }

    pub fn neighbours_visited_last_tick(&self) -> usize {
        self.swarm.neighbours_visited_last_tick()
    }

    /// Pointer to `3 * count` floats of boid positions in wasm memory,
    /// valid until the next call that mutates the sim.
    pub fn positions_ptr(&self) -> *const f32 {
        self.render_positions.as_ptr()
    }

    /// Pointer to `3 * count` floats of boid headings in wasm memory.
    pub fn forwards_ptr(&self) -> *const f32 {
        self.render_forwards.as_ptr()
    }

    /// Force readback for one boid: separation, cohesion, alignment, wander,
    /// obstacle and total as xyz triples, 18 floats.
    pub fn boid_forces(&self, index: usize) -> Result<Vec<f32>, JsError> {
        let boid = self.swarm.boid(index)?;
        let mut forces = Vec::with_capacity(18);
        for force in [
            boid.separation,
            boid.cohesion,
            boid.alignment,
            boid.wander,
            boid.obstacle,
            boid.total_force,
        ] {
            forces.extend_from_slice(&force.to_array());
        }
        Ok(forces)
    }

    pub fn flock_center(&self) -> Option<Vec<f32>> {
        self.swarm
            .flock_center()
            .map(|centre| centre.to_array().to_vec())
    }

    pub fn set_goal(&mut self, x: f32, y: f32, z: f32) {
        self.swarm.set_goal(Vec3::new(x, y, z));
    }

    pub fn add_obstacle_sphere(&mut self, x: f32, y: f32, z: f32, radius: f32) {
        self.spheres.push(Vec3::new(x, y, z), radius);
        self.swarm
            .set_obstacle_source(Box::new(self.spheres.clone()));
    }

    pub fn clear_obstacles(&mut self) {
        self.spheres.clear();
        self.swarm.set_obstacle_source(Box::new(NoObstacles));
    }

    pub fn set_separation_weight(&mut self, weight: f32) {
        self.swarm.set_separation_weight(weight);
    }

    pub fn set_alignment_weight(&mut self, weight: f32) {
        self.swarm.set_alignment_weight(weight);
    }

    pub fn set_cohesion_weight(&mut self, weight: f32) {
        self.swarm.set_cohesion_weight(weight);
    }

    pub fn set_obstacle_weight(&mut self, weight: f32) {
        self.swarm.set_obstacle_weight(weight);
    }

    pub fn set_wander_weight(&mut self, weight: f32) {
        self.swarm.set_wander_weight(weight);
    }

    pub fn set_neighbour_distance(&mut self, distance: f32) {
        self.swarm.set_neighbour_distance(distance);
    }

    pub fn set_field_of_view_deg(&mut self, degrees: f32) {
        self.swarm.set_field_of_view_deg(degrees);
    }

    pub fn set_boid_force_scale(&mut self, scale: f32) {
        self.swarm.set_boid_force_scale(scale);
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        self.swarm.set_max_speed(max_speed);
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.swarm.set_time_scale(time_scale);
    }

    pub fn set_obstacle_check_radius(&mut self, radius: f32) {
        self.swarm.set_obstacle_check_radius(radius);
    }

    pub fn set_world_bounds(
        &mut self,
        min_x: f32,
        min_y: f32,
        min_z: f32,
        max_x: f32,
        max_y: f32,
        max_z: f32,
    ) {
        self.swarm.set_world_bounds(
            Vec3::new(min_x, min_y, min_z),
            Vec3::new(max_x, max_y, max_z),
        );
    }
}

impl SwarmSim {
    // Mirrored after every committed tick so JS can lay zero-copy
    // Float32Array views over wasm memory.
    fn sync_render_buffers(&mut self) {
        let count = self.swarm.len();
        self.render_positions.clear();
        self.render_positions.reserve(3 * count);
        self.render_forwards.clear();
        self.render_forwards.reserve(3 * count);
        for boid in self.swarm.boids() {
            self.render_positions
                .extend_from_slice(&boid.position.to_array());
            self.render_forwards
                .extend_from_slice(&boid.forward.to_array());
        }
    }
}

#[wasm_bindgen]
pub fn wasm_loaded_message() -> String {
    "WASM loaded".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_swarm_is_ready() {
        let swarm = Swarm::new(SwarmConfig::default().with_seed(11)).unwrap();
        assert_eq!(swarm.len(), 200);
        assert!(!swarm.is_empty());
        assert_eq!(swarm.run_state(), RunState::Ready);
        assert_eq!(swarm.tick_index(), 0);
        assert_eq!(swarm.flock_center(), None);
        assert_eq!(swarm.goal(), None);
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = SwarmConfig::default().with_number_of_boids(0);
        assert!(matches!(Swarm::new(config), Err(ConfigError::EmptyFlock)));
    }

    #[test]
    fn goal_is_stored_for_hosts() {
        let mut swarm = Swarm::new(
            SwarmConfig::default()
                .with_number_of_boids(1)
                .with_seed(11),
        )
        .unwrap();
        swarm.set_goal(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(swarm.goal(), Some(Vec3::new(1.0, 2.0, 3.0)));
    }

    #[test]
    fn non_finite_placement_is_rejected() {
        let mut swarm = Swarm::new(
            SwarmConfig::default()
                .with_number_of_boids(1)
                .with_seed(11),
        )
        .unwrap();
        let before = *swarm.boid(0).unwrap();
        assert!(matches!(
            swarm.place_boid(0, Vec3::new(f32::NAN, 0.0, 0.0), Vec3::ZERO),
            Err(SimError::NonFinitePlacement { name: "position", .. })
        ));
        assert!(matches!(
            swarm.place_boid(0, Vec3::ZERO, Vec3::new(0.0, f32::INFINITY, 0.0)),
            Err(SimError::NonFinitePlacement { name: "velocity", .. })
        ));
        assert_eq!(*swarm.boid(0).unwrap(), before);
        // The flock must still tick cleanly after the rejected writes.
        swarm.tick(0.02);
        assert!(swarm.boid(0).unwrap().position.is_finite());
    }
}

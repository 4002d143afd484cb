use glam::Vec3;

use crate::error::ConfigError;
use crate::Swarm;

/// Tunables for a swarm. Validated once at construction, so a [`Swarm`]
/// never holds an invalid configuration.
#[derive(Debug, Clone, Copy)]
pub struct SwarmConfig {
    /// Number of boids in the flock. Fixed for the lifetime of the swarm.
    pub number_of_boids: usize,
    /// Magnitude every steering rule scales its desired direction to.
    pub boid_force_scale: f32,
    /// Speed ceiling applied when a new velocity is committed.
    pub max_speed: f32,
    /// Query radius handed to the obstacle source each tick.
    pub obstacle_check_radius: f32,
    /// Weight of the force steering away from the mean neighbour offset.
    pub separation_weight: f32,
    /// Weight of the force matching the mean neighbour heading.
    pub alignment_weight: f32,
    /// Weight of the force steering toward the mean neighbour position.
    pub cohesion_weight: f32,
    /// Weight of the obstacle and world-bound avoidance force.
    pub obstacle_weight: f32,
    /// Weight of the fallback force applied when a boid has no neighbours.
    pub wander_weight: f32,
    /// Two boids closer than this are neighbour candidates.
    pub neighbour_distance: f32,
    /// Angular width of the vision cone around the velocity, in degrees.
    pub field_of_view_deg: f32,
    /// Cubed radius of the spawn ball around `spawn_origin`.
    pub initialization_radius: f32,
    /// Total angular spread of spawn headings per axis, in degrees.
    pub initialization_forward_random_range: f32,
    /// Centre of the spawn ball.
    pub spawn_origin: Vec3,
    /// Lower corner of the world volume boids are steered back into.
    pub world_bound_min: Vec3,
    /// Upper corner of the world volume boids are steered back into.
    pub world_bound_max: Vec3,
    /// Multiplier applied to every `dt` handed to `tick`.
    pub time_scale: f32,
    /// RNG seed for deterministic spawning. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for SwarmConfig {
    fn default() -> Self {
        Self {
            number_of_boids: 200,
            boid_force_scale: 20.0,
            max_speed: 5.0,
            obstacle_check_radius: 1.0,
            separation_weight: 1.1,
            alignment_weight: 0.5,
            cohesion_weight: 1.0,
            obstacle_weight: 0.9,
            wander_weight: 0.3,
            neighbour_distance: 2.0,
            field_of_view_deg: 180.0,
            initialization_radius: 1.0,
            initialization_forward_random_range: 50.0,
            spawn_origin: Vec3::new(0.0, 2.5, 0.0),
            world_bound_min: Vec3::new(-8.0, 1.0, -8.0),
            world_bound_max: Vec3::new(8.0, 4.0, 8.0),
            time_scale: 1.0,
            seed: None,
        }
    }
}

impl SwarmConfig {
    /// Set the RNG seed for deterministic spawning.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the flock size.
    pub fn with_number_of_boids(mut self, count: usize) -> Self {
        self.number_of_boids = count;
        self
    }

    /// Set the neighbour candidate distance.
    pub fn with_neighbour_distance(mut self, distance: f32) -> Self {
        self.neighbour_distance = distance;
        self
    }

    /// Set the world volume boids are steered back into.
    pub fn with_world_bounds(mut self, min: Vec3, max: Vec3) -> Self {
        self.world_bound_min = min;
        self.world_bound_max = max;
        self
    }

    /// Set the centre of the spawn ball.
    pub fn with_spawn_origin(mut self, origin: Vec3) -> Self {
        self.spawn_origin = origin;
        self
    }

    /// Set the angular width of the vision cone, in degrees.
    pub fn with_field_of_view_deg(mut self, degrees: f32) -> Self {
        self.field_of_view_deg = degrees;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.number_of_boids == 0 {
            return Err(ConfigError::EmptyFlock);
        }
        require_positive("boid_force_scale", self.boid_force_scale)?;
        require_positive("max_speed", self.max_speed)?;
        require_positive("time_scale", self.time_scale)?;
        require_non_negative("obstacle_check_radius", self.obstacle_check_radius)?;
        require_non_negative("separation_weight", self.separation_weight)?;
        require_non_negative("alignment_weight", self.alignment_weight)?;
        require_non_negative("cohesion_weight", self.cohesion_weight)?;
        require_non_negative("obstacle_weight", self.obstacle_weight)?;
        require_non_negative("wander_weight", self.wander_weight)?;
        require_non_negative("neighbour_distance", self.neighbour_distance)?;
        require_non_negative("initialization_radius", self.initialization_radius)?;
        require_non_negative(
            "initialization_forward_random_range",
            self.initialization_forward_random_range,
        )?;
        if !self.field_of_view_deg.is_finite()
            || self.field_of_view_deg <= 0.0
            || self.field_of_view_deg > 360.0
        {
            return Err(ConfigError::FieldOfViewOutOfRange(self.field_of_view_deg));
        }
        require_finite_axes("spawn_origin", self.spawn_origin)?;
        require_finite_axes("world_bound_min", self.world_bound_min)?;
        require_finite_axes("world_bound_max", self.world_bound_max)?;
        for (axis, min, max) in [
            ('x', self.world_bound_min.x, self.world_bound_max.x),
            ('y', self.world_bound_min.y, self.world_bound_max.y),
            ('z', self.world_bound_min.z, self.world_bound_max.z),
        ] {
            if min > max {
                return Err(ConfigError::InvertedWorldBounds { axis, min, max });
            }
        }
        Ok(())
    }

    pub fn sqr_neighbour_distance(&self) -> f32 {
        self.neighbour_distance * self.neighbour_distance
    }

    pub fn fov_cos(&self) -> f32 {
        let half_angle = (self.field_of_view_deg * 0.5).to_radians();
        half_angle.cos()
    }
}

impl Swarm {
    pub fn set_separation_weight(&mut self, weight: f32) {
        self.config.separation_weight = clamp_finite(weight, 0.0, self.config.separation_weight);
    }

    pub fn set_alignment_weight(&mut self, weight: f32) {
        self.config.alignment_weight = clamp_finite(weight, 0.0, self.config.alignment_weight);
    }

    pub fn set_cohesion_weight(&mut self, weight: f32) {
        self.config.cohesion_weight = clamp_finite(weight, 0.0, self.config.cohesion_weight);
    }

    pub fn set_obstacle_weight(&mut self, weight: f32) {
        self.config.obstacle_weight = clamp_finite(weight, 0.0, self.config.obstacle_weight);
    }

    pub fn set_wander_weight(&mut self, weight: f32) {
        self.config.wander_weight = clamp_finite(weight, 0.0, self.config.wander_weight);
    }

    pub fn set_neighbour_distance(&mut self, distance: f32) {
        self.config.neighbour_distance =
            clamp_finite(distance, 0.0, self.config.neighbour_distance);
    }

    pub fn set_obstacle_check_radius(&mut self, radius: f32) {
        self.config.obstacle_check_radius =
            clamp_finite(radius, 0.0, self.config.obstacle_check_radius);
    }

    pub fn set_boid_force_scale(&mut self, scale: f32) {
        if scale.is_finite() && scale > 0.0 {
            self.config.boid_force_scale = scale;
        }
    }

    pub fn set_max_speed(&mut self, max_speed: f32) {
        if max_speed.is_finite() && max_speed > 0.0 {
            self.config.max_speed = max_speed;
        }
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        if time_scale.is_finite() && time_scale > 0.0 {
            self.config.time_scale = time_scale;
        }
    }

    pub fn set_field_of_view_deg(&mut self, degrees: f32) {
        if degrees.is_finite() && degrees > 0.0 && degrees <= 360.0 {
            self.config.field_of_view_deg = degrees;
        }
    }

    pub fn set_world_bounds(&mut self, min: Vec3, max: Vec3) {
        if min.is_finite() && max.is_finite() && min.cmple(max).all() {
            self.config.world_bound_min = min;
            self.config.world_bound_max = max;
        }
    }
}

fn require_positive(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value <= 0.0 {
        return Err(ConfigError::NotPositive { name, value });
    }
    Ok(())
}

fn require_non_negative(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFinite { name, value });
    }
    if value < 0.0 {
        return Err(ConfigError::Negative { name, value });
    }
    Ok(())
}

fn require_finite_axes(name: &'static str, value: Vec3) -> Result<(), ConfigError> {
    if !value.is_finite() {
        return Err(ConfigError::NonFiniteAxes { name, value });
    }
    Ok(())
}

// Runtime tuning keeps the current value instead of failing on bad input.
fn clamp_finite(value: f32, min: f32, fallback: f32) -> f32 {
    if !value.is_finite() {
        return fallback;
    }
    value.max(min)
}

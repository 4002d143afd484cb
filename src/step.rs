use crate::{Swarm, EPSILON};

/// Lifecycle of a swarm. Construction validates and spawns in one step, so
/// there is no uninitialized state to represent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    /// Spawned, not yet ticked.
    Ready,
    /// At least one tick has been applied.
    Running,
    /// `stop` was called; further ticks are ignored.
    Stopped,
}

impl Swarm {
    /// Advances the flock by one fixed step of `dt` seconds, scaled by the
    /// configured time scale. Ignored while stopped or for a non-finite or
    /// non-positive `dt`.
    pub fn tick(&mut self, dt: f32) {
        if self.run_state == RunState::Stopped {
            return;
        }
        if !dt.is_finite() || dt <= 0.0 {
            return;
        }
        self.run_state = RunState::Running;
        self.tick_index = self.tick_index.wrapping_add(1);

        let delta = dt * self.config.time_scale;
        let max_speed = self.config.max_speed;
        let mut visited = 0usize;

        // First pass reads committed state only and writes the scratch
        // buffers, so agent order cannot leak into the result.
        let mut neighbours = std::mem::take(&mut self.neighbour_scratch);
        for index in 0..self.boids.len() {
            self.boids[index].reset_forces();
            self.collect_neighbours_into(index, &mut neighbours);
            visited += neighbours.len();
            self.apply_rule_forces(index, &neighbours);

            let boid = &self.boids[index];
            let velocity = (boid.velocity + boid.total_force * delta).clamp_length_max(max_speed);
            self.new_velocities[index] = velocity;
            self.new_positions[index] = boid.position + velocity * delta;
        }
        self.neighbour_scratch = neighbours;
        self.neighbours_visited_last_tick = visited;

        for (index, boid) in self.boids.iter_mut().enumerate() {
            boid.velocity = self.new_velocities[index];
            boid.position = self.new_positions[index];
            // A stalled boid keeps its last heading.
            if let Some(forward) = boid.velocity.try_normalize() {
                boid.forward = forward;
            }
        }

        self.debug_validate_state();
    }

    /// Ticks `n` times with the same `dt`.
    pub fn run(&mut self, n: usize, dt: f32) {
        for _ in 0..n {
            self.tick(dt);
        }
    }

    /// Freezes the simulation. Committed state stays queryable; subsequent
    /// ticks are ignored.
    pub fn stop(&mut self) {
        self.run_state = RunState::Stopped;
    }

    fn debug_validate_state(&self) {
        if !cfg!(debug_assertions) {
            return;
        }
        // The clamp's rounding error scales with max_speed.
        let speed_cap = self.config.max_speed * (1.0 + EPSILON);
        for (index, boid) in self.boids.iter().enumerate() {
            debug_assert!(
                boid.position.is_finite(),
                "boid {index} position is not finite"
            );
            debug_assert!(
                boid.velocity.is_finite(),
                "boid {index} velocity is not finite"
            );
            debug_assert!(
                boid.velocity.length() <= speed_cap,
                "boid {index} speed {} exceeds {speed_cap}",
                boid.velocity.length()
            );
        }
    }
}

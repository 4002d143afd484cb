use glam::Vec3;

use crate::Swarm;

/// Classic steering: rescale the desired direction to the shared force
/// magnitude, then subtract the current velocity.
pub(crate) fn steer_towards(desired: Vec3, velocity: Vec3, force_scale: f32, weight: f32) -> Vec3 {
    (desired.normalize_or_zero() * force_scale - velocity) * weight
}

impl Swarm {
    /// Computes every rule force for one boid against its collected
    /// neighbours and records them on the boid, wander standing in for the
    /// flocking rules when nobody is in view.
    pub(crate) fn apply_rule_forces(&mut self, index: usize, neighbours: &[usize]) {
        let (separation, cohesion, alignment, wander) = if neighbours.is_empty() {
            (Vec3::ZERO, Vec3::ZERO, Vec3::ZERO, self.wander_force(index))
        } else {
            let separation = self.separation_force(index, neighbours);
            let (cohesion, centre) = self.cohesion_force(index, neighbours);
            let alignment = self.alignment_force(index, neighbours);
            // Boid 0 publishes the neighbourhood centre it sees for readback.
            if index == 0 {
                self.flock_center = Some(centre);
            }
            (separation, cohesion, alignment, Vec3::ZERO)
        };
        let obstacle = self.obstacle_force(index);

        let boid = &mut self.boids[index];
        boid.separation = separation;
        boid.cohesion = cohesion;
        boid.alignment = alignment;
        boid.wander = wander;
        boid.obstacle = obstacle;
        boid.total_force = separation + cohesion + alignment + wander + obstacle;
    }

    fn separation_force(&self, index: usize, neighbours: &[usize]) -> Vec3 {
        let boid = &self.boids[index];
        let mut away = Vec3::ZERO;
        for &j in neighbours {
            away += boid.position - self.boids[j].position;
        }
        let desired = away / neighbours.len() as f32;
        steer_towards(
            desired,
            boid.velocity,
            self.config.boid_force_scale,
            self.config.separation_weight,
        )
    }

    fn cohesion_force(&self, index: usize, neighbours: &[usize]) -> (Vec3, Vec3) {
        let boid = &self.boids[index];
        let mut positions = Vec3::ZERO;
        for &j in neighbours {
            positions += self.boids[j].position;
        }
        let centre = positions / neighbours.len() as f32;
        let force = steer_towards(
            centre - boid.position,
            boid.velocity,
            self.config.boid_force_scale,
            self.config.cohesion_weight,
        );
        (force, centre)
    }

    fn alignment_force(&self, index: usize, neighbours: &[usize]) -> Vec3 {
        let boid = &self.boids[index];
        let mut headings = Vec3::ZERO;
        for &j in neighbours {
            headings += self.boids[j].velocity.normalize_or_zero();
        }
        let desired = headings / neighbours.len() as f32 - boid.velocity;
        steer_towards(
            desired,
            boid.velocity,
            self.config.boid_force_scale,
            self.config.alignment_weight,
        )
    }

    // Not a steering force: the drift direction stays unnormalized so it
    // scales with the boid's own speed.
    fn wander_force(&self, index: usize) -> Vec3 {
        let velocity = self.boids[index].velocity;
        (velocity * self.config.boid_force_scale - velocity) * self.config.wander_weight
    }

    fn obstacle_force(&self, index: usize) -> Vec3 {
        let boid = &self.boids[index];
        let mut away = Vec3::ZERO;
        for point in self
            .obstacles
            .nearby_surface_points(boid.position, self.config.obstacle_check_radius)
        {
            away += (boid.position - point).normalize_or_zero();
        }
        away += self.world_bound_push(boid.position);
        // Nothing to avoid this tick.
        if away == Vec3::ZERO {
            return Vec3::ZERO;
        }
        steer_towards(
            away,
            boid.velocity,
            self.config.boid_force_scale,
            self.config.obstacle_weight,
        )
    }

    fn world_bound_push(&self, position: Vec3) -> Vec3 {
        let min = self.config.world_bound_min;
        let max = self.config.world_bound_max;
        let mut push = Vec3::ZERO;
        if position.x > max.x {
            push -= Vec3::X;
        } else if position.x < min.x {
            push += Vec3::X;
        }
        if position.y > max.y {
            push -= Vec3::Y;
        } else if position.y < min.y {
            push += Vec3::Y;
        }
        if position.z > max.z {
            push -= Vec3::Z;
        } else if position.z < min.z {
            push += Vec3::Z;
        }
        push
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::steer_towards;
    use crate::obstacles::SphereObstacles;
    use crate::{Swarm, SwarmConfig};

    fn test_swarm(count: usize) -> Swarm {
        let config = SwarmConfig::default()
            .with_number_of_boids(count)
            .with_seed(7);
        Swarm::new(config).unwrap()
    }

    #[test]
    fn steer_rescales_desired_and_subtracts_velocity() {
        let force = steer_towards(Vec3::new(0.0, 3.0, 0.0), Vec3::X, 20.0, 0.5);
        assert_eq!(force, Vec3::new(-0.5, 10.0, 0.0));
        // A zero desired direction decays the current velocity.
        let brake = steer_towards(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0), 20.0, 0.5);
        assert_eq!(brake, Vec3::new(-1.0, 0.0, 0.0));
    }

    #[test]
    fn separation_pushes_away_from_the_mean_neighbour_offset() {
        let mut swarm = test_swarm(2);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        swarm
            .place_boid(1, Vec3::new(1.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        let force = swarm.separation_force(0, &[1]);
        assert_eq!(force, (Vec3::NEG_X * 20.0) * 1.1);
    }

    #[test]
    fn cohesion_pulls_toward_the_neighbour_centre_and_reports_it() {
        let mut swarm = test_swarm(3);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        swarm
            .place_boid(1, Vec3::new(1.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        swarm
            .place_boid(2, Vec3::new(1.0, 2.5, 1.0), Vec3::ZERO)
            .unwrap();
        let (force, centre) = swarm.cohesion_force(0, &[1, 2]);
        assert_eq!(centre, Vec3::new(1.0, 2.5, 0.5));
        assert_eq!(force, Vec3::new(1.0, 0.0, 0.5).normalize_or_zero() * 20.0);
    }

    #[test]
    fn alignment_steers_toward_the_mean_heading() {
        let mut swarm = test_swarm(3);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::new(2.0, 0.0, 0.0))
            .unwrap();
        swarm
            .place_boid(1, Vec3::new(1.0, 2.5, 0.0), Vec3::new(0.0, 0.0, 3.0))
            .unwrap();
        swarm
            .place_boid(2, Vec3::new(0.0, 2.5, 1.0), Vec3::new(0.0, 4.0, 0.0))
            .unwrap();
        let force = swarm.alignment_force(0, &[1, 2]);
        let desired = Vec3::new(0.0, 0.5, 0.5) - Vec3::new(2.0, 0.0, 0.0);
        let expected = (desired.normalize_or_zero() * 20.0 - Vec3::new(2.0, 0.0, 0.0)) * 0.5;
        assert_eq!(force, expected);
    }

    #[test]
    fn lone_boid_wander_keeps_its_heading() {
        let mut swarm = test_swarm(1);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        swarm.apply_rule_forces(0, &[]);
        let boid = swarm.boid(0).unwrap();
        let expected = (Vec3::new(0.0, 0.0, 2.0) * 20.0 - Vec3::new(0.0, 0.0, 2.0)) * 0.3;
        assert_eq!(boid.wander, expected);
        assert_eq!(boid.separation, Vec3::ZERO);
        assert_eq!(boid.cohesion, Vec3::ZERO);
        assert_eq!(boid.alignment, Vec3::ZERO);
        assert_eq!(boid.total_force, expected);
    }

    #[test]
    fn wander_scales_with_speed() {
        let mut swarm = test_swarm(1);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::new(0.0, 0.0, 2.0))
            .unwrap();
        let slow = swarm.wander_force(0);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::new(0.0, 0.0, 4.0))
            .unwrap();
        assert_eq!(swarm.wander_force(0), slow * 2.0);
    }

    #[test]
    fn obstacle_force_is_zero_without_contributions() {
        let mut swarm = test_swarm(1);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::new(3.0, 0.0, 0.0))
            .unwrap();
        assert_eq!(swarm.obstacle_force(0), Vec3::ZERO);
    }

    #[test]
    fn world_bounds_push_strictly_outside_positions_back() {
        let swarm = test_swarm(1);
        assert_eq!(
            swarm.world_bound_push(Vec3::new(9.0, 0.0, 0.0)),
            Vec3::new(-1.0, 1.0, 0.0)
        );
        assert_eq!(swarm.world_bound_push(Vec3::new(8.0, 1.0, 8.0)), Vec3::ZERO);
        assert_eq!(swarm.world_bound_push(Vec3::new(0.0, 2.0, -9.0)), Vec3::Z);
    }

    #[test]
    fn crossed_bounds_steer_back_inside() {
        let mut swarm = test_swarm(1);
        swarm
            .place_boid(0, Vec3::new(9.0, 2.0, 0.0), Vec3::ZERO)
            .unwrap();
        let force = swarm.obstacle_force(0);
        assert_eq!(force, (Vec3::NEG_X * 20.0) * 0.9);
    }

    #[test]
    fn sphere_obstacles_repel_nearby_boids() {
        let mut swarm = test_swarm(1);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        let mut spheres = SphereObstacles::new();
        spheres.push(Vec3::new(0.5, 2.5, 0.0), 0.25);
        swarm.set_obstacle_source(Box::new(spheres));
        let force = swarm.obstacle_force(0);
        assert_eq!(force, (Vec3::NEG_X * 20.0) * 0.9);
    }

    #[test]
    fn boid_zero_records_the_flock_centre() {
        let mut swarm = test_swarm(2);
        swarm
            .place_boid(0, Vec3::new(0.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        swarm
            .place_boid(1, Vec3::new(1.0, 2.5, 0.0), Vec3::ZERO)
            .unwrap();
        assert_eq!(swarm.flock_center(), None);
        swarm.apply_rule_forces(0, &[1]);
        assert_eq!(swarm.flock_center(), Some(Vec3::new(1.0, 2.5, 0.0)));
        // Other boids never touch it.
        swarm.apply_rule_forces(1, &[0]);
        assert_eq!(swarm.flock_center(), Some(Vec3::new(1.0, 2.5, 0.0)));
    }
}

use glam::Vec3;

use crate::error::{SimError, SimResult};
use crate::Swarm;

impl Swarm {
    /// Indices of the boids that `index` currently perceives, in ascending
    /// order. Recomputed from committed state, so calling this between ticks
    /// matches what the next tick will see.
    pub fn neighbours_of(&self, index: usize) -> SimResult<Vec<usize>> {
        if index >= self.boids.len() {
            return Err(SimError::BoidIndex {
                index,
                len: self.boids.len(),
            });
        }
        let mut neighbours = Vec::new();
        self.collect_neighbours_into(index, &mut neighbours);
        Ok(neighbours)
    }

    pub(crate) fn collect_neighbours_into(&self, index: usize, out: &mut Vec<usize>) {
        out.clear();

        let origin = self.boids[index].position;
        let facing = self.boids[index].velocity.normalize_or_zero();
        let sqr_neighbour_distance = self.config.sqr_neighbour_distance();
        let fov_cos = self.config.fov_cos();

        for (j, other) in self.boids.iter().enumerate() {
            if j == index {
                continue;
            }
            let offset = other.position - origin;
            if offset.length_squared() >= sqr_neighbour_distance {
                continue;
            }
            // A stationary boid has no facing to restrict its view.
            if facing != Vec3::ZERO && offset.normalize_or_zero().dot(facing) <= fov_cos {
                continue;
            }
            out.push(j);
        }
    }
}

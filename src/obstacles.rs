use glam::Vec3;

/// Obstacle geometry the host injects into the swarm. Implementations come
/// from whatever spatial or physics layer the host runs; the swarm only ever
/// asks for closest surface points.
pub trait ObstacleSource {
    /// Closest surface point of every obstacle within `radius` of `position`.
    fn nearby_surface_points(&self, position: Vec3, radius: f32) -> Vec<Vec3>;
}

/// Obstacle-free world. The default source of a fresh swarm.
pub struct NoObstacles;

impl ObstacleSource for NoObstacles {
    fn nearby_surface_points(&self, _position: Vec3, _radius: f32) -> Vec<Vec3> {
        Vec::new()
    }
}

/// Fixed set of spheres, for hosts without a physics engine of their own.
#[derive(Clone, Default)]
pub struct SphereObstacles {
    spheres: Vec<Sphere>,
}

#[derive(Clone, Copy)]
struct Sphere {
    center: Vec3,
    radius: f32,
}

impl SphereObstacles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, center: Vec3, radius: f32) {
        self.spheres.push(Sphere { center, radius });
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }
}

impl ObstacleSource for SphereObstacles {
    fn nearby_surface_points(&self, position: Vec3, radius: f32) -> Vec<Vec3> {
        let mut points = Vec::new();
        for sphere in &self.spheres {
            let offset = position - sphere.center;
            let distance = offset.length();
            // A query point inside the sphere is its own closest surface point.
            let surface = if distance <= sphere.radius {
                position
            } else {
                sphere.center + offset / distance * sphere.radius
            };
            if surface.distance_squared(position) <= radius * radius {
                points.push(surface);
            }
        }
        points
    }
}

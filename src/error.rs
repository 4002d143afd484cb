use glam::Vec3;

pub type SimResult<T> = Result<T, SimError>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("flock must contain at least one boid")]
    EmptyFlock,

    #[error("{name} must be a finite number, got {value}")]
    NonFinite { name: &'static str, value: f32 },

    #[error("{name} must be positive, got {value}")]
    NotPositive { name: &'static str, value: f32 },

    #[error("{name} must not be negative, got {value}")]
    Negative { name: &'static str, value: f32 },

    #[error("field of view must be in (0, 360] degrees, got {0}")]
    FieldOfViewOutOfRange(f32),

    #[error("{name} must be finite on every axis, got {value}")]
    NonFiniteAxes { name: &'static str, value: Vec3 },

    #[error("world bounds are inverted on the {axis} axis: {min} > {max}")]
    InvertedWorldBounds { axis: char, min: f32, max: f32 },

    #[error("entropy source unavailable for unseeded spawn: {0}")]
    Entropy(String),
}

#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("boid index {index} out of range for flock of {len}")]
    BoidIndex { index: usize, len: usize },

    #[error("{name} must be finite on every axis, got {value}")]
    NonFinitePlacement { name: &'static str, value: Vec3 },
}

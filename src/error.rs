use thiserror::Error;

/// Errors raised while building or running a simulation
#[derive(Debug, Error)]
pub enum BallisticsError {
    /// The projectile cannot be simulated as configured
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A drag denominator collapsed to zero and produced a non-finite deceleration
    #[error("division singularity in {context} at speed {speed_mps} m/s")]
    DivisionSingularity { context: &'static str, speed_mps: f64 },

    #[error("zero solver did not converge after {iterations} iterations (last miss {last_miss_m:.4} m)")]
    ConvergenceFailure { iterations: usize, last_miss_m: f64 },

    #[error("invalid {model} drag table: {reason}")]
    InvalidDragTable { model: String, reason: String },

    #[error("failed to parse drag table line {line}: {reason}")]
    DragTableParse { line: u64, reason: String },

    #[error("no bullet at path '{path}' (missing segment '{segment}')")]
    UnknownBullet { path: String, segment: String },

    #[error("invalid bullet spec at '{path}': {reason}")]
    InvalidBulletSpec { path: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, BallisticsError>;

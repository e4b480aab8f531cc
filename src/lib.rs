//! # Ballistic Simulator
//!
//! Fixed-step 2D trajectory simulation under gravity and G1/G7 table drag,
//! with an iterative solver for the zero angle.

// Re-export the main types and functions
pub use bullet_spec::{BulletCatalog, BulletSpec};
pub use drag::{DragCoefficientModel, DragTable};
pub use drag_model::DragModel;
pub use effects::{DragEffect, Effect, GravityEffect, VelocityDelta};
pub use error::{BallisticsError, Result};
pub use projectile::{Axis, BallisticCoefficient, Boundaries, Projectile};
pub use simulator::{rotate_vector, Coordinate, Simulator, SlopeShot, TrajectorySample};

// Module declarations
mod drag_model;
pub mod bullet_spec;
pub mod constants;
pub mod drag;
pub mod effects;
mod error;
pub mod export;
pub mod projectile;
pub mod simulator;

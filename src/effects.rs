use std::sync::Arc;

use nalgebra::Vector2;

use crate::constants::G_ACCEL_MPS2;
use crate::drag::DragCoefficientModel;
use crate::error::{BallisticsError, Result};
use crate::projectile::{Axis, Projectile};

/// Per-axis velocity change produced by one effect over one timestep
///
/// Only the axes an effect touches are present.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VelocityDelta {
    components: [Option<f64>; 2],
}

impl VelocityDelta {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, axis: Axis, delta: f64) -> Self {
        self.components[axis.index()] = Some(delta);
        self
    }

    pub fn get(&self, axis: Axis) -> Option<f64> {
        self.components[axis.index()]
    }

    pub fn is_empty(&self) -> bool {
        self.components.iter().all(Option::is_none)
    }

    /// Dense vector with absent axes as zero
    pub fn to_vector(&self) -> Vector2<f64> {
        Vector2::new(
            self.get(Axis::X).unwrap_or(0.0),
            self.get(Axis::Y).unwrap_or(0.0),
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GravityEffect;

impl GravityEffect {
    pub fn apply(&self, _projectile: &Projectile, dt_ms: f64) -> VelocityDelta {
        let seconds = dt_ms / 1000.0;
        VelocityDelta::empty().with(Axis::Y, -seconds * G_ACCEL_MPS2)
    }
}

/// Aerodynamic drag opposing the current velocity
#[derive(Debug, Clone)]
pub struct DragEffect {
    pub fluid_density: f64,
    drag_model: Arc<DragCoefficientModel>,
}

impl DragEffect {
    pub fn new(fluid_density: f64, drag_model: Arc<DragCoefficientModel>) -> Self {
        Self { fluid_density, drag_model }
    }

    pub fn apply(&self, projectile: &Projectile, dt_ms: f64) -> Result<VelocityDelta> {
        let speed = projectile.speed();
        if speed == 0.0 {
            return Ok(VelocityDelta::empty());
        }

        let seconds = dt_ms / 1000.0;
        let drag_coefficient = self.drag_model.calculate_projectile_drag_coefficient(projectile)?;
        let drag_force =
            0.5 * self.fluid_density * speed * speed * drag_coefficient * projectile.cross_section_area;
        let impulse = drag_force * seconds;
        // Area is in mm² and mass in grams; both scale factors fold into this divisor.
        let deceleration = impulse / projectile.mass_grams / 1000.0;
        let deceleration_ratio = deceleration / speed;
        if !deceleration_ratio.is_finite() {
            return Err(BallisticsError::DivisionSingularity {
                context: "drag deceleration",
                speed_mps: speed,
            });
        }

        let velocity = projectile.velocity();
        Ok(Axis::ALL.iter().fold(VelocityDelta::empty(), |delta, &axis| {
            delta.with(axis, -velocity[axis.index()] * deceleration_ratio)
        }))
    }
}

/// Closed set of forces acting on the projectile
#[derive(Debug, Clone)]
pub enum Effect {
    Gravity(GravityEffect),
    Drag(DragEffect),
}

impl Effect {
    pub fn gravity() -> Self {
        Effect::Gravity(GravityEffect)
    }

    pub fn drag(fluid_density: f64, drag_model: Arc<DragCoefficientModel>) -> Self {
        Effect::Drag(DragEffect::new(fluid_density, drag_model))
    }

    pub fn apply(&self, projectile: &Projectile, dt_ms: f64) -> Result<VelocityDelta> {
        match self {
            Effect::Gravity(gravity) => Ok(gravity.apply(projectile, dt_ms)),
            Effect::Drag(drag) => drag.apply(projectile, dt_ms),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::DragTable;
    use crate::projectile::BallisticCoefficient;
    use crate::DragModel;
    use approx::assert_relative_eq;

    fn test_projectile() -> Projectile {
        Projectile::new(6.5, 9.07, 820.0).with_ballistic_coefficient(BallisticCoefficient::G7(0.245))
    }

    fn standard_model() -> Arc<DragCoefficientModel> {
        Arc::new(DragCoefficientModel::standard().unwrap())
    }

    #[test]
    fn test_gravity_only_touches_vertical_axis() {
        let delta = GravityEffect.apply(&test_projectile(), 1000.0);
        assert_eq!(delta.get(Axis::X), None);
        assert_relative_eq!(delta.get(Axis::Y).unwrap(), -G_ACCEL_MPS2);

        let delta = GravityEffect.apply(&test_projectile(), 0.1);
        assert_relative_eq!(delta.get(Axis::Y).unwrap(), -0.0001 * G_ACCEL_MPS2);
    }

    #[test]
    fn test_drag_at_rest_is_empty() {
        for density in [0.0, 1.225, 1000.0] {
            let drag = DragEffect::new(density, standard_model());
            let delta = drag.apply(&test_projectile(), 0.1).unwrap();
            assert!(delta.is_empty());
        }

        // Even without a ballistic coefficient tag
        let drag = DragEffect::new(1.225, standard_model());
        let delta = drag.apply(&Projectile::new(6.5, 9.07, 820.0), 0.1).unwrap();
        assert!(delta.is_empty());
    }

    #[test]
    fn test_drag_opposes_velocity() {
        let mut projectile = test_projectile();
        projectile.set_velocity(Vector2::new(800.0, 60.0));
        let drag = DragEffect::new(1.225, standard_model());
        let delta = drag.apply(&projectile, 0.1).unwrap().to_vector();

        assert!(delta.x < 0.0);
        assert!(delta.y < 0.0);
        // Anti-parallel to the velocity
        assert_relative_eq!(delta.y / delta.x, 60.0 / 800.0, epsilon = 1e-12);
    }

    #[test]
    fn test_drag_magnitude() {
        let mut projectile = test_projectile();
        projectile.set_velocity(Vector2::new(820.0, 0.0));
        let drag = DragEffect::new(1.225, standard_model());
        let delta = drag.apply(&projectile, 0.1).unwrap();

        let cd = 9.07 / (6.5 * 6.5);
        let force = 0.5 * 1.225 * 820.0 * 820.0 * cd * projectile.cross_section_area;
        let expected = force * 0.0001 / 9.07 / 1000.0;
        assert_relative_eq!(delta.get(Axis::X).unwrap(), -expected, epsilon = 1e-12);
        assert_relative_eq!(delta.get(Axis::Y).unwrap(), 0.0);
    }

    #[test]
    fn test_drag_singularity_is_reported() {
        let zero = DragTable::from_speed_pairs(DragModel::G7, vec![(0.0, 0.0), (2000.0, 0.0)]).unwrap();
        let g1 = DragTable::from_speed_pairs(DragModel::G1, vec![(0.0, 0.2), (2000.0, 0.5)]).unwrap();
        let drag = DragEffect::new(1.225, Arc::new(DragCoefficientModel::new(g1, zero)));

        let mut projectile = test_projectile();
        projectile.set_velocity(Vector2::new(820.0, 0.0));
        let result = drag.apply(&projectile, 0.1);
        assert!(matches!(result, Err(BallisticsError::DivisionSingularity { .. })));
    }

    #[test]
    fn test_drag_requires_ballistic_coefficient() {
        let mut projectile = Projectile::new(6.5, 9.07, 820.0);
        projectile.set_velocity(Vector2::new(820.0, 0.0));
        let result = Effect::drag(1.225, standard_model()).apply(&projectile, 0.1);
        assert!(matches!(result, Err(BallisticsError::Configuration(_))));
    }
}

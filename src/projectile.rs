use nalgebra::Vector2;

use crate::drag_model::DragModel;

/// Trajectory plane axis: `X` is downrange, `Y` is vertical
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub const ALL: [Axis; 2] = [Axis::X, Axis::Y];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
        }
    }
}

/// Ballistic coefficient tag selecting the drag table family
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BallisticCoefficient {
    G1(f64),
    G7(f64),
}

impl BallisticCoefficient {
    pub fn drag_model(&self) -> DragModel {
        match self {
            BallisticCoefficient::G1(_) => DragModel::G1,
            BallisticCoefficient::G7(_) => DragModel::G7,
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            BallisticCoefficient::G1(bc) | BallisticCoefficient::G7(bc) => *bc,
        }
    }
}

/// Per-axis stopping thresholds for a simulation
///
/// A positive threshold is a forward limit (`position < threshold`), a zero or
/// negative threshold is a floor (`position > threshold`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Boundaries {
    limits: Vec<(Axis, f64)>,
}

impl Boundaries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, axis: Axis, threshold: f64) -> Self {
        self.limits.retain(|(a, _)| *a != axis);
        self.limits.push((axis, threshold));
        self
    }

    pub fn get(&self, axis: Axis) -> Option<f64> {
        self.limits.iter().find(|(a, _)| *a == axis).map(|(_, t)| *t)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Axis, f64)> + '_ {
        self.limits.iter().copied()
    }
}

/// Physical state of a single projectile
///
/// Geometry is in millimeters and mass in grams; kinematics are SI.
#[derive(Debug, Clone)]
pub struct Projectile {
    pub diameter_mm: f64,
    pub mass_grams: f64,
    pub muzzle_velocity: f64,
    pub cross_section_area: f64,
    pub ballistic_coefficient: Option<BallisticCoefficient>,
    velocity: Vector2<f64>,
    position: Vector2<f64>,
    speed: f64,
}

impl Projectile {
    pub fn new(diameter_mm: f64, mass_grams: f64, muzzle_velocity: f64) -> Self {
        Self {
            diameter_mm,
            mass_grams,
            muzzle_velocity,
            cross_section_area: std::f64::consts::PI * (diameter_mm / 2.0).powi(2),
            ballistic_coefficient: None,
            velocity: Vector2::zeros(),
            position: Vector2::zeros(),
            speed: 0.0,
        }
    }

    pub fn with_ballistic_coefficient(mut self, bc: BallisticCoefficient) -> Self {
        self.ballistic_coefficient = Some(bc);
        self
    }

    pub fn velocity(&self) -> &Vector2<f64> {
        &self.velocity
    }

    pub fn position(&self) -> &Vector2<f64> {
        &self.position
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Drag table selected by the ballistic coefficient tag, if any
    pub fn drag_model(&self) -> Option<DragModel> {
        self.ballistic_coefficient.map(|bc| bc.drag_model())
    }

    pub fn compute_speed(&self) -> f64 {
        self.velocity.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn update_speed(&mut self) {
        self.speed = self.compute_speed();
    }

    pub fn set_velocity(&mut self, velocity: Vector2<f64>) {
        self.velocity = velocity;
        self.update_speed();
    }

    /// Adds a per-axis change to the velocity and refreshes the speed
    pub fn add_velocity(&mut self, delta: &Vector2<f64>) {
        self.velocity += delta;
        self.update_speed();
    }

    pub fn reset_position(&mut self, position: Vector2<f64>) {
        self.position = position;
    }

    pub fn update_position(&mut self, dt_ms: f64) {
        for axis in Axis::ALL {
            let i = axis.index();
            self.position[i] += self.velocity[i] * dt_ms / 1000.0;
        }
    }

    pub fn within_boundaries(&self, boundaries: &Boundaries) -> bool {
        boundaries.iter().all(|(axis, threshold)| {
            let coordinate = self.position[axis.index()];
            if threshold > 0.0 {
                coordinate < threshold
            } else {
                coordinate > threshold
            }
        })
    }
}

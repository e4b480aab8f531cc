use log::{debug, info, warn};
use nalgebra::{Rotation2, Vector2};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_MAX_ZERO_ITERATIONS, MILLIRADIANS_PER_RADIAN, RANGE_OVERSHOOT_M, SIGHT_HEIGHT_M,
    ZERO_TOLERANCE_M,
};
use crate::effects::Effect;
use crate::error::{BallisticsError, Result};
use crate::projectile::{Axis, Boundaries, Projectile};

/// Point or vector in the trajectory plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl From<&Vector2<f64>> for Coordinate {
    fn from(v: &Vector2<f64>) -> Self {
        Self { x: v.x, y: v.y }
    }
}

/// Logged state of the projectile at one instant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySample {
    /// Seconds since the shot
    pub timestamp: f64,
    pub position: Coordinate,
    pub velocity: Coordinate,
}

/// Result of a shot at a target on a slope
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlopeShot {
    pub target: Coordinate,
    /// Elevation set for the slope (milliradians)
    pub elevation: f64,
    /// Adjustment on top of zero and elevation that hits the target (milliradians)
    pub adjustment: f64,
}

/// Fixed-step trajectory simulator with a zeroing solver
///
/// Angles (`zero_angle`, `elevation`, adjustments) are in milliradians,
/// timestep in milliseconds and the log interval in steps.
#[derive(Debug, Clone)]
pub struct Simulator {
    projectile: Projectile,
    effects: Vec<Effect>,
    timestep_ms: f64,
    log_interval: u64,
    zero_angle: f64,
    elevation: f64,
    max_zero_iterations: usize,
    logs: Vec<TrajectorySample>,
}

impl Simulator {
    pub fn new(
        projectile: Projectile,
        effects: Vec<Effect>,
        timestep_ms: f64,
        log_interval: u64,
    ) -> Result<Self> {
        if !(timestep_ms > 0.0 && timestep_ms.is_finite()) {
            return Err(BallisticsError::Configuration(format!(
                "timestep must be positive, got {timestep_ms} ms"
            )));
        }
        if log_interval == 0 {
            return Err(BallisticsError::Configuration(
                "log interval must be at least one step".to_string(),
            ));
        }

        Ok(Self {
            projectile,
            effects,
            timestep_ms,
            log_interval,
            zero_angle: 0.0,
            elevation: 0.0,
            max_zero_iterations: DEFAULT_MAX_ZERO_ITERATIONS,
            logs: Vec::new(),
        })
    }

    pub fn with_max_zero_iterations(mut self, iterations: usize) -> Self {
        self.max_zero_iterations = iterations;
        self
    }

    pub fn projectile(&self) -> &Projectile {
        &self.projectile
    }

    pub fn logs(&self) -> &[TrajectorySample] {
        &self.logs
    }

    pub fn zero_angle(&self) -> f64 {
        self.zero_angle
    }

    pub fn elevation(&self) -> f64 {
        self.elevation
    }

    pub fn set_elevation(&mut self, elevation: f64) {
        self.elevation = elevation;
    }

    pub fn timestep_ms(&self) -> f64 {
        self.timestep_ms
    }

    pub fn log_interval(&self) -> u64 {
        self.log_interval
    }

    /// Run from the muzzle until the projectile leaves `boundaries`
    ///
    /// The projectile's current velocity is the launch velocity. The log is
    /// replaced with one sample every `log_interval` steps plus the state
    /// that ended the run. `boundaries` must contain a floor (a threshold
    /// of zero or below) so that a falling projectile always ends the run.
    pub fn simulate(&mut self, boundaries: &Boundaries) -> Result<()> {
        if !boundaries.iter().any(|(_, threshold)| threshold <= 0.0) {
            return Err(BallisticsError::Configuration(
                "simulation needs a floor boundary (threshold <= 0)".to_string(),
            ));
        }

        self.projectile.reset_position(Vector2::new(0.0, -SIGHT_HEIGHT_M));
        self.logs.clear();

        let mut step: u64 = 0;
        let mut timestamp_ms = 0.0;
        while self.projectile.within_boundaries(boundaries) {
            if step % self.log_interval == 0 {
                self.log(timestamp_ms);
            }
            self.simulate_timestep()?;
            step += 1;
            timestamp_ms += self.timestep_ms;
        }
        self.log(timestamp_ms);
        Ok(())
    }

    fn log(&mut self, timestamp_ms: f64) {
        self.logs.push(TrajectorySample {
            timestamp: timestamp_ms / 1000.0,
            position: self.projectile.position().into(),
            velocity: self.projectile.velocity().into(),
        });
    }

    fn simulate_timestep(&mut self) -> Result<()> {
        let mut total: Vector2<f64> = Vector2::zeros();
        for effect in &self.effects {
            total += effect.apply(&self.projectile, self.timestep_ms)?.to_vector();
        }
        self.projectile.add_velocity(&total);
        self.projectile.update_position(self.timestep_ms);
        Ok(())
    }

    /// Find the zero angle for `zero_distance` and keep it for later shots
    pub fn zero(&mut self, zero_distance: f64) -> Result<f64> {
        self.zero_angle = 0.0;
        self.zero_angle = self.get_adjustment(zero_distance, 0.0)?;
        info!("Zeroed at {:.2} m: {:.4} mrad", zero_distance, self.zero_angle);
        Ok(self.zero_angle)
    }

    /// Adjustment (mrad) that puts the shot within tolerance of the target point
    ///
    /// Each iteration corrects by the vertical miss converted to milliradians
    /// at the target distance.
    pub fn get_adjustment(&mut self, target_distance: f64, target_height: f64) -> Result<f64> {
        if !(target_distance > 0.0) {
            return Err(BallisticsError::Configuration(format!(
                "target distance must be positive, got {target_distance} m"
            )));
        }

        let milrad = target_distance / MILLIRADIANS_PER_RADIAN;
        let mut adjustment = 0.0;
        let mut last_miss = f64::NAN;
        let mut iterations = 0;

        for iteration in 1..=self.max_zero_iterations {
            iterations = iteration;
            self.shoot(adjustment, target_distance, target_distance)?;
            let closest = self
                .closest_sample(target_distance)
                .ok_or_else(|| BallisticsError::Configuration("shot produced no samples".to_string()))?;
            let miss = closest.position.y - target_height;
            debug!(
                "  Iteration {}: adjustment = {:.4} mrad, x = {:.2} m, miss = {:.4} m",
                iteration, adjustment, closest.position.x, miss
            );

            if miss.abs() < ZERO_TOLERANCE_M {
                return Ok(adjustment);
            }
            last_miss = miss;
            if !miss.is_finite() {
                break;
            }
            adjustment -= miss / milrad;
        }

        warn!(
            "No solution for target at ({:.2}, {:.2}) m, last miss {:.4} m",
            target_distance, target_height, last_miss
        );
        Err(BallisticsError::ConvergenceFailure {
            iterations,
            last_miss_m: last_miss,
        })
    }

    /// Fire with `adjustment` (mrad) on top of zero angle and elevation
    pub fn shoot(&mut self, adjustment: f64, max_distance: f64, max_drop: f64) -> Result<()> {
        let total_angle = self.zero_angle + self.elevation + adjustment;
        let velocity = rotate_vector(Vector2::new(self.projectile.muzzle_velocity, 0.0), total_angle);
        self.projectile.set_velocity(velocity);

        let boundaries = Boundaries::new()
            .with(Axis::X, max_distance + RANGE_OVERSHOOT_M)
            .with(Axis::Y, -max_drop.abs());
        self.simulate(&boundaries)
    }

    /// Solve and fire at a target `distance` meters away along a slope of `angle_deg`
    ///
    /// The slope is applied as elevation, which stays set on the simulator.
    pub fn shoot_at(&mut self, distance: f64, angle_deg: f64) -> Result<SlopeShot> {
        let target = Rotation2::new(angle_deg.to_radians()) * Vector2::new(distance, 0.0);
        self.elevation = MILLIRADIANS_PER_RADIAN * target.y / distance;
        let adjustment = self.get_adjustment(target.x, target.y)?;
        self.shoot(adjustment, target.x, target.y - 1.0)?;

        Ok(SlopeShot {
            target: (&target).into(),
            elevation: self.elevation,
            adjustment,
        })
    }

    /// Fire once per adjustment in `[start, stop)` and collect each shot's final sample
    pub fn adjustment_table(
        &mut self,
        start: f64,
        stop: f64,
        step: f64,
        max_distance: f64,
        max_drop: f64,
    ) -> Result<Vec<(f64, TrajectorySample)>> {
        if !(step > 0.0) {
            return Err(BallisticsError::Configuration(format!(
                "adjustment step must be positive, got {step}"
            )));
        }

        let mut rows = Vec::new();
        let mut adjustment = start;
        while adjustment < stop {
            self.shoot(adjustment, max_distance, max_drop)?;
            if let Some(last) = self.logs.last() {
                rows.push((adjustment, *last));
            }
            adjustment += step;
        }
        Ok(rows)
    }

    /// Logged sample whose downrange position is closest to `distance`
    pub fn closest_sample(&self, distance: f64) -> Option<&TrajectorySample> {
        self.logs
            .iter()
            .min_by(|a, b| (a.position.x - distance).abs().total_cmp(&(b.position.x - distance).abs()))
    }
}

/// Rotate `vector` counter-clockwise by `milrad` milliradians
pub fn rotate_vector(vector: Vector2<f64>, milrad: f64) -> Vector2<f64> {
    Rotation2::new(milrad / MILLIRADIANS_PER_RADIAN) * vector
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::G_ACCEL_MPS2;
    use approx::assert_relative_eq;

    fn gravity_only(muzzle_velocity: f64, timestep_ms: f64, log_interval: u64) -> Simulator {
        let projectile = Projectile::new(6.5, 9.07, muzzle_velocity);
        Simulator::new(projectile, vec![Effect::gravity()], timestep_ms, log_interval).unwrap()
    }

    #[test]
    fn test_rotate_vector() {
        let rotated = rotate_vector(Vector2::new(1.0, 0.0), 1000.0 * std::f64::consts::FRAC_PI_2);
        assert_relative_eq!(rotated.x, 0.0, epsilon = 1e-12);
        assert_relative_eq!(rotated.y, 1.0, epsilon = 1e-12);

        let rotated = rotate_vector(Vector2::new(820.0, 0.0), 1.0);
        assert_relative_eq!(rotated.x, 820.0 * 0.001f64.cos(), epsilon = 1e-9);
        assert_relative_eq!(rotated.y, 820.0 * 0.001f64.sin(), epsilon = 1e-9);
    }

    #[test]
    fn test_new_rejects_bad_settings() {
        let projectile = Projectile::new(6.5, 9.07, 820.0);
        assert!(Simulator::new(projectile.clone(), vec![], 0.0, 50).is_err());
        assert!(Simulator::new(projectile.clone(), vec![], -1.0, 50).is_err());
        assert!(Simulator::new(projectile, vec![], 0.1, 0).is_err());
    }

    #[test]
    fn test_simulate_starts_below_line_of_sight() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.shoot(0.0, 100.0, 20.0).unwrap();

        let first = sim.logs()[0];
        assert_eq!(first.timestamp, 0.0);
        assert_relative_eq!(first.position.x, 0.0);
        assert_relative_eq!(first.position.y, -SIGHT_HEIGHT_M);
        assert_relative_eq!(first.velocity.x, 800.0);
    }

    #[test]
    fn test_simulate_stops_past_boundary() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.shoot(0.0, 100.0, 20.0).unwrap();

        let last = sim.logs().last().unwrap();
        assert!(last.position.x >= 110.0);
        // One step beyond the boundary at most
        assert!(last.position.x < 110.0 + 800.0 * 0.0001 + 1e-9);

        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.shoot(0.0, 100_000.0, 1.0).unwrap();
        let last = sim.logs().last().unwrap();
        assert!(last.position.y <= -1.0);
        assert!(sim.logs()[sim.logs().len() - 2].position.y > -1.0);
    }

    #[test]
    fn test_simulate_requires_floor() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        for boundaries in [Boundaries::new(), Boundaries::new().with(Axis::X, 100.0)] {
            assert!(matches!(
                sim.simulate(&boundaries),
                Err(BallisticsError::Configuration(_))
            ));
        }
        assert!(sim.logs().is_empty());
    }

    #[test]
    fn test_simulate_floor_ends_stalled_shot() {
        // No launch velocity: only gravity moves the projectile
        let mut sim = gravity_only(800.0, 1.0, 50);
        sim.simulate(&Boundaries::new().with(Axis::X, 100.0).with(Axis::Y, -1.0))
            .unwrap();

        let last = sim.logs().last().unwrap();
        assert_eq!(last.position.x, 0.0);
        assert!(last.position.y <= -1.0);
    }

    #[test]
    fn test_log_spacing() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.shoot(0.0, 300.0, 20.0).unwrap();

        let logs = sim.logs();
        assert!(logs.len() > 3);
        let spacing = 50.0 * 0.1 / 1000.0;
        for (i, pair) in logs[..logs.len() - 1].windows(2).enumerate() {
            assert_relative_eq!(pair[1].timestamp - pair[0].timestamp, spacing, epsilon = 1e-9);
            assert_relative_eq!(pair[0].timestamp, i as f64 * spacing, epsilon = 1e-9);
        }
        let n = logs.len();
        assert!(logs[n - 1].timestamp >= logs[n - 2].timestamp);
        assert!(logs[n - 1].timestamp - logs[n - 2].timestamp <= spacing + 1e-9);
    }

    #[test]
    fn test_log_is_rebuilt_each_run() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.shoot(0.0, 500.0, 20.0).unwrap();
        let long_run = sim.logs().len();
        sim.shoot(0.0, 100.0, 20.0).unwrap();
        assert!(sim.logs().len() < long_run);
        assert_eq!(sim.logs()[0].timestamp, 0.0);
    }

    #[test]
    fn test_gravity_only_matches_parabola() {
        let mut sim = gravity_only(800.0, 0.1, 10);
        sim.shoot(2.0, 400.0, 50.0).unwrap();

        let angle = 0.002f64;
        let (vx, vy) = (800.0 * angle.cos(), 800.0 * angle.sin());
        let dt = 0.0001;
        for sample in &sim.logs()[..sim.logs().len() - 1] {
            let t = sample.timestamp;
            let expected_x = vx * t;
            let expected_y = -SIGHT_HEIGHT_M + vy * t - 0.5 * G_ACCEL_MPS2 * t * t;
            assert_relative_eq!(sample.position.x, expected_x, epsilon = 1e-6);
            // Semi-implicit Euler lags the parabola by g·t·dt/2
            assert!((sample.position.y - expected_y).abs() <= 0.5 * G_ACCEL_MPS2 * t * dt + 1e-9);
        }
    }

    #[test]
    fn test_zero_gravity_only() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        let zero = sim.zero(100.0).unwrap();
        assert!(zero > 0.0);
        assert_eq!(sim.zero_angle(), zero);

        sim.shoot(0.0, 1000.0, 20.0).unwrap();
        let closest = sim.closest_sample(100.0).unwrap();
        assert!(closest.position.y.abs() < ZERO_TOLERANCE_M);
    }

    #[test]
    fn test_convergence_failure_is_reported() {
        // One iteration is never enough from a flat start
        let mut sim = gravity_only(800.0, 0.1, 50).with_max_zero_iterations(1);
        let result = sim.zero(300.0);
        assert!(matches!(
            result,
            Err(BallisticsError::ConvergenceFailure { iterations: 1, .. })
        ));
        assert_eq!(sim.zero_angle(), 0.0);
    }

    #[test]
    fn test_non_finite_miss_reports_iterations_reached() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        match sim.get_adjustment(100.0, f64::NAN) {
            Err(BallisticsError::ConvergenceFailure { iterations, last_miss_m }) => {
                assert_eq!(iterations, 1);
                assert!(last_miss_m.is_nan());
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_get_adjustment_rejects_non_positive_distance() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        assert!(matches!(
            sim.get_adjustment(0.0, 0.0),
            Err(BallisticsError::Configuration(_))
        ));
    }

    #[test]
    fn test_shoot_at_slope() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.zero(100.0).unwrap();
        let shot = sim.shoot_at(300.0, -10.0).unwrap();

        assert_relative_eq!(shot.target.x, 300.0 * 10f64.to_radians().cos(), epsilon = 1e-9);
        assert_relative_eq!(shot.target.y, -300.0 * 10f64.to_radians().sin(), epsilon = 1e-9);
        assert_relative_eq!(sim.elevation(), 1000.0 * shot.target.y / 300.0, epsilon = 1e-9);

        let closest = sim.closest_sample(shot.target.x).unwrap();
        assert!((closest.position.y - shot.target.y).abs() < ZERO_TOLERANCE_M);
    }

    #[test]
    fn test_adjustment_table() {
        let mut sim = gravity_only(800.0, 0.1, 50);
        sim.zero(100.0).unwrap();
        let rows = sim.adjustment_table(0.0, 2.0, 0.5, 1000.0, 0.15).unwrap();

        assert_eq!(rows.len(), 4);
        let adjustments: Vec<f64> = rows.iter().map(|(a, _)| *a).collect();
        assert_eq!(adjustments, vec![0.0, 0.5, 1.0, 1.5]);
        // More elevation carries the shot further before it leaves the band
        for pair in rows.windows(2) {
            assert!(pair[1].1.position.x >= pair[0].1.position.x);
        }

        assert!(sim.adjustment_table(0.0, 1.0, 0.0, 1000.0, 0.15).is_err());
    }
}

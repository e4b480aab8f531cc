/// Physical constants and solver defaults used by the simulator

/// Gravitational acceleration in m/s²
pub const G_ACCEL_MPS2: f64 = 9.80665;

/// Speed of sound used to convert drag table Mach numbers to m/s
///
/// Value: 340.29 m/s (1116.8 ft/s)
/// Conditions: 15°C (59°F), 1013.25 hPa, dry air
///
/// Source: International Standard Atmosphere (ISO 2533)
pub const SPEED_OF_SOUND_MPS: f64 = 340.29;

/// Air density at sea level, 1 atm and 15°C (kg/m³)
pub const STANDARD_AIR_DENSITY: f64 = 1.225;

/// Vertical offset of the bore below the line of sight at the muzzle (meters)
///
/// Every simulation starts at `(0, -SIGHT_HEIGHT_M)`, so `y = 0` is the
/// line of sight and a zeroed trajectory crosses it twice.
pub const SIGHT_HEIGHT_M: f64 = 0.0416;

/// Extra distance past the target before a shot is cut off (meters)
pub const RANGE_OVERSHOOT_M: f64 = 10.0;

/// Default maximum drop before a shot is cut off (meters)
pub const DEFAULT_MAX_DROP_M: f64 = 20.0;

/// Vertical miss accepted by the zero solver (meters)
pub const ZERO_TOLERANCE_M: f64 = 0.05;

/// Iteration cap for the zero solver
pub const DEFAULT_MAX_ZERO_ITERATIONS: usize = 200;

/// Default integration timestep (milliseconds)
pub const DEFAULT_TIMESTEP_MS: f64 = 0.1;

/// Default number of steps between two logged samples
pub const DEFAULT_LOG_INTERVAL: u64 = 50;

/// Conventional 100 yard zero distance (meters)
pub const DEFAULT_ZERO_DISTANCE_M: f64 = 91.44;

/// Milliradians per radian
pub const MILLIRADIANS_PER_RADIAN: f64 = 1000.0;

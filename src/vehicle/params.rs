use serde::{Deserialize, Serialize};

/// The tunable constants of the vehicle model.
///
/// Speeds are in length units per second and accelerations in length
/// units per second squared.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulatorParams {
    /// Acceleration at full throttle.
    pub acceleration_factor: f64,
    /// Constant deceleration while moving.
    pub rolling_resistance: f64,
    /// Extra deceleration per radian of heading change over one unit of travel.
    pub turn_friction_coef: f64,
    /// The largest `speed² × heading change` the tyres can hold before the car leaves the rail.
    pub max_grip_force: f64,
    /// Upper limit on speed.
    pub max_speed: f64,
    /// Below this speed the car never crashes.
    pub crash_min_speed: f64,
    /// Below this heading change, in radians per unit, the car never crashes.
    pub crash_min_angle: f64,
}

impl Default for SimulatorParams {
    fn default() -> Self {
        Self {
            acceleration_factor: 600.0,
            rolling_resistance: 40.0,
            turn_friction_coef: 1500.0,
            max_grip_force: 11000.0,
            max_speed: 500.0,
            crash_min_speed: 50.0,
            crash_min_angle: 0.05,
        }
    }
}

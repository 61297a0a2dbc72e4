use super::params::SimulatorParams;
use crate::math::signed_angle;
use crate::segment::Side;
use crate::track::Track;

/// The signed change in heading between a point on a rail and the point
/// `ahead` units further along it, in radians.
pub fn heading_change(track: &Track, distance: f64, side: Side, ahead: f64) -> f64 {
    let here = track.tangent_at(distance, side);
    let there = track.tangent_at(distance + ahead, side);
    signed_angle(here, there)
}

/// The heading change over the next unit of travel, used as a local
/// curvature estimate.
pub fn curvature(track: &Track, distance: f64, side: Side) -> f64 {
    heading_change(track, distance, side, 1.0).abs()
}

/// The combined rolling and cornering deceleration.
pub fn friction(params: &SimulatorParams, angle: f64) -> f64 {
    params.rolling_resistance + angle * params.turn_friction_coef
}

/// Whether the car loses grip at the given speed and curvature.
pub fn is_crash(params: &SimulatorParams, speed: f64, angle: f64) -> bool {
    if speed < params.crash_min_speed || angle < params.crash_min_angle {
        return false;
    }
    speed.powi(2) * angle > params.max_grip_force
}

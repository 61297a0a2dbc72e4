use super::Vector2d;
use cgmath::prelude::*;

/// Rotates a vector by +90 degrees (clockwise on screen, where y points down).
pub fn rot90(vec: Vector2d) -> Vector2d {
    Vector2d::new(-vec.y, vec.x)
}

/// Rotates a vector by -90 degrees (anticlockwise on screen, where y points down).
pub fn rot270(vec: Vector2d) -> Vector2d {
    Vector2d::new(vec.y, -vec.x)
}

/// The polar angle of a vector in radians.
pub fn polar_angle(vec: Vector2d) -> f64 {
    vec.y.atan2(vec.x)
}

/// The unit vector with the given polar angle.
pub fn unit_at(angle: f64) -> Vector2d {
    let (sin, cos) = angle.sin_cos();
    Vector2d::new(cos, sin)
}

/// The signed angle in radians that rotates `from` onto `to`, in `(-π, π]`.
pub fn signed_angle(from: Vector2d, to: Vector2d) -> f64 {
    from.angle(to).0
}

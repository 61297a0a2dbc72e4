//! Segment lists for the circuits used on the bench.

use crate::segment::SegmentKind::{self, *};

/// A long straight, a left turn and a short straight. Does not close,
/// so it can only be built with [Track::from_segments](super::Track::from_segments).
pub const L_SHAPE: &[SegmentKind] = &[Long, TurnLeft, Short];

/// A small oval driven with four left turns.
pub const ROUND: &[SegmentKind] = &[
    Short, Short, TurnLeft, Long, TurnLeft, Long, TurnLeft, Long, TurnLeft, Short,
];

/// The full circuit, mixing left and right turns.
pub const REAL: &[SegmentKind] = &[
    Short, Short, TurnRight, Short, Short, Short, TurnRight, TurnLeft, Short, TurnLeft, Short,
    TurnRight, Short, TurnLeft, TurnLeft, Long, Long, Long, Long, Long, Long, Long, TurnLeft,
    Short, Short, Short, TurnLeft, Long, Short, TurnRight, TurnLeft, TurnLeft,
];

/// Looks up a preset by name.
pub fn by_name(name: &str) -> Option<&'static [SegmentKind]> {
    match name {
        "l_shape" => Some(L_SHAPE),
        "round" => Some(ROUND),
        "real" => Some(REAL),
        _ => None,
    }
}

/// The names accepted by [by_name].
pub const NAMES: &[&str] = &["l_shape", "round", "real"];

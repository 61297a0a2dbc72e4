//! The vocabulary of track pieces and the constants that size them.

use crate::error::{TrackError, TrackResult};
use crate::math::{rot270, rot90, Vector2d};
use serde::{Deserialize, Serialize};
use std::f64::consts::FRAC_PI_2;
use std::str::FromStr;

/// Length of a short straight piece.
pub const SHORT_LEN: f64 = 11.4;

/// Length of a long straight piece (three short pieces).
pub const LONG_LEN: f64 = 34.2;

/// Radius of a quarter turn, measured at the centre line.
pub const TURN_RADIUS: f64 = 17.1;

/// Width of the track.
pub const TRACK_WIDTH: f64 = SHORT_LEN;

/// Lateral distance between the centre line and either rail.
pub const RAIL_OFFSET: f64 = TRACK_WIDTH / 4.0;

/// Radius of the rail on the inner side of a turn's curve.
pub const INNER_RAIL_RADIUS: f64 = SHORT_LEN + SHORT_LEN / 4.0;

/// Radius of the rail on the outer side of a turn's curve.
pub const OUTER_RAIL_RADIUS: f64 = 2.0 * SHORT_LEN - SHORT_LEN / 4.0;

/// A piece of track.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    Long,
    Short,
    TurnLeft,
    TurnRight,
}

/// The direction of a quarter turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnDirection {
    Left,
    Right,
}

/// One of the two rails of the track.
///
/// The inside rail sits on the side a left turn bends towards, which makes it
/// the inner rail of a circuit driven with left turns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Inside,
    Outside,
}

impl SegmentKind {
    /// Length of the piece along the centre line.
    pub fn length(self) -> f64 {
        match self {
            SegmentKind::Long => LONG_LEN,
            SegmentKind::Short => SHORT_LEN,
            SegmentKind::TurnLeft | SegmentKind::TurnRight => FRAC_PI_2 * TURN_RADIUS,
        }
    }

    /// Length of the piece along one of its rails.
    pub fn rail_length(self, side: Side) -> f64 {
        match self.turn() {
            Some(dir) => FRAC_PI_2 * dir.rail_radius(side),
            None => self.length(),
        }
    }

    /// The direction of the turn, if this piece is a turn.
    pub fn turn(self) -> Option<TurnDirection> {
        match self {
            SegmentKind::TurnLeft => Some(TurnDirection::Left),
            SegmentKind::TurnRight => Some(TurnDirection::Right),
            SegmentKind::Long | SegmentKind::Short => None,
        }
    }

    /// The single-letter tag used in textual track definitions.
    pub fn tag(self) -> char {
        match self {
            SegmentKind::Long => 'L',
            SegmentKind::Short => 'S',
            SegmentKind::TurnLeft => '<',
            SegmentKind::TurnRight => '>',
        }
    }
}

impl FromStr for SegmentKind {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l" | "long" => Ok(SegmentKind::Long),
            "s" | "short" => Ok(SegmentKind::Short),
            "<" | "left" | "turn_left" => Ok(SegmentKind::TurnLeft),
            ">" | "right" | "turn_right" => Ok(SegmentKind::TurnRight),
            _ => Err(TrackError::UnknownSegment(s.to_string())),
        }
    }
}

/// Parses a whitespace or comma separated list of segment tags,
/// e.g. `"S S < L < L < L < S"`.
pub fn parse_segments(text: &str) -> TrackResult<Vec<SegmentKind>> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|tag| !tag.is_empty())
        .map(str::parse)
        .collect()
}

impl TurnDirection {
    /// `+1` for right turns, `-1` for left turns.
    pub fn sign(self) -> f64 {
        match self {
            TurnDirection::Left => -1.0,
            TurnDirection::Right => 1.0,
        }
    }

    /// Rotates a heading by the quarter turn.
    pub fn rotate(self, heading: Vector2d) -> Vector2d {
        match self {
            TurnDirection::Left => rot270(heading),
            TurnDirection::Right => rot90(heading),
        }
    }

    /// The radius followed by the given rail through this turn.
    ///
    /// The inside rail hugs the curve of a left turn but runs around the
    /// outer edge of a right turn, and vice versa for the outside rail.
    pub fn rail_radius(self, side: Side) -> f64 {
        match (self, side) {
            (TurnDirection::Left, Side::Inside) | (TurnDirection::Right, Side::Outside) => {
                INNER_RAIL_RADIUS
            }
            (TurnDirection::Left, Side::Outside) | (TurnDirection::Right, Side::Inside) => {
                OUTER_RAIL_RADIUS
            }
        }
    }
}

impl Side {
    /// Both rails, inside first.
    pub const ALL: [Side; 2] = [Side::Inside, Side::Outside];

    /// The vector from the centre line to this rail, for a section
    /// with the given heading.
    pub fn lateral(self, heading: Vector2d) -> Vector2d {
        match self {
            Side::Inside => rot270(heading) * RAIL_OFFSET,
            Side::Outside => rot90(heading) * RAIL_OFFSET,
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            Side::Inside => 0,
            Side::Outside => 1,
        }
    }
}

impl FromStr for Side {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "inside" | "in" => Ok(Side::Inside),
            "outside" | "out" => Ok(Side::Outside),
            _ => Err(format!("unknown rail `{}`", s)),
        }
    }
}

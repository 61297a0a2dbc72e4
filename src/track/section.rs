use crate::math::{polar_angle, rot270, rot90, unit_at, Point2d, Vector2d};
use crate::segment::{SegmentKind, Side, TurnDirection, TURN_RADIUS};
use crate::util::Interval;
use serde::{Deserialize, Serialize};

/// The cumulative distance range a section covers, along the centre line
/// and along each rail.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Spans {
    pub centre: Interval<f64>,
    pub inside: Interval<f64>,
    pub outside: Interval<f64>,
}

impl Spans {
    /// The span along the given rail.
    pub fn rail(&self, side: Side) -> Interval<f64> {
        match side {
            Side::Inside => self.inside,
            Side::Outside => self.outside,
        }
    }
}

/// A placed piece of track.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Section {
    Straight(Straight),
    Turn(Turn),
}

/// A straight section.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Straight {
    pub(crate) kind: SegmentKind,
    /// The centre line position where the section begins.
    pub(crate) start: Point2d,
    /// The unit direction of travel.
    pub(crate) heading: Vector2d,
    pub(crate) length: f64,
    pub(crate) spans: Spans,
}

/// A quarter-circle turn.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    pub(crate) direction: TurnDirection,
    /// The centre line position where the turn begins.
    pub(crate) start: Point2d,
    /// The heading on entry.
    pub(crate) heading: Vector2d,
    /// The heading on exit, rotated a quarter turn from `heading`.
    pub(crate) exit_heading: Vector2d,
    /// The centre of the arc.
    pub(crate) centre: Point2d,
    pub(crate) spans: Spans,
}

impl Section {
    /// The kind of piece this section was placed from.
    pub fn kind(&self) -> SegmentKind {
        match self {
            Section::Straight(s) => s.kind,
            Section::Turn(t) => match t.direction {
                TurnDirection::Left => SegmentKind::TurnLeft,
                TurnDirection::Right => SegmentKind::TurnRight,
            },
        }
    }

    /// The distance ranges covered by the section.
    pub fn spans(&self) -> &Spans {
        match self {
            Section::Straight(s) => &s.spans,
            Section::Turn(t) => &t.spans,
        }
    }

    /// The centre line position at the start of the section.
    pub fn start(&self) -> Point2d {
        match self {
            Section::Straight(s) => s.start,
            Section::Turn(t) => t.start,
        }
    }

    /// The heading on entry to the section.
    pub fn heading(&self) -> Vector2d {
        match self {
            Section::Straight(s) => s.heading,
            Section::Turn(t) => t.heading,
        }
    }

    /// The centre line position and heading at the end of the section.
    pub fn end_pose(&self) -> (Point2d, Vector2d) {
        match self {
            Section::Straight(s) => (s.start + s.heading * s.length, s.heading),
            Section::Turn(t) => (t.centre + t.heading * TURN_RADIUS, t.exit_heading),
        }
    }

    /// Samples a rail at `dist` units past the start of the section,
    /// measured along that rail.
    pub fn position(&self, dist: f64, side: Side) -> Point2d {
        match self {
            Section::Straight(s) => s.start + side.lateral(s.heading) + s.heading * dist,
            Section::Turn(t) => {
                let radius = t.direction.rail_radius(side);
                t.centre + unit_at(t.rail_angle(dist, side)) * radius
            }
        }
    }

    /// The unit direction of travel along a rail at `dist` units past
    /// the start of the section.
    pub fn tangent(&self, dist: f64, side: Side) -> Vector2d {
        match self {
            Section::Straight(s) => s.heading,
            Section::Turn(t) => {
                let radial = unit_at(t.rail_angle(dist, side));
                match t.direction {
                    TurnDirection::Left => rot270(radial),
                    TurnDirection::Right => rot90(radial),
                }
            }
        }
    }

    /// Samples the centre line at `dist` units past the start of the section.
    pub fn centre_position(&self, dist: f64) -> Point2d {
        match self {
            Section::Straight(s) => s.start + s.heading * dist,
            Section::Turn(t) => {
                let radial = polar_angle(t.start - t.centre);
                let angle = radial + t.direction.sign() * dist / TURN_RADIUS;
                t.centre + unit_at(angle) * TURN_RADIUS
            }
        }
    }
}

impl Turn {
    /// The polar angle, around the arc centre, of a point `dist` units
    /// along the given rail.
    fn rail_angle(&self, dist: f64, side: Side) -> f64 {
        // The rail enters the turn offset from the incoming heading,
        // which keeps it continuous with the preceding straight's rail.
        let entry = self.start + side.lateral(self.heading);
        let radial = polar_angle(entry - self.centre);
        radial + self.direction.sign() * dist / self.direction.rail_radius(side)
    }
}

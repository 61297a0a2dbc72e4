use super::section::{Section, Spans, Straight, Turn};
use crate::math::{Point2d, Vector2d};
use crate::segment::{SegmentKind, Side, TURN_RADIUS};
use crate::util::Interval;

/// Lays out segments head-to-tail, producing placed sections.
#[derive(Clone, Copy, Debug)]
pub struct TrackBuilder {
    origin: Point2d,
    heading: Vector2d,
}

/// Running totals of the distance laid down so far.
#[derive(Clone, Copy, Default)]
struct Totals {
    centre: f64,
    inside: f64,
    outside: f64,
}

impl Default for TrackBuilder {
    fn default() -> Self {
        Self {
            origin: Point2d::new(0.0, 0.0),
            heading: Vector2d::new(1.0, 0.0),
        }
    }
}

impl TrackBuilder {
    /// Creates a builder that starts at the origin heading along +x.
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the position of the start of the first section.
    pub fn origin(mut self, origin: Point2d) -> Self {
        self.origin = origin;
        self
    }

    /// The position of the start of the first section.
    pub fn start(&self) -> Point2d {
        self.origin
    }

    /// The heading at the start of the first section.
    pub fn start_heading(&self) -> Vector2d {
        self.heading
    }

    /// Places each segment in turn, starting from the builder's origin.
    pub fn build(&self, segments: &[SegmentKind]) -> Vec<Section> {
        let mut pos = self.origin;
        let mut heading = self.heading;
        let mut totals = Totals::default();
        let mut sections = Vec::with_capacity(segments.len());

        for &kind in segments {
            let spans = totals.advance(kind);
            match kind.turn() {
                None => {
                    let length = kind.length();
                    sections.push(Section::Straight(Straight {
                        kind,
                        start: pos,
                        heading,
                        length,
                        spans,
                    }));
                    pos += heading * length;
                }
                Some(direction) => {
                    // The exit heading points from the entry towards the arc centre
                    let exit_heading = direction.rotate(heading);
                    let centre = pos + exit_heading * TURN_RADIUS;
                    sections.push(Section::Turn(Turn {
                        direction,
                        start: pos,
                        heading,
                        exit_heading,
                        centre,
                        spans,
                    }));
                    pos = centre + heading * TURN_RADIUS;
                    heading = exit_heading;
                }
            }
        }

        sections
    }
}

impl Totals {
    /// Accumulates a segment's lengths and returns the spans it covers.
    fn advance(&mut self, kind: SegmentKind) -> Spans {
        let span = |start: &mut f64, len: f64| {
            let span = Interval::new(*start, *start + len);
            *start = span.max;
            span
        };
        Spans {
            centre: span(&mut self.centre, kind.length()),
            inside: span(&mut self.inside, kind.rail_length(Side::Inside)),
            outside: span(&mut self.outside, kind.rail_length(Side::Outside)),
        }
    }
}

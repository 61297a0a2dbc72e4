use crate::error::{TrackError, TrackResult};
use crate::math::{signed_angle, Point2d, Vector2d};
use crate::segment::{SegmentKind, Side};
use crate::util::{wrap, Interval};
use cgmath::prelude::*;
use itertools::Itertools;
use log::{debug, warn};

pub use builder::TrackBuilder;
pub use section::{Section, Spans, Straight, Turn};

mod builder;
pub mod presets;
mod section;

/// The largest gap, in length units, tolerated between the end of the last
/// section and the start of the first one.
const CLOSURE_TOLERANCE: f64 = 1e-6;

/// Spacing of the rail samples used to compute the bounding box.
const BOUNDS_STEP: f64 = 0.5;

/// A track made of placed sections.
///
/// Every distance argument is wrapped modulo the length of the path it
/// refers to, so negative distances and distances beyond one lap are valid.
#[derive(Clone, Debug)]
pub struct Track {
    /// The segments the track was built from.
    segments: Vec<SegmentKind>,
    /// The placed sections, in driving order.
    sections: Vec<Section>,
    /// The pose the first section starts from.
    start: (Point2d, Vector2d),
    /// Total length of the centre line.
    length: f64,
    /// Total length of each rail, indexed by [Side].
    rail_lengths: [f64; 2],
}

impl Track {
    /// Builds a track from the origin without checking that it closes.
    pub fn from_segments(segments: &[SegmentKind]) -> Self {
        Self::with_builder(&TrackBuilder::new(), segments)
    }

    /// Builds a track with the given builder without checking that it closes.
    pub fn with_builder(builder: &TrackBuilder, segments: &[SegmentKind]) -> Self {
        let sections = builder.build(segments);
        let total = |span: fn(&Spans) -> Interval<f64>| {
            sections.last().map(|s| span(s.spans()).max).unwrap_or(0.0)
        };
        let length = total(|s| s.centre);
        let rail_lengths = [total(|s| s.inside), total(|s| s.outside)];
        debug!(
            "Built track of {} sections: centre {:.3}, inside {:.3}, outside {:.3}",
            sections.len(),
            length,
            rail_lengths[0],
            rail_lengths[1]
        );
        Self {
            segments: segments.to_vec(),
            sections,
            start: (builder.start(), builder.start_heading()),
            length,
            rail_lengths,
        }
    }

    /// Builds a track from the origin and checks that it forms a closed loop.
    pub fn closed(segments: &[SegmentKind]) -> TrackResult<Self> {
        let track = Self::from_segments(segments);
        track.validate_closed()?;
        Ok(track)
    }

    /// Checks that the last section ends where the first one starts,
    /// facing the same way.
    pub fn validate_closed(&self) -> TrackResult<()> {
        let last = self.sections.last().ok_or(TrackError::Empty)?;
        let (end, end_heading) = last.end_pose();
        let (start, start_heading) = self.start;
        let gap = (end - start).magnitude();
        let heading_error = signed_angle(start_heading, end_heading).abs();
        if gap > CLOSURE_TOLERANCE || heading_error > CLOSURE_TOLERANCE {
            warn!(
                "Track of {} sections does not close (gap {:.4}, heading error {:.4})",
                self.sections.len(),
                gap,
                heading_error
            );
            return Err(TrackError::NotClosed { gap, heading_error });
        }
        Ok(())
    }

    /// The segments the track was built from.
    pub fn segments(&self) -> &[SegmentKind] {
        &self.segments
    }

    /// The placed sections, in driving order.
    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Total length of the centre line.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Total length of one rail.
    pub fn rail_length(&self, side: Side) -> f64 {
        self.rail_lengths[side.index()]
    }

    /// The section containing the given centre line distance.
    pub fn section_at(&self, distance: f64) -> &Section {
        self.locate(distance, self.length, |s| s.centre).0
    }

    /// The section containing the given distance along a rail.
    pub fn section_at_rail(&self, distance: f64, side: Side) -> &Section {
        self.locate_rail(distance, side).0
    }

    /// The position of a point on a rail.
    pub fn position_at(&self, distance: f64, side: Side) -> Point2d {
        let (section, dist) = self.locate_rail(distance, side);
        section.position(dist, side)
    }

    /// The unit direction of travel at a point on a rail.
    pub fn tangent_at(&self, distance: f64, side: Side) -> Vector2d {
        let (section, dist) = self.locate_rail(distance, side);
        section.tangent(dist, side)
    }

    /// The position of a point on the centre line.
    pub fn centre_position_at(&self, distance: f64) -> Point2d {
        let (section, dist) = self.locate(distance, self.length, |s| s.centre);
        section.centre_position(dist)
    }

    /// The axis-aligned box enclosing both rails, as `(min, max)` corners.
    pub fn bounds(&self) -> (Point2d, Point2d) {
        let points = Side::ALL.into_iter().flat_map(|side| {
            let len = self.rail_length(side);
            let count = (len / BOUNDS_STEP).ceil() as usize;
            (0..=count).map(move |i| self.position_at(i as f64 * BOUNDS_STEP, side))
        });
        let xs = points.clone().map(|p| p.x).minmax();
        let ys = points.map(|p| p.y).minmax();
        match (xs.into_option(), ys.into_option()) {
            (Some((x0, x1)), Some((y0, y1))) => (Point2d::new(x0, y0), Point2d::new(x1, y1)),
            _ => (self.start.0, self.start.0),
        }
    }

    fn locate_rail(&self, distance: f64, side: Side) -> (&Section, f64) {
        match side {
            Side::Inside => self.locate(distance, self.rail_lengths[0], |s| s.inside),
            Side::Outside => self.locate(distance, self.rail_lengths[1], |s| s.outside),
        }
    }

    /// Finds the section containing `distance` (wrapped modulo `total`) and
    /// the distance remaining past the start of that section.
    fn locate(
        &self,
        distance: f64,
        total: f64,
        span: impl Fn(&Spans) -> Interval<f64>,
    ) -> (&Section, f64) {
        let distance = wrap(distance, total);
        let idx = self
            .sections
            .partition_point(|s| span(s.spans()).max <= distance);
        match self.sections.get(idx) {
            Some(section) if span(section.spans()).contains_half_open(distance) => {
                (section, distance - span(section.spans()).min)
            }
            _ => unreachable!(
                "no section contains distance {} of {} ({} sections)",
                distance,
                total,
                self.sections.len()
            ),
        }
    }
}

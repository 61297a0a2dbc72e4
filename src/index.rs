//! Maps points in the plane back to distances along the rails.

use crate::error::{IndexError, IndexResult};
use crate::math::Point2d;
use crate::segment::Side;
use crate::track::Track;
use fill::{breadth_fill, nearest_fill, Seed};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

pub use raster::RasterBounds;

mod fill;
mod raster;

/// How seed values are spread across the raster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FillStrategy {
    /// Breadth-first over 8-connected cells. Cheap, but which of two equally
    /// distant seeds wins depends on the order they were sampled in.
    #[default]
    Breadth,
    /// In order of straight-line distance to the seed, so cells take the
    /// value of the (near-)nearest rail sample.
    Nearest,
}

/// Options for building a [SpatialIndex].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexOptions {
    /// Spacing of the rail samples, in length units.
    pub resolution: f64,
    /// How sample values are spread to the rest of the raster.
    pub strategy: FillStrategy,
    /// How far, in cells, a sample may spread. Cells beyond this from every
    /// sample count as off the track. `None` fills the whole raster.
    pub reach: Option<u32>,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self {
            resolution: 1.0,
            strategy: FillStrategy::Breadth,
            reach: None,
        }
    }
}

/// A raster lookup from a point to the distance along a rail of the
/// rail sample nearest to it.
///
/// Built once from a [Track] and read-only afterwards.
#[derive(Clone, Debug)]
pub struct SpatialIndex {
    bounds: RasterBounds,
    options: IndexOptions,
    /// Cell values for each rail, indexed by [Side].
    layers: [Vec<Option<f64>>; 2],
}

impl SpatialIndex {
    /// Builds an index by breadth-first flood fill from rail samples
    /// spaced `resolution` units apart.
    pub fn build(track: &Track, bounds: RasterBounds, resolution: f64) -> IndexResult<Self> {
        Self::build_with(
            track,
            bounds,
            IndexOptions {
                resolution,
                ..Default::default()
            },
        )
    }

    /// Builds an index with the given options.
    pub fn build_with(
        track: &Track,
        bounds: RasterBounds,
        options: IndexOptions,
    ) -> IndexResult<Self> {
        if !(options.resolution > 0.0 && options.resolution.is_finite()) {
            return Err(IndexError::InvalidResolution(options.resolution));
        }
        if bounds.is_empty() {
            return Err(IndexError::EmptyRaster);
        }

        let layers = Side::ALL.map(|side| {
            let seeds = sample_rail(track, side, &bounds, options.resolution);
            let cells = match options.strategy {
                FillStrategy::Breadth => breadth_fill(&bounds, &seeds, options.reach),
                FillStrategy::Nearest => nearest_fill(&bounds, &seeds, options.reach),
            };
            debug!(
                "Indexed {:?} rail: {} seeds, {} of {} cells filled",
                side,
                seeds.len(),
                cells.iter().filter(|c| c.is_some()).count(),
                cells.len()
            );
            cells
        });

        Ok(Self {
            bounds,
            options,
            layers,
        })
    }

    /// The distance along a rail nearest to the point `(x, y)`, or `None`
    /// if the point is outside the raster or was never reached by the fill.
    pub fn query(&self, x: f64, y: f64, side: Side) -> Option<f64> {
        let idx = self.bounds.cell_at(Point2d::new(x, y))?;
        self.layers[side.index()][idx]
    }

    /// The raster the index covers.
    pub fn bounds(&self) -> RasterBounds {
        self.bounds
    }

    /// The options the index was built with.
    pub fn options(&self) -> IndexOptions {
        self.options
    }

    /// The number of cells holding a value for the given rail.
    pub fn filled_cells(&self, side: Side) -> usize {
        self.layers[side.index()]
            .iter()
            .filter(|c| c.is_some())
            .count()
    }
}

/// Samples a rail every `step` units, in increasing distance order.
fn sample_rail(track: &Track, side: Side, bounds: &RasterBounds, step: f64) -> Vec<Seed> {
    let len = track.rail_length(side);
    let count = (len / step).ceil() as usize;
    let mut outside = 0;
    let seeds = (0..count)
        .map(|i| i as f64 * step)
        .filter_map(|distance| {
            let cell = bounds.cell_at(track.position_at(distance, side));
            if cell.is_none() {
                outside += 1;
            }
            cell.map(|cell| Seed { cell, distance })
        })
        .collect();
    if outside > 0 {
        warn!(
            "{} of {} samples of the {:?} rail fall outside the raster",
            outside, count, side
        );
    }
    seeds
}

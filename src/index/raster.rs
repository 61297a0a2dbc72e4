use crate::math::Point2d;
use crate::track::Track;
use serde::{Deserialize, Serialize};

/// The offsets of the 8 neighbours of a cell, in the order they are visited.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// A rectangular grid of unit cells. Cell `(x, y)` covers the points that
/// round to those integer coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RasterBounds {
    /// Coordinates of the first cell.
    pub x: i32,
    pub y: i32,
    /// Number of cells along each axis.
    pub width: u32,
    pub height: u32,
}

impl RasterBounds {
    /// Creates a raster with its first cell at `(x, y)`.
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// The smallest raster covering both rails of a track, grown by
    /// `margin` units on every side.
    pub fn around(track: &Track, margin: f64) -> Self {
        let (min, max) = track.bounds();
        let x0 = (min.x - margin).floor() as i32;
        let y0 = (min.y - margin).floor() as i32;
        let x1 = (max.x + margin).ceil() as i32;
        let y1 = (max.y + margin).ceil() as i32;
        Self::new(x0, y0, (x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32)
    }

    /// The total number of cells.
    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Whether the raster has no cells.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index of the cell containing a point, if it lies in the raster.
    pub fn cell_at(&self, point: Point2d) -> Option<usize> {
        let (x, y) = (point.x.round(), point.y.round());
        if !x.is_finite() || !y.is_finite() {
            return None;
        }
        self.cell(x as i64, y as i64)
    }

    /// The integer coordinates of a cell.
    pub fn coords(&self, idx: usize) -> (i64, i64) {
        let w = self.width as usize;
        ((idx % w) as i64 + self.x as i64, (idx / w) as i64 + self.y as i64)
    }

    /// The cells adjacent to `idx`, including diagonals, that lie in the raster.
    pub fn neighbours(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let (x, y) = self.coords(idx);
        NEIGHBOURS
            .iter()
            .filter_map(move |(dx, dy)| self.cell(x + *dx as i64, y + *dy as i64))
    }

    fn cell(&self, x: i64, y: i64) -> Option<usize> {
        let (cx, cy) = (x - self.x as i64, y - self.y as i64);
        if cx < 0 || cy < 0 || cx >= self.width as i64 || cy >= self.height as i64 {
            return None;
        }
        Some(cy as usize * self.width as usize + cx as usize)
    }
}

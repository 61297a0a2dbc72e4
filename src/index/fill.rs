use super::raster::RasterBounds;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, VecDeque};

/// A rail sample placed in the raster.
#[derive(Clone, Copy, Debug)]
pub struct Seed {
    /// The cell the sample rounds to.
    pub cell: usize,
    /// The distance along the rail of the sample.
    pub distance: f64,
}

/// Spreads seed values outward in breadth-first order over 8-connected
/// cells. A cell takes the value of whichever neighbour reaches it first and
/// keeps it. Seeds earlier in the list win ties.
///
/// With `reach` set, cells more than that many steps from every seed are
/// left empty.
pub fn breadth_fill(bounds: &RasterBounds, seeds: &[Seed], reach: Option<u32>) -> Vec<Option<f64>> {
    let mut cells = vec![None; bounds.len()];
    let mut queue = VecDeque::with_capacity(seeds.len());

    for seed in seeds {
        if cells[seed.cell].is_none() {
            cells[seed.cell] = Some(seed.distance);
            queue.push_back((seed.cell, 0));
        }
    }

    while let Some((idx, depth)) = queue.pop_front() {
        if reach.map_or(false, |reach| depth >= reach) {
            continue;
        }
        let value = cells[idx];
        for n in bounds.neighbours(idx) {
            if cells[n].is_none() {
                cells[n] = value;
                queue.push_back((n, depth + 1));
            }
        }
    }

    cells
}

/// Spreads seed values outward in order of distance from the owning seed,
/// so each cell ends up with the value of a near-nearest seed regardless of
/// the order the seeds were listed in. Equal distances are broken by cell index.
///
/// With `reach` set, cells further than that many units from their seed
/// are left empty.
pub fn nearest_fill(bounds: &RasterBounds, seeds: &[Seed], reach: Option<u32>) -> Vec<Option<f64>> {
    let max_dist2 = reach.map(|r| (r as i64).pow(2));
    let mut owner: Vec<Option<usize>> = vec![None; bounds.len()];
    let mut dist2 = vec![i64::MAX; bounds.len()];
    let mut heap = BinaryHeap::with_capacity(seeds.len());

    for (i, seed) in seeds.iter().enumerate() {
        if owner[seed.cell].is_none() {
            owner[seed.cell] = Some(i);
            dist2[seed.cell] = 0;
            heap.push(Reverse((0, seed.cell)));
        }
    }

    while let Some(Reverse((d2, idx))) = heap.pop() {
        if d2 > dist2[idx] {
            continue;
        }
        let Some(seed) = owner[idx] else { continue };
        let (sx, sy) = bounds.coords(seeds[seed].cell);
        for n in bounds.neighbours(idx) {
            let (nx, ny) = bounds.coords(n);
            let nd2 = (nx - sx).pow(2) + (ny - sy).pow(2);
            if nd2 < dist2[n] && max_dist2.map_or(true, |max| nd2 <= max) {
                dist2[n] = nd2;
                owner[n] = Some(seed);
                heap.push(Reverse((nd2, n)));
            }
        }
    }

    owner
        .into_iter()
        .map(|seed| seed.map(|i| seeds[i].distance))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    fn seeds(bounds: &RasterBounds, points: &[((i64, i64), f64)]) -> Vec<Seed> {
        points
            .iter()
            .map(|&((x, y), distance)| Seed {
                cell: bounds.cell_at(crate::math::Point2d::new(x as f64, y as f64)).unwrap(),
                distance,
            })
            .collect()
    }

    #[test]
    fn breadth_fill_reaches_every_cell() {
        let bounds = RasterBounds::new(0, 0, 10, 10);
        let cells = breadth_fill(&bounds, &seeds(&bounds, &[((5, 5), 1.0)]), None);
        assert!(cells.iter().all(|c| *c == Some(1.0)));
    }

    #[test]
    fn first_seed_wins_shared_cell() {
        let bounds = RasterBounds::new(0, 0, 4, 4);
        let cells = breadth_fill(&bounds, &seeds(&bounds, &[((1, 1), 1.0), ((1, 1), 2.0)]), None);
        assert_eq!(cells[bounds.cell_at(crate::math::Point2d::new(1.0, 1.0)).unwrap()], Some(1.0));
    }

    #[test]
    fn reach_limits_spread() {
        let bounds = RasterBounds::new(0, 0, 20, 1);
        let cells = breadth_fill(&bounds, &seeds(&bounds, &[((0, 0), 7.0)]), Some(3));
        assert_eq!(cells.iter().filter(|c| c.is_some()).count(), 4);
        let cells = nearest_fill(&bounds, &seeds(&bounds, &[((0, 0), 7.0)]), Some(3));
        assert_eq!(cells.iter().filter(|c| c.is_some()).count(), 4);
    }

    #[test]
    fn nearest_fill_splits_between_seeds() {
        let bounds = RasterBounds::new(0, 0, 21, 21);
        let seeds = seeds(&bounds, &[((2, 10), 1.0), ((18, 10), 2.0)]);
        let cells = nearest_fill(&bounds, &seeds, None);
        for (idx, cell) in cells.iter().enumerate() {
            let (x, _) = bounds.coords(idx);
            if x < 10 {
                assert_eq!(*cell, Some(1.0));
            } else if x > 10 {
                assert_eq!(*cell, Some(2.0));
            }
        }
    }

    #[test]
    fn nearest_fill_ignores_seed_order_for_distance() {
        // A diagonal seed is one breadth-first step away from (3, 3) just like the
        // straight one, but the straight seed is closer.
        let bounds = RasterBounds::new(0, 0, 7, 7);
        let seeds = seeds(&bounds, &[((2, 2), 1.0), ((3, 2), 2.0)]);
        let target = bounds.cell_at(crate::math::Point2d::new(3.0, 3.0)).unwrap();
        assert_eq!(breadth_fill(&bounds, &seeds, None)[target], Some(1.0));
        assert_eq!(nearest_fill(&bounds, &seeds, None)[target], Some(2.0));
    }
}

/// Counts laps from a stream of wrapped rail distance readings.
///
/// A reading that falls more than `threshold` below the previous one is
/// taken to mean the car crossed the start line.
#[derive(Clone, Copy, Debug)]
pub struct LapCounter {
    rail_length: f64,
    threshold: f64,
    laps: u32,
    previous: Option<f64>,
}

impl LapCounter {
    /// Creates a counter that detects a lap on a drop of more than half the rail.
    pub fn new(rail_length: f64) -> Self {
        Self::with_threshold(rail_length, 0.5 * rail_length)
    }

    pub fn with_threshold(rail_length: f64, threshold: f64) -> Self {
        Self {
            rail_length,
            threshold,
            laps: 0,
            previous: None,
        }
    }

    /// Starts counting from a number of laps already completed.
    pub fn starting_at(mut self, laps: u32) -> Self {
        self.laps = laps;
        self
    }

    /// Records a reading. Returns `true` if it completed a lap.
    pub fn observe(&mut self, reading: f64) -> bool {
        let lapped = self
            .previous
            .map_or(false, |previous| reading < previous - self.threshold);
        if lapped {
            self.laps += 1;
        }
        self.previous = Some(reading);
        lapped
    }

    /// The number of completed laps.
    pub fn laps(&self) -> u32 {
        self.laps
    }

    /// The total distance travelled up to the last reading.
    pub fn unwrapped(&self) -> Option<f64> {
        self.previous
            .map(|reading| self.laps as f64 * self.rail_length + reading)
    }

    /// Forgets all readings and laps.
    pub fn reset(&mut self) {
        self.laps = 0;
        self.previous = None;
    }
}

use crate::error::{CalibrationError, CalibrationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One reading taken from the bench car.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Seconds since the start of the run.
    pub time: f64,
    /// The throttle applied from this reading until the next.
    pub input: f64,
    /// Distance along the rail, wrapped to one lap.
    pub rail_distance: f64,
    /// Laps completed before this reading.
    pub laps: u32,
    /// Whether the car had left the rail.
    pub crashed: bool,
}

/// A sample as written by the data collector, keyed by its timestamp.
#[derive(Deserialize)]
struct RecordedSample {
    input: f64,
    rail_distance: f64,
    nb_turns: u32,
    crashed: bool,
}

/// A recorded run of the bench car, in time order.
#[derive(Clone, Debug, PartialEq)]
pub struct Experiment {
    samples: Vec<Sample>,
}

impl Experiment {
    /// Creates an experiment from samples in any order.
    pub fn new(mut samples: Vec<Sample>) -> CalibrationResult<Self> {
        if samples.len() < 2 {
            return Err(CalibrationError::TooFewSamples(samples.len()));
        }
        samples.sort_by(|a, b| a.time.total_cmp(&b.time));
        Ok(Self { samples })
    }

    /// Parses a JSON object mapping timestamps to readings, e.g.
    /// `{"0.0": {"input": 0.2, "rail_distance": 0.0, "nb_turns": 0, "crashed": false}, ...}`.
    pub fn from_json(json: &str) -> CalibrationResult<Self> {
        let recorded: HashMap<String, RecordedSample> = serde_json::from_str(json)?;
        let samples = recorded
            .into_iter()
            .map(|(key, s)| {
                let time = key
                    .trim()
                    .parse::<f64>()
                    .ok()
                    .filter(|t| t.is_finite())
                    .ok_or_else(|| CalibrationError::InvalidTimestamp(key.clone()))?;
                Ok(Sample {
                    time,
                    input: s.input,
                    rail_distance: s.rail_distance,
                    laps: s.nb_turns,
                    crashed: s.crashed,
                })
            })
            .collect::<CalibrationResult<Vec<_>>>()?;
        Self::new(samples)
    }

    /// The samples in time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Whether the car crashed at any point in the run.
    pub fn crashed(&self) -> bool {
        self.samples.iter().any(|s| s.crashed)
    }

    /// The length of the run in seconds.
    pub fn duration(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => last.time - first.time,
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const RECORDING: &str = r#"{
        "0.5": {"input": 0.2, "rail_distance": 3.0, "nb_turns": 0, "crashed": false},
        "0.0": {"input": 0.2, "rail_distance": 0.0, "nb_turns": 0, "crashed": false},
        "1.25": {"input": 0.0, "rail_distance": 1.0, "nb_turns": 1, "crashed": true}
    }"#;

    #[test]
    fn parses_and_sorts_by_time() {
        let experiment = Experiment::from_json(RECORDING).unwrap();
        let times: Vec<_> = experiment.samples().iter().map(|s| s.time).collect();
        assert_eq!(times, vec![0.0, 0.5, 1.25]);
        assert_eq!(experiment.samples()[2].laps, 1);
        assert!(experiment.crashed());
        assert_approx_eq!(experiment.duration(), 1.25);
    }

    #[test]
    fn rejects_bad_recordings() {
        assert!(matches!(
            Experiment::from_json("[1, 2]"),
            Err(CalibrationError::Json(_))
        ));
        assert!(matches!(
            Experiment::from_json(
                r#"{"soon": {"input": 0.2, "rail_distance": 0.0, "nb_turns": 0, "crashed": false},
                    "1.0": {"input": 0.2, "rail_distance": 0.0, "nb_turns": 0, "crashed": false}}"#
            ),
            Err(CalibrationError::InvalidTimestamp(key)) if key == "soon"
        ));
        assert!(matches!(
            Experiment::from_json(
                r#"{"0.0": {"input": 0.2, "rail_distance": 0.0, "nb_turns": 0, "crashed": false}}"#
            ),
            Err(CalibrationError::TooFewSamples(1))
        ));
    }
}

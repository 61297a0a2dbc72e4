//! Fitting the vehicle model to runs recorded on the real track.

use crate::error::{CalibrationError, CalibrationResult};
use crate::lap::LapCounter;
use crate::segment::Side;
use crate::track::Track;
use crate::util::Interval;
use crate::vehicle::{Simulator, SimulatorParams};
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::Distribution;
use serde::{Deserialize, Serialize};

pub use experiment::{Experiment, Sample};

mod experiment;

/// Added to the loss when the simulated car crashes and the real one did not,
/// or the other way round.
pub const CRASH_PENALTY: f64 = 100.0;

/// Replays an experiment through the simulator and measures how far the
/// simulated car strays from the recorded one.
///
/// The car is placed at the first recorded distance and driven with each
/// recorded throttle until the next timestamp. The loss is the sum of the
/// squared differences in total distance travelled, plus [CRASH_PENALTY]
/// if the crash behaviour disagrees. Replay stops at the first simulated crash.
pub fn experiment_loss(
    track: &Track,
    side: Side,
    params: SimulatorParams,
    experiment: &Experiment,
) -> f64 {
    let rail_length = track.rail_length(side);
    let samples = experiment.samples();
    let first = &samples[0];

    let mut sim = Simulator::with_params(track, side, params);
    sim.place(first.rail_distance);
    let mut laps = LapCounter::new(rail_length).starting_at(first.laps);
    laps.observe(sim.rail_distance());

    let mut loss = 0.0;
    for (current, next) in samples.iter().zip(&samples[1..]) {
        let (crashed, snapshot) = sim.step(current.input, next.time - current.time);
        laps.observe(snapshot.rail_distance);

        let recorded = next.laps as f64 * rail_length + next.rail_distance;
        let simulated = laps.unwrapped().unwrap_or(snapshot.rail_distance);
        loss += (recorded - simulated).powi(2);

        if crashed {
            if !next.crashed {
                loss += CRASH_PENALTY;
            }
            return loss;
        }
    }

    if experiment.crashed() {
        loss += CRASH_PENALTY;
    }
    loss
}

/// The search box for the fitted parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamBounds {
    pub acceleration_factor: Interval<f64>,
    pub rolling_resistance: Interval<f64>,
    pub max_grip_force: Interval<f64>,
    pub turn_friction_coef: Interval<f64>,
}

impl Default for ParamBounds {
    fn default() -> Self {
        Self {
            acceleration_factor: Interval::new(2000.0, 12000.0),
            rolling_resistance: Interval::new(100.0, 5000.0),
            max_grip_force: Interval::new(3000.0, 15000.0),
            turn_friction_coef: Interval::new(1000.0, 6000.0),
        }
    }
}

impl ParamBounds {
    /// A box containing only the given parameters.
    pub fn exactly(params: &SimulatorParams) -> Self {
        let point = |v| Interval::new(v, v);
        Self {
            acceleration_factor: point(params.acceleration_factor),
            rolling_resistance: point(params.rolling_resistance),
            max_grip_force: point(params.max_grip_force),
            turn_friction_coef: point(params.turn_friction_coef),
        }
    }

    /// Draws fitted parameters uniformly from the box.
    fn sample(&self, rng: &mut impl Rng, base: SimulatorParams) -> SimulatorParams {
        let mut draw = |span: Interval<f64>| span.lerp(rng.gen::<f64>());
        SimulatorParams {
            acceleration_factor: draw(self.acceleration_factor),
            rolling_resistance: draw(self.rolling_resistance),
            max_grip_force: draw(self.max_grip_force),
            turn_friction_coef: draw(self.turn_friction_coef),
            ..base
        }
    }

    /// Scales each fitted parameter by a random factor, staying inside the box.
    fn perturb(
        &self,
        rng: &mut impl Rng,
        distr: &impl Distribution<f64>,
        params: SimulatorParams,
    ) -> SimulatorParams {
        let mut nudge = |span: Interval<f64>, value: f64| span.clamp(value * distr.sample(&mut *rng));
        SimulatorParams {
            acceleration_factor: nudge(self.acceleration_factor, params.acceleration_factor),
            rolling_resistance: nudge(self.rolling_resistance, params.rolling_resistance),
            max_grip_force: nudge(self.max_grip_force, params.max_grip_force),
            turn_friction_coef: nudge(self.turn_friction_coef, params.turn_friction_coef),
            ..params
        }
    }
}

/// The best parameters found by a [Calibrator].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Fit {
    pub params: SimulatorParams,
    /// Mean experiment loss at `params`.
    pub loss: f64,
}

/// Searches for the vehicle parameters that best reproduce a set of experiments.
///
/// The search first draws `explore` points uniformly from the bounds, then
/// makes `refine` random multiplicative perturbations of the best point so far,
/// keeping any that lower the loss.
#[derive(Clone, Debug)]
pub struct Calibrator<'a> {
    track: &'a Track,
    side: Side,
    experiments: &'a [Experiment],
    bounds: ParamBounds,
    base: SimulatorParams,
    explore: usize,
    refine: usize,
    spread: f64,
    seed: u64,
}

impl<'a> Calibrator<'a> {
    pub fn new(track: &'a Track, side: Side, experiments: &'a [Experiment]) -> CalibrationResult<Self> {
        if experiments.is_empty() {
            return Err(CalibrationError::NoExperiments);
        }
        Ok(Self {
            track,
            side,
            experiments,
            bounds: ParamBounds::default(),
            base: SimulatorParams::default(),
            explore: 10,
            refine: 40,
            spread: 0.1,
            seed: 42,
        })
    }

    pub fn bounds(mut self, bounds: ParamBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Sets the values used for the parameters that are not fitted.
    pub fn base(mut self, base: SimulatorParams) -> Self {
        self.base = base;
        self
    }

    pub fn explore(mut self, explore: usize) -> Self {
        self.explore = explore;
        self
    }

    pub fn refine(mut self, refine: usize) -> Self {
        self.refine = refine;
        self
    }

    /// Sets the standard deviation of the refinement factor.
    pub fn spread(mut self, spread: f64) -> Self {
        self.spread = spread;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// The mean loss over all experiments.
    pub fn mean_loss(&self, params: SimulatorParams) -> f64 {
        let total: f64 = self
            .experiments
            .iter()
            .map(|experiment| experiment_loss(self.track, self.side, params, experiment))
            .sum();
        total / self.experiments.len() as f64
    }

    /// Runs the search.
    pub fn fit(&self) -> CalibrationResult<Fit> {
        let distr = rand_distr::Normal::new(1.0, self.spread)
            .map_err(|_| CalibrationError::InvalidSpread(self.spread))?;
        let mut rng = StdRng::seed_from_u64(self.seed);

        let mut best = Fit {
            params: self.bounds.sample(&mut rng, self.base),
            loss: f64::INFINITY,
        };
        best.loss = self.mean_loss(best.params);

        for _ in 1..self.explore {
            let params = self.bounds.sample(&mut rng, self.base);
            let loss = self.mean_loss(params);
            if loss < best.loss {
                best = Fit { params, loss };
            }
        }
        debug!("Best loss after exploring {} points: {:.3}", self.explore.max(1), best.loss);

        for _ in 0..self.refine {
            let params = self.bounds.perturb(&mut rng, &distr, best.params);
            let loss = self.mean_loss(params);
            if loss < best.loss {
                best = Fit { params, loss };
            }
        }
        debug!("Best loss after {} refinements: {:.3}", self.refine, best.loss);

        Ok(best)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track::presets;
    use assert_approx_eq::assert_approx_eq;

    /// Records a run of the simulator itself, as the data collector would.
    fn record(track: &Track, params: SimulatorParams, throttle: f64, steps: usize) -> Experiment {
        let mut sim = Simulator::with_params(track, Side::Inside, params);
        let mut laps = LapCounter::new(track.rail_length(Side::Inside));
        let mut samples = vec![Sample {
            time: 0.0,
            input: throttle,
            rail_distance: 0.0,
            laps: 0,
            crashed: false,
        }];
        laps.observe(0.0);
        for i in 1..=steps {
            let (crashed, snapshot) = sim.step(throttle, 0.05);
            laps.observe(snapshot.rail_distance);
            samples.push(Sample {
                time: i as f64 * 0.05,
                input: throttle,
                rail_distance: snapshot.rail_distance,
                laps: laps.laps(),
                crashed,
            });
            if crashed {
                break;
            }
        }
        Experiment::new(samples).unwrap()
    }

    #[test]
    fn replaying_with_the_true_params_has_no_loss() {
        let track = Track::closed(presets::ROUND).unwrap();
        let params = SimulatorParams::default();
        let experiment = record(&track, params, 0.3, 60);
        assert!(experiment.samples().last().unwrap().laps >= 1);
        assert_approx_eq!(experiment_loss(&track, Side::Inside, params, &experiment), 0.0, 1e-6);

        let faster = SimulatorParams {
            acceleration_factor: 2.0 * params.acceleration_factor,
            ..params
        };
        assert!(experiment_loss(&track, Side::Inside, faster, &experiment) > 1.0);
    }

    #[test]
    fn missed_crash_is_penalised() {
        let track = Track::closed(presets::ROUND).unwrap();
        let standing = |time, crashed| Sample {
            time,
            input: 0.0,
            rail_distance: 0.0,
            laps: 0,
            crashed,
        };
        let experiment = Experiment::new(vec![standing(0.0, false), standing(0.5, true)]).unwrap();
        let loss = experiment_loss(&track, Side::Inside, SimulatorParams::default(), &experiment);
        assert_approx_eq!(loss, CRASH_PENALTY);
    }

    #[test]
    fn premature_crash_is_penalised() {
        let track = Track::closed(presets::ROUND).unwrap();
        let experiment = record(&track, SimulatorParams::default(), 0.3, 60);
        let fragile = SimulatorParams {
            max_grip_force: 1.0,
            ..Default::default()
        };
        assert!(experiment_loss(&track, Side::Inside, fragile, &experiment) >= CRASH_PENALTY);
    }

    #[test]
    fn needs_experiments() {
        let track = Track::closed(presets::ROUND).unwrap();
        assert!(matches!(
            Calibrator::new(&track, Side::Inside, &[]),
            Err(CalibrationError::NoExperiments)
        ));
    }

    #[test]
    fn fit_is_reproducible_and_stays_in_bounds() {
        let track = Track::closed(presets::ROUND).unwrap();
        let truth = SimulatorParams {
            acceleration_factor: 5000.0,
            rolling_resistance: 800.0,
            max_grip_force: 9000.0,
            turn_friction_coef: 2500.0,
            ..Default::default()
        };
        let experiments = [record(&track, truth, 0.2, 30), record(&track, truth, 0.35, 30)];
        let calibrator = Calibrator::new(&track, Side::Inside, &experiments)
            .unwrap()
            .explore(5)
            .refine(10);

        let fit = calibrator.fit().unwrap();
        assert_eq!(calibrator.fit().unwrap(), fit);
        assert_approx_eq!(fit.loss, calibrator.mean_loss(fit.params));

        let bounds = ParamBounds::default();
        let within = |span: Interval<f64>, v: f64| span.min <= v && v <= span.max;
        assert!(within(bounds.acceleration_factor, fit.params.acceleration_factor));
        assert!(within(bounds.rolling_resistance, fit.params.rolling_resistance));
        assert!(within(bounds.max_grip_force, fit.params.max_grip_force));
        assert!(within(bounds.turn_friction_coef, fit.params.turn_friction_coef));
        assert_eq!(fit.params.max_speed, truth.max_speed);
    }

    #[test]
    fn fit_within_a_point_box_recovers_the_point() {
        let track = Track::closed(presets::ROUND).unwrap();
        let truth = SimulatorParams::default();
        let experiments = [record(&track, truth, 0.3, 40)];
        let fit = Calibrator::new(&track, Side::Inside, &experiments)
            .unwrap()
            .bounds(ParamBounds::exactly(&truth))
            .fit()
            .unwrap();
        assert_eq!(fit.params, truth);
        assert_approx_eq!(fit.loss, 0.0, 1e-6);
    }

    #[test]
    fn rejects_negative_spread() {
        let track = Track::closed(presets::ROUND).unwrap();
        let experiments = [record(&track, SimulatorParams::default(), 0.3, 5)];
        let result = Calibrator::new(&track, Side::Inside, &experiments)
            .unwrap()
            .spread(-1.0)
            .fit();
        assert!(matches!(result, Err(CalibrationError::InvalidSpread(_))));
    }
}

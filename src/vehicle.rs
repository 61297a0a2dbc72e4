use self::dynamics::{curvature, friction, heading_change, is_crash};
use crate::math::{Point2d, Vector2d};
use crate::segment::Side;
use crate::track::Track;
use crate::util::wrap;
use log::info;
use serde::{Deserialize, Serialize};

pub use params::SimulatorParams;

pub mod dynamics;
mod params;

/// Distances ahead of the car at which the upcoming heading change is reported.
pub const LOOKAHEAD_DISTANCES: [f64; 3] = [10.0, 30.0, 50.0];

/// Whether the car is still on the rail.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DriveState {
    #[default]
    Driving,
    /// The car has left the rail. Only [Simulator::reset] recovers from this.
    Crashed,
}

/// The observable state of a simulated car after a step.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Speed in units per second.
    pub speed: f64,
    /// Distance along the rail, wrapped to one lap.
    pub rail_distance: f64,
    /// Position of the car.
    pub position: Point2d,
    /// Unit direction of travel.
    pub tangent: Vector2d,
    /// Signed heading change between the car and the points
    /// [LOOKAHEAD_DISTANCES] ahead of it, in radians.
    pub lookahead: [f64; 3],
    pub state: DriveState,
}

/// Simulates a single car driving along one rail of a track.
#[derive(Clone, Debug)]
pub struct Simulator<'a> {
    /// The track being driven.
    track: &'a Track,
    /// The rail the car is on.
    side: Side,
    /// The vehicle model constants.
    params: SimulatorParams,
    /// Distance along the rail, wrapped to one lap.
    rail_distance: f64,
    /// Speed in units per second.
    speed: f64,
    state: DriveState,
}

impl<'a> Simulator<'a> {
    /// Creates a stationary car at the start of a rail, with default parameters.
    pub fn new(track: &'a Track, side: Side) -> Self {
        Self::with_params(track, side, SimulatorParams::default())
    }

    /// Creates a stationary car at the start of a rail.
    pub fn with_params(track: &'a Track, side: Side, params: SimulatorParams) -> Self {
        Self {
            track,
            side,
            params,
            rail_distance: 0.0,
            speed: 0.0,
            state: DriveState::Driving,
        }
    }

    /// The track being driven.
    pub fn track(&self) -> &'a Track {
        self.track
    }

    /// The rail the car is on.
    pub fn side(&self) -> Side {
        self.side
    }

    /// The vehicle model constants.
    pub fn params(&self) -> &SimulatorParams {
        &self.params
    }

    /// Distance along the rail, wrapped to one lap.
    pub fn rail_distance(&self) -> f64 {
        self.rail_distance
    }

    /// Speed in units per second.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn state(&self) -> DriveState {
        self.state
    }

    pub fn has_crashed(&self) -> bool {
        self.state == DriveState::Crashed
    }

    /// Stops the car at the start of the rail and puts it back on the rail.
    pub fn reset(&mut self) {
        self.rail_distance = 0.0;
        self.speed = 0.0;
        self.state = DriveState::Driving;
    }

    /// Moves the car to a distance along its rail without changing its speed.
    pub fn place(&mut self, rail_distance: f64) {
        self.rail_distance = wrap(rail_distance, self.track.rail_length(self.side));
    }

    /// Advances the simulation by `dt` seconds.
    ///
    /// Returns whether the car has crashed, and its state afterwards.
    /// Once crashed, the car stays put until [reset](Self::reset).
    ///
    /// # Parameters
    /// * `throttle` - The throttle position, clamped to `[0, 1]`
    /// * `dt` - The time step in seconds
    pub fn step(&mut self, throttle: f64, dt: f64) -> (bool, Snapshot) {
        if self.has_crashed() {
            return (true, self.snapshot());
        }
        let params = &self.params;

        // Accelerate
        self.speed += throttle.clamp(0.0, 1.0) * params.acceleration_factor * dt;

        // Slow down, more so in turns
        let angle = curvature(self.track, self.rail_distance, self.side);
        if self.speed > 0.0 {
            self.speed = f64::max(self.speed - friction(params, angle) * dt, 0.0);
        }
        self.speed = self.speed.clamp(0.0, params.max_speed);

        // Move
        let rail_length = self.track.rail_length(self.side);
        self.rail_distance = wrap(self.rail_distance + self.speed * dt, rail_length);

        if is_crash(params, self.speed, angle) {
            info!(
                "Car on {:?} rail crashed at {:.1} (speed {:.1}, curvature {:.4})",
                self.side, self.rail_distance, self.speed, angle
            );
            self.state = DriveState::Crashed;
        }

        (self.has_crashed(), self.snapshot())
    }

    /// The car's current state.
    pub fn snapshot(&self) -> Snapshot {
        let (track, d, side) = (self.track, self.rail_distance, self.side);
        Snapshot {
            speed: self.speed,
            rail_distance: d,
            position: track.position_at(d, side),
            tangent: track.tangent_at(d, side),
            lookahead: LOOKAHEAD_DISTANCES.map(|ahead| heading_change(track, d, side, ahead)),
            state: self.state,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::track::presets;
    use assert_approx_eq::assert_approx_eq;
    use rand::{Rng, SeedableRng};

    #[test]
    fn full_throttle_on_a_straight() {
        let track = Track::closed(presets::ROUND).unwrap();
        let mut sim = Simulator::new(&track, Side::Inside);
        let params = *sim.params();
        let (crashed, snap) = sim.step(1.0, 0.01);
        assert!(!crashed);
        let expected = params.acceleration_factor * 0.01 - params.rolling_resistance * 0.01;
        assert_approx_eq!(snap.speed, expected);
        assert_approx_eq!(snap.rail_distance, expected * 0.01);
        assert_eq!(snap.tangent, Vector2d::new(1.0, 0.0));
    }

    #[test]
    fn coasting_never_goes_negative() {
        let track = Track::closed(presets::ROUND).unwrap();
        let mut sim = Simulator::new(&track, Side::Outside);
        for _ in 0..100 {
            let (_, snap) = sim.step(0.0, 0.1);
            assert_eq!(snap.speed, 0.0);
            assert_eq!(snap.rail_distance, 0.0);
        }
    }

    #[test]
    fn speed_stays_clamped() {
        let track = Track::closed(presets::REAL).unwrap();
        let mut rng = rand::rngs::StdRng::from_seed(*b"Vroom vroom goes the little car.");
        for side in Side::ALL {
            let mut sim = Simulator::new(&track, side);
            for _ in 0..5000 {
                let (crashed, snap) = sim.step(rng.gen_range(-0.5..1.5), rng.gen_range(0.0..0.1));
                assert!(snap.speed >= 0.0 && snap.speed <= sim.params().max_speed);
                assert!(snap.rail_distance >= 0.0 && snap.rail_distance < track.rail_length(side));
                if crashed {
                    sim.reset();
                }
            }
        }
    }

    #[test]
    fn crashes_in_a_fast_turn_and_stays_crashed() {
        let track = Track::closed(presets::ROUND).unwrap();
        let params = SimulatorParams {
            max_grip_force: 1000.0,
            ..Default::default()
        };
        let mut sim = Simulator::with_params(&track, Side::Inside, params);
        let mut crash = None;
        for i in 0..1000 {
            if sim.step(1.0, 0.01).0 {
                crash = Some(i);
                break;
            }
        }
        assert!(crash.is_some());
        assert!(sim.has_crashed());

        // Curvature is measured one unit ahead of where the step started
        let start = sim.rail_distance() - sim.speed() * 0.01;
        let section = track.section_at_rail(start + 0.999, Side::Inside);
        assert!(section.kind().turn().is_some());

        let before = sim.snapshot();
        let (crashed, after) = sim.step(1.0, 0.01);
        assert!(crashed);
        assert_eq!(before, after);

        sim.reset();
        assert_eq!(sim.state(), DriveState::Driving);
        assert_eq!(sim.rail_distance(), 0.0);
        assert_eq!(sim.speed(), 0.0);
    }

    #[test]
    fn slow_driving_never_crashes() {
        let track = Track::closed(presets::REAL).unwrap();
        let params = SimulatorParams {
            max_grip_force: 1.0,
            max_speed: 45.0,
            ..Default::default()
        };
        let mut sim = Simulator::with_params(&track, Side::Outside, params);
        for _ in 0..10_000 {
            assert!(!sim.step(1.0, 0.02).0);
        }
    }

    #[test]
    fn lookahead_sees_upcoming_turn() {
        let track = Track::closed(presets::ROUND).unwrap();
        let mut sim = Simulator::new(&track, Side::Inside);
        // 15 units before the first left turn
        sim.place(22.8 - 15.0);
        let snap = sim.snapshot();
        assert_eq!(snap.lookahead[0], 0.0);
        assert!(snap.lookahead[1] < 0.0);
        assert!(snap.lookahead[2] < snap.lookahead[1]);
    }

    #[test]
    fn distance_wraps_each_lap() {
        let track = Track::closed(presets::ROUND).unwrap();
        let mut sim = Simulator::new(&track, Side::Inside);
        let len = track.rail_length(Side::Inside);
        sim.place(len - 0.5);
        assert_approx_eq!(sim.rail_distance(), len - 0.5);
        sim.place(-0.5);
        assert_approx_eq!(sim.rail_distance(), len - 0.5);
    }
}

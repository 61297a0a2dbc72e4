pub use calibration::{experiment_loss, Calibrator, Experiment, Fit, ParamBounds, Sample};
pub use cgmath;
pub use error::{
    CalibrationError, CalibrationResult, IndexError, IndexResult, TrackError, TrackResult,
};
pub use index::{FillStrategy, IndexOptions, RasterBounds, SpatialIndex};
pub use lap::LapCounter;
pub use segment::{
    parse_segments, SegmentKind, Side, TurnDirection, INNER_RAIL_RADIUS, LONG_LEN,
    OUTER_RAIL_RADIUS, RAIL_OFFSET, SHORT_LEN, TRACK_WIDTH, TURN_RADIUS,
};
pub use track::{presets, Section, Track, TrackBuilder};
pub use util::{loop_distance, wrap, Interval};
pub use vehicle::{DriveState, Simulator, SimulatorParams, Snapshot, LOOKAHEAD_DISTANCES};

pub mod calibration;
mod error;
pub mod index;
mod lap;
pub mod math;
mod segment;
pub mod track;
mod util;
pub mod vehicle;

//! Error types for track construction, spatial indexing and calibration.

use thiserror::Error;

/// Errors that can occur while building or validating a track.
#[derive(Debug, Error)]
pub enum TrackError {
    /// The segment list is empty.
    #[error("Track has no segments")]
    Empty,

    /// The last section does not end where the first one starts.
    #[error("Track does not close: end pose is {gap:.4} units and {heading_error:.4} rad from the start pose")]
    NotClosed {
        /// Distance between the final position and the origin.
        gap: f64,
        /// Absolute angle between the final heading and the initial heading.
        heading_error: f64,
    },

    /// A segment tag could not be parsed.
    #[error("Unknown segment tag `{0}`")]
    UnknownSegment(String),
}

/// Result type for track operations.
pub type TrackResult<T> = std::result::Result<T, TrackError>;

/// Errors that can occur while building a spatial index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The rail sampling step is not a positive, finite number.
    #[error("Invalid sampling resolution: {0} (must be > 0)")]
    InvalidResolution(f64),

    /// The raster has zero width or height.
    #[error("Raster has no cells")]
    EmptyRaster,
}

/// Result type for spatial index operations.
pub type IndexResult<T> = std::result::Result<T, IndexError>;

/// Errors that can occur while loading experiments or fitting parameters.
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// The experiment file is not valid JSON of the expected shape.
    #[error("Malformed experiment: {0}")]
    Json(#[from] serde_json::Error),

    /// A sample key could not be read as a timestamp.
    #[error("Invalid timestamp `{0}`")]
    InvalidTimestamp(String),

    /// An experiment needs at least two samples to replay.
    #[error("Experiment has {0} samples (need at least 2)")]
    TooFewSamples(usize),

    /// There is nothing to fit against.
    #[error("No experiments to calibrate against")]
    NoExperiments,

    /// The relative spread of the refinement step cannot parameterise a normal distribution.
    #[error("Invalid refinement spread: {0}")]
    InvalidSpread(f64),
}

/// Result type for calibration operations.
pub type CalibrationResult<T> = std::result::Result<T, CalibrationError>;

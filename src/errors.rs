use camino::Utf8PathBuf;
use thiserror::Error;

/// Crate-wide error type.
///
/// Every fallible operation of the sampling pipeline reports through this enum,
/// so a batch run always terminates with a single, explicit diagnostic. There is
/// no retry path anywhere: configuration, propagation, transform and I/O
/// failures are all terminal.
#[derive(Error, Debug)]
pub enum GeomagError {
    /// Missing or invalid run parameter, detected before any propagation starts.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    /// The element file contained no usable two-line element set.
    #[error("no two-line element set found in {0}")]
    NoElements(Utf8PathBuf),

    /// The element lines could not be parsed into orbital elements.
    #[error("invalid two-line element set: {0}")]
    InvalidElements(String),

    /// The underlying orbit model could not advance to the requested epoch
    /// (element set too stale, numerical divergence in the propagation theory).
    #[error("propagation failed: {0}")]
    Propagation(String),

    /// The ellipsoid projection failed to converge or received a degenerate
    /// position vector.
    #[error("geodetic transform failed: {0}")]
    Transform(String),

    /// Geomagnetic model coefficient file could not be interpreted.
    #[error("invalid geomagnetic coefficient file {path}: {reason}")]
    InvalidModelFile { path: Utf8PathBuf, reason: String },

    /// No loaded geomagnetic model covers the requested decimal year.
    #[error("no geomagnetic model is valid for epoch {0:.2}")]
    NoModelForEpoch(f64),

    /// The requested evaluation point lies outside the model validity domain.
    #[error("geomagnetic model {model}: {reason}")]
    FieldModel { model: String, reason: String },

    /// The output file could not be created or written; the attempted path is
    /// surfaced to the operator.
    #[error("cannot write output file {path}: {source}")]
    OutputIo {
        path: Utf8PathBuf,
        source: std::io::Error,
    },

    #[error("unable to perform file operation: {0}")]
    Io(#[from] std::io::Error),

    #[error("unable to parse configuration file: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("unable to parse epoch \"{0}\"")]
    EpochParse(String),
}

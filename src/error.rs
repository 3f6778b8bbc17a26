//! Error types for every failure domain of the crate.
//!
//! None of these escape the decode-attempt or storage boundaries as faults:
//! `decoder::attempt` folds pipeline rejections and decoder errors into a
//! `DecodeOutcome`, and the catalog/settings loaders fold storage errors into
//! defaults plus a note.

use std::time::Duration;

use thiserror::Error;

use crate::models::Region;

/// A `ParameterSet` field outside its documented domain.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{field} = {value} is outside [{min}, {max}]")]
pub struct ParamError {
    pub field: &'static str,
    pub value: i64,
    pub min: i64,
    pub max: i64,
}

/// Why the transform pipeline refused to produce an image.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejected {
    #[error("no region selected")]
    MissingRegion,

    #[error("degenerate region ({}, {}, {}, {})", .0.x1, .0.y1, .0.x2, .0.y2)]
    DegenerateRegion(Region),

    #[error("cropped area is empty")]
    EmptyCrop,

    #[error("invalid parameters: {0}")]
    InvalidParameters(#[from] ParamError),
}

impl Rejected {
    /// Region problems share one user-facing message; parameter problems keep theirs.
    pub fn outcome_message(&self) -> String {
        match self {
            Rejected::InvalidParameters(err) => format!("invalid parameters: {err}"),
            _ => "invalid region".to_string(),
        }
    }
}

/// Failure raised by a matrix-code decoder backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("decoder timed out after {} ms", .0.as_millis())]
    Timeout(Duration),

    #[error("decoder failed: {0}")]
    Failure(String),
}

/// Failure reading or writing the preset / settings text store.
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed storage: {0}")]
    Malformed(String),
}

/// Why a stored preset section could not be turned into a `ParameterSet`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PresetError {
    #[error("missing key '{0}'")]
    MissingKey(&'static str),

    #[error("key '{key}' has unparsable value '{value}'")]
    InvalidValue { key: &'static str, value: String },

    #[error(transparent)]
    OutOfRange(#[from] ParamError),
}

/// Why a preset could not be appended to the catalog.
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid preset parameters: {0}")]
    InvalidParameters(#[from] ParamError),

    #[error("preset store could not be parsed; refusing to overwrite it")]
    ReadOnly,
}

/// Precondition failures of session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("no image loaded")]
    NoImage,

    #[error("no area selected")]
    NoSelection,

    #[error("upscale factor must be greater than 1.0, got {0}")]
    UpscaleFactor(f64),

    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Rejected(#[from] Rejected),
}

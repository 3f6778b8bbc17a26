//! dmtx_rescue - recover matrix barcodes from noisy photographs
//!
//! An operator selects a region of a photo; a fixed chain of filters turns that
//! region into a clean two-level image, and a bounded-time decoder reads it.
//! Parameters can be tuned by hand or swept through a stored list of presets.

/// Environment-driven defaults (file locations, debug switch)
pub mod config;
/// Decoder seam, decode attempts and the built-in backend
pub mod decoder;
/// Error types
pub mod error;
/// Core data structures (ParameterSet, Region, BinaryImage, result log)
pub mod models;
/// Manual and preset-sweep runs
pub mod orchestrator;
/// Region-to-binary transform chain
pub mod pipeline;
/// Preset catalog and its INI encoding
pub mod presets;
/// Operator working state (image, selection, active parameters)
pub mod session;
/// Persisted last-used settings
pub mod settings;
/// Text document storage backends
pub mod storage;
/// Helpers for command-line tools
pub mod tools;
/// Image filters (grayscale, denoise, sharpen, CLAHE, binarization, morphology)
pub mod utils;

pub use decoder::{BoxedDecoder, DataMatrixDecoder, MatrixDecoder, RqrrDecoder, Symbology, TimeBound};
pub use error::{CatalogError, DecoderError, ParamError, PresetError, Rejected, SessionError, StorageError};
pub use models::{
    AdaptiveMethod, BinaryImage, DecodeOutcome, ParameterSet, Region, ResultLog, ResultLogEntry,
};
pub use orchestrator::{Checkpoint, DecodeOrchestrator, RunState};
pub use pipeline::TransformPipeline;
pub use presets::{PresetCatalog, PresetEntry, next_preset_id};
pub use session::{PaintColor, Session};
pub use settings::SessionSettings;

use image::RgbImage;

/// Data Matrix decoder with a hard time limit
pub fn default_decoder() -> TimeBound<DataMatrixDecoder> {
    TimeBound::new(DataMatrixDecoder::new())
}

/// Time-limited built-in decoder for `symbology`
pub fn decoder_for(symbology: Symbology) -> TimeBound<BoxedDecoder> {
    TimeBound::new(symbology.backend())
}

/// Run one Data Matrix decode attempt on `region` of `image`.
pub fn decode_region(
    image: &RgbImage,
    region: Region,
    params: &ParameterSet,
    timeout_ms: i64,
) -> DecodeOutcome {
    decoder::attempt(
        &default_decoder(),
        &TransformPipeline::new(),
        image,
        Some(region),
        params,
        timeout_ms,
    )
}

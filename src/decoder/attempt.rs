use std::time::Duration;

use image::RgbImage;
use log::debug;

use crate::decoder::MatrixDecoder;
use crate::models::{DecodeOutcome, ParameterSet, Region};
use crate::pipeline::TransformPipeline;

/// Budget used whenever a caller asks for a non-positive timeout
pub const DEFAULT_TIMEOUT_MS: u64 = 1000;

/// Map a requested timeout to the one actually sent to the decoder
pub fn normalize_timeout(timeout_ms: i64) -> Duration {
    if timeout_ms <= 0 {
        Duration::from_millis(DEFAULT_TIMEOUT_MS)
    } else {
        Duration::from_millis(timeout_ms as u64)
    }
}

/// Run the pipeline on `region` and hand the result to `decoder`.
///
/// Never fails: rejections, decoder errors and timeouts all come back as
/// `DecodeOutcome::Error`. Only the first payload is kept.
pub fn attempt<D: MatrixDecoder + ?Sized>(
    decoder: &D,
    pipeline: &TransformPipeline,
    source: &RgbImage,
    region: Option<Region>,
    params: &ParameterSet,
    timeout_ms: i64,
) -> DecodeOutcome {
    let binary = match pipeline.run(source, region, params) {
        Ok(binary) => binary,
        Err(rejected) => {
            debug!("pipeline rejected: {rejected}");
            return DecodeOutcome::error(rejected.outcome_message());
        }
    };

    let timeout = normalize_timeout(timeout_ms);
    match decoder.decode(&binary, timeout) {
        Ok(payloads) => match payloads.into_iter().next() {
            Some(bytes) => match String::from_utf8(bytes) {
                Ok(payload) => DecodeOutcome::Success { payload },
                Err(_) => DecodeOutcome::error("decoded payload is not valid UTF-8"),
            },
            None => DecodeOutcome::NotFound,
        },
        Err(err) => {
            debug!("decoder error: {err}");
            DecodeOutcome::error(format!("timeout {} ms: {err}", timeout.as_millis()))
        }
    }
}

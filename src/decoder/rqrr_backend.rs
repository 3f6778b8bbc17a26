use std::time::{Duration, Instant};

use log::debug;
use rqrr::PreparedImage;

use crate::decoder::MatrixDecoder;
use crate::error::DecoderError;
use crate::models::BinaryImage;

/// Pure-Rust backend for QR-family matrix codes.
///
/// The binary image is fed to `rqrr` as a ready-made bitmap, so no second
/// thresholding happens inside the decoder. `rqrr` cannot be interrupted;
/// the budget is only checked between grids. Wrap in `TimeBound` for a hard
/// limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl RqrrDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl MatrixDecoder for RqrrDecoder {
    fn decode(
        &self,
        image: &BinaryImage,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, DecoderError> {
        let started = Instant::now();
        let (w, h) = (image.width(), image.height());
        if w == 0 || h == 0 {
            return Ok(Vec::new());
        }

        let mut prepared = PreparedImage::prepare_from_bitmap(w, h, |x, y| !image.get(x, y));
        let grids = prepared.detect_grids();
        debug!("rqrr found {} candidate grids", grids.len());

        let mut payloads = Vec::new();
        let mut first_error = None;
        for grid in &grids {
            if started.elapsed() > timeout {
                return Err(DecoderError::Timeout(timeout));
            }
            match grid.decode() {
                Ok((_, content)) => payloads.push(content.into_bytes()),
                Err(err) => {
                    debug!("grid decode failed: {err:?}");
                    first_error.get_or_insert_with(|| format!("{err:?}"));
                }
            }
        }

        match (payloads.is_empty(), first_error) {
            (true, Some(err)) => Err(DecoderError::Failure(err)),
            _ => Ok(payloads),
        }
    }
}

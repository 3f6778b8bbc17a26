use std::time::{Duration, Instant};

use log::debug;
use rxing::helpers::detect_in_luma;
use rxing::{BarcodeFormat, Exceptions};

use crate::decoder::MatrixDecoder;
use crate::error::DecoderError;
use crate::models::BinaryImage;

/// Data Matrix (ECC 200) backend on top of `rxing`.
///
/// The binary image goes in as an 8-bit luma buffer with the reader restricted
/// to `DATA_MATRIX`. At most one symbol is reported per call. Unreadable
/// candidates (bad checksum, broken codewords) count as "nothing found", the
/// same as an empty region. `rxing` has no deadline of its own; wrap in
/// `TimeBound` for a hard limit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DataMatrixDecoder;

impl DataMatrixDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl MatrixDecoder for DataMatrixDecoder {
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

        let result = detect_in_luma(
            image.as_bytes().to_vec(),
            w as u32,
            h as u32,
            Some(BarcodeFormat::DATA_MATRIX),
        );
        if started.elapsed() > timeout {
            return Err(DecoderError::Timeout(timeout));
        }

        match result {
            Ok(found) => {
                debug!("data matrix read in {} ms", started.elapsed().as_millis());
                Ok(vec![found.getText().as_bytes().to_vec()])
            }
            Err(
                Exceptions::NotFoundException(_)
                | Exceptions::ChecksumException(_)
                | Exceptions::FormatException(_)
                | Exceptions::ReedSolomonException(_),
            ) => Ok(Vec::new()),
            Err(err) => Err(DecoderError::Failure(err.to_string())),
        }
    }
}

//! Matrix-code decoding seam
//!
//! The crate never decodes symbols itself. It hands a binarized image and a
//! time budget to a `MatrixDecoder` and folds whatever comes back into a
//! `DecodeOutcome`:
//! - `attempt`: one pipeline run plus one bounded decoder call
//! - `TimeBound`: worker-thread timeout for decoders without their own
//! - `DataMatrixDecoder`: the default backend, Data Matrix through `rxing`
//! - `RqrrDecoder`: QR backend for the occasional non-Data Matrix label

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::DecoderError;
use crate::models::BinaryImage;

/// Decode attempt: pipeline + bounded decoder call
pub mod attempt;
/// QR backend on top of `rqrr`
pub mod rqrr_backend;
/// Data Matrix backend on top of `rxing`
pub mod rxing_backend;
/// Timeout enforcement on a worker thread
pub mod timed;

pub use attempt::{DEFAULT_TIMEOUT_MS, attempt, normalize_timeout};
pub use rqrr_backend::RqrrDecoder;
pub use rxing_backend::DataMatrixDecoder;
pub use timed::TimeBound;

/// External matrix-code decoder contract.
///
/// Returns every payload found, in the decoder's own order; an empty vector
/// means nothing was found. Any error, including running out of `timeout`,
/// is reported as `Err`.
pub trait MatrixDecoder {
    fn decode(&self, image: &BinaryImage, timeout: Duration)
    -> Result<Vec<Vec<u8>>, DecoderError>;
}

impl<D: MatrixDecoder + ?Sized> MatrixDecoder for &D {
    fn decode(
        &self,
        image: &BinaryImage,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, DecoderError> {
        (**self).decode(image, timeout)
    }
}

impl<D: MatrixDecoder + ?Sized> MatrixDecoder for Box<D> {
    fn decode(
        &self,
        image: &BinaryImage,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, DecoderError> {
        (**self).decode(image, timeout)
    }
}

impl<D: MatrixDecoder + ?Sized> MatrixDecoder for Arc<D> {
    fn decode(
        &self,
        image: &BinaryImage,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, DecoderError> {
        (**self).decode(image, timeout)
    }
}

/// Symbol family a built-in backend reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Symbology {
    #[default]
    DataMatrix,
    Qr,
}

impl FromStr for Symbology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "datamatrix" | "data-matrix" | "dm" => Ok(Symbology::DataMatrix),
            "qr" => Ok(Symbology::Qr),
            other => Err(format!("unknown symbology '{other}' (expected datamatrix or qr)")),
        }
    }
}

/// Any built-in backend, boxed so callers can pick one at runtime
pub type BoxedDecoder = Box<dyn MatrixDecoder + Send + Sync>;

impl Symbology {
    pub fn backend(self) -> BoxedDecoder {
        match self {
            Symbology::DataMatrix => Box::new(DataMatrixDecoder::new()),
            Symbology::Qr => Box::new(RqrrDecoder::new()),
        }
    }
}

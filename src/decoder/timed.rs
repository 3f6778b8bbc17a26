use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use log::warn;

use crate::decoder::MatrixDecoder;
use crate::error::DecoderError;
use crate::models::BinaryImage;

/// Enforces the time budget for a decoder that has no timeout of its own.
///
/// Each call runs the inner decoder on a fresh worker thread and waits at most
/// `timeout` for its answer. A worker that overruns is left to finish in the
/// background; its late result is dropped.
#[derive(Debug)]
pub struct TimeBound<D> {
    inner: Arc<D>,
}

impl<D> TimeBound<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D> Clone for TimeBound<D> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<D> MatrixDecoder for TimeBound<D>
where
    D: MatrixDecoder + Send + Sync + 'static,
{
    fn decode(
        &self,
        image: &BinaryImage,
        timeout: Duration,
    ) -> Result<Vec<Vec<u8>>, DecoderError> {
        let (tx, rx) = mpsc::channel();
        let decoder = Arc::clone(&self.inner);
        let image = image.clone();

        thread::Builder::new()
            .name("matrix-decode".into())
            .spawn(move || {
                // The receiver is gone once the caller timed out.
                let _ = tx.send(decoder.decode(&image, timeout));
            })
            .map_err(|e| DecoderError::Failure(format!("could not start decoder worker: {e}")))?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                warn!("decoder exceeded {} ms budget", timeout.as_millis());
                Err(DecoderError::Timeout(timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(DecoderError::Failure(
                "decoder worker exited without a result".into(),
            )),
        }
    }
}

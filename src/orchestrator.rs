//! Manual and preset-sweep decode runs.
//!
//! Attempts are issued strictly one after another. Between entries the
//! orchestrator hands control to a [`Checkpoint`], which is where a host
//! event loop gets to refresh its view of the log and the active parameters.

use log::{debug, info};

use crate::decoder::{MatrixDecoder, attempt};
use crate::error::SessionError;
use crate::models::{DecodeOutcome, LogRecord, ResultLog, ResultLogEntry};
use crate::pipeline::TransformPipeline;
use crate::presets::PresetCatalog;
use crate::session::Session;

pub const MANUAL_LABEL: &str = "Manual";
pub const INFO_LABEL: &str = "Info";
pub const SUMMARY_LABEL: &str = "Summary";
pub const EMPTY_CATALOG_MESSAGE: &str = "No presets found in catalog";

/// Where a run currently is.
///
/// One invocation goes `Idle -> Running -> (Processing -> Recorded)* ->
/// Summarized -> Idle`; manual runs and empty sweeps skip `Summarized`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Processing,
    Recorded,
    Summarized,
}

/// Called after every entry appended to the result log.
pub trait Checkpoint {
    fn reached(&mut self, state: RunState, entry: &ResultLogEntry);
}

impl<F> Checkpoint for F
where
    F: FnMut(RunState, &ResultLogEntry),
{
    fn reached(&mut self, state: RunState, entry: &ResultLogEntry) {
        self(state, entry)
    }
}

/// Checkpoint that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCheckpoint;

impl Checkpoint for NoCheckpoint {
    fn reached(&mut self, _state: RunState, _entry: &ResultLogEntry) {}
}

#[derive(Debug)]
pub struct DecodeOrchestrator<D> {
    decoder: D,
    pipeline: TransformPipeline,
    log: ResultLog,
    state: RunState,
}

impl<D: MatrixDecoder> DecodeOrchestrator<D> {
    pub fn new(decoder: D) -> Self {
        Self::with_pipeline(decoder, TransformPipeline::new())
    }

    pub fn with_pipeline(decoder: D, pipeline: TransformPipeline) -> Self {
        Self {
            decoder,
            pipeline,
            log: ResultLog::new(),
            state: RunState::Idle,
        }
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn pipeline(&self) -> &TransformPipeline {
        &self.pipeline
    }

    /// Entries of the most recent run
    pub fn log(&self) -> &ResultLog {
        &self.log
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn record(&mut self, entry: ResultLogEntry, checkpoint: &mut impl Checkpoint) {
        debug!("{entry}");
        self.state = RunState::Recorded;
        let entry = self.log.push(entry);
        checkpoint.reached(RunState::Recorded, entry);
    }

    fn start(&mut self, session: &Session) -> Result<(), SessionError> {
        if session.image().is_none() {
            return Err(SessionError::NoImage);
        }
        if session.selection().is_none() {
            return Err(SessionError::NoSelection);
        }
        self.log.clear();
        self.state = RunState::Running;
        Ok(())
    }

    pub fn run_manual(&mut self, session: &Session, timeout_ms: i64) -> Result<&ResultLog, SessionError> {
        self.run_manual_with(session, timeout_ms, &mut NoCheckpoint)
    }

    /// One attempt with the session's active parameters, logged as `Manual`.
    pub fn run_manual_with(
        &mut self,
        session: &Session,
        timeout_ms: i64,
        checkpoint: &mut impl Checkpoint,
    ) -> Result<&ResultLog, SessionError> {
        self.start(session)?;
        let image = session.image().ok_or(SessionError::NoImage)?;

        self.state = RunState::Processing;
        let outcome = attempt(
            &self.decoder,
            &self.pipeline,
            image,
            session.selection(),
            session.params(),
            timeout_ms,
        );
        info!("manual decode: {outcome}");
        self.record(ResultLogEntry::outcome(MANUAL_LABEL, outcome), checkpoint);

        self.state = RunState::Idle;
        Ok(&self.log)
    }

    pub fn run_sweep(
        &mut self,
        session: &mut Session,
        catalog: &PresetCatalog,
        timeout_ms: i64,
    ) -> Result<&ResultLog, SessionError> {
        self.run_sweep_with(session, catalog, timeout_ms, &mut NoCheckpoint)
    }

    /// Try every preset in catalog order, then append a summary.
    ///
    /// Each valid preset becomes the session's active parameter set before it
    /// is tried. A malformed preset is logged as an error and skipped.
    ///
    /// Presets are tried one after another, each with its own `timeout_ms`
    /// budget. With a `TimeBound` decoder an overrunning attempt is abandoned,
    /// not killed: its worker thread keeps running until the backend returns,
    /// so a backend that hangs on every preset holds one thread per preset
    /// until each one returns.
    pub fn run_sweep_with(
        &mut self,
        session: &mut Session,
        catalog: &PresetCatalog,
        timeout_ms: i64,
        checkpoint: &mut impl Checkpoint,
    ) -> Result<&ResultLog, SessionError> {
        self.start(session)?;

        if catalog.is_empty() {
            info!("sweep: catalog is empty");
            self.record(ResultLogEntry::info(INFO_LABEL, EMPTY_CATALOG_MESSAGE), checkpoint);
            self.state = RunState::Idle;
            return Ok(&self.log);
        }

        info!("sweep: trying {} presets", catalog.len());
        let mut succeeded = 0;
        for entry in catalog.entries() {
            self.state = RunState::Processing;
            let outcome = match &entry.params {
                Ok(params) => {
                    session.set_params(*params);
                    let image = session.image().ok_or(SessionError::NoImage)?;
                    attempt(
                        &self.decoder,
                        &self.pipeline,
                        image,
                        session.selection(),
                        session.params(),
                        timeout_ms,
                    )
                }
                Err(err) => DecodeOutcome::error(format!("invalid preset: {err}")),
            };
            if outcome.is_success() {
                succeeded += 1;
            }
            self.record(ResultLogEntry::outcome(entry.name.clone(), outcome), checkpoint);
        }

        let summary = ResultLogEntry {
            label: SUMMARY_LABEL.to_string(),
            record: LogRecord::Summary {
                succeeded,
                attempted: catalog.len(),
            },
        };
        info!("sweep finished: {}", summary.record);
        self.log.push(summary);
        self.state = RunState::Summarized;
        if let Some(last) = self.log.entries().last() {
            checkpoint.reached(RunState::Summarized, last);
        }

        self.state = RunState::Idle;
        Ok(&self.log)
    }
}

use serde::Serialize;
use std::fmt;

/// Tri-state result of one decode attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DecodeOutcome {
    /// First payload returned by the decoder, UTF-8 decoded
    Success { payload: String },
    /// Decoder ran to completion but found nothing
    NotFound,
    /// Pipeline rejection, decoder failure or timeout
    Error { message: String },
}

impl DecodeOutcome {
    pub fn error(message: impl Into<String>) -> Self {
        DecodeOutcome::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DecodeOutcome::Success { .. })
    }

    /// Decoded text, if any
    pub fn payload(&self) -> Option<&str> {
        match self {
            DecodeOutcome::Success { payload } => Some(payload),
            _ => None,
        }
    }
}

impl fmt::Display for DecodeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeOutcome::Success { payload } => f.write_str(payload),
            DecodeOutcome::NotFound => f.write_str("No code found"),
            DecodeOutcome::Error { message } => write!(f, "Error: {message}"),
        }
    }
}

/// What a log line records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LogRecord {
    Outcome { outcome: DecodeOutcome },
    Info { message: String },
    Summary { succeeded: usize, attempted: usize },
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogRecord::Outcome { outcome } => outcome.fmt(f),
            LogRecord::Info { message } => f.write_str(message),
            LogRecord::Summary { succeeded, .. } => {
                let noun = if *succeeded == 1 { "preset" } else { "presets" };
                write!(f, "{succeeded} {noun} succeeded")
            }
        }
    }
}

/// One `(label, record)` line of the result log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultLogEntry {
    pub label: String,
    #[serde(flatten)]
    pub record: LogRecord,
}

impl ResultLogEntry {
    pub fn outcome(label: impl Into<String>, outcome: DecodeOutcome) -> Self {
        Self {
            label: label.into(),
            record: LogRecord::Outcome { outcome },
        }
    }

    pub fn info(label: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            record: LogRecord::Info {
                message: message.into(),
            },
        }
    }

    /// The decode outcome carried by this line, if it is an outcome line
    pub fn decode_outcome(&self) -> Option<&DecodeOutcome> {
        match &self.record {
            LogRecord::Outcome { outcome } => Some(outcome),
            _ => None,
        }
    }
}

impl fmt::Display for ResultLogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.record)
    }
}

/// Append-only log of one manual or sweep invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ResultLog {
    entries: Vec<ResultLogEntry>,
}

impl ResultLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn push(&mut self, entry: ResultLogEntry) -> &ResultLogEntry {
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[ResultLogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ResultLogEntry> {
        self.entries.iter()
    }

    /// Number of outcome lines that succeeded
    pub fn success_count(&self) -> usize {
        self.entries
            .iter()
            .filter_map(ResultLogEntry::decode_outcome)
            .filter(|o| o.is_success())
            .count()
    }
}

impl<'a> IntoIterator for &'a ResultLog {
    type Item = &'a ResultLogEntry;
    type IntoIter = std::slice::Iter<'a, ResultLogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

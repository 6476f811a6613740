use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// How serious a diagnostic record is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Note,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
        };
        f.write_str(label)
    }
}

/// One structured diagnostic produced while validating or scanning an
/// invocation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticRecord {
    pub severity: Severity,
    pub message: String,
}

/// Call-scoped diagnostic collector.
///
/// One sink is attached to each scan call; it never outlives the call and is
/// never shared between calls. Operations that fail hand the collected
/// records back inside [`ScanError::InvalidArgument`] instead of leaving them
/// in a shared side-channel.
#[derive(Debug, Default)]
pub struct DiagnosticSink {
    records: Vec<DiagnosticRecord>,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push(Severity::Error, message);
    }

    pub fn warning(&mut self, message: impl Into<String>) {
        self.push(Severity::Warning, message);
    }

    pub fn note(&mut self, message: impl Into<String>) {
        self.push(Severity::Note, message);
    }

    fn push(&mut self, severity: Severity, message: impl Into<String>) {
        self.records.push(DiagnosticRecord {
            severity,
            message: message.into(),
        });
    }

    pub fn records(&self) -> &[DiagnosticRecord] {
        &self.records
    }

    pub fn has_errors(&self) -> bool {
        self.records.iter().any(|r| r.severity == Severity::Error)
    }

    pub fn into_records(self) -> Vec<DiagnosticRecord> {
        self.records
    }
}

/// One named entry in a batch request: its own command, its own output
/// destination. Placeholder status is derived by testing the module name
/// against the placeholder set at scan time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchScanInput {
    /// Identifying name; doubles as the module name when the command does
    /// not carry `-module-name`.
    pub name: String,
    /// Raw argument tokens for this input.
    pub command: Vec<String>,
    /// Where this input's serialized graph is written.
    pub output_path: PathBuf,
}

/// Failure reported by a discovery engine.
#[derive(Debug)]
pub struct EngineError {
    message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EngineError {}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Error type for scan operations.
#[derive(Debug)]
pub enum ScanError {
    /// The command was empty or its tokens were rejected by the invocation
    /// parser. Carries the diagnostics explaining the cause. The shared
    /// cache is never touched on this path.
    InvalidArgument { diagnostics: Vec<DiagnosticRecord> },
    /// The discovery engine failed mid-scan. The cache keeps whatever
    /// partial state the engine left; the scanner instance stays usable.
    EngineFailure(String),
}

impl ScanError {
    pub fn invalid_argument(diagnostics: Vec<DiagnosticRecord>) -> Self {
        ScanError::InvalidArgument { diagnostics }
    }

    /// Diagnostics attached to this error, empty for engine failures.
    pub fn diagnostics(&self) -> &[DiagnosticRecord] {
        match self {
            ScanError::InvalidArgument { diagnostics } => diagnostics,
            ScanError::EngineFailure(_) => &[],
        }
    }
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::InvalidArgument { diagnostics } => match diagnostics.first() {
                Some(first) => write!(f, "invalid invocation arguments: {}", first.message),
                None => write!(f, "invalid invocation arguments"),
            },
            ScanError::EngineFailure(message) => {
                write!(f, "dependency discovery failed: {}", message)
            }
        }
    }
}

impl std::error::Error for ScanError {}

impl From<EngineError> for ScanError {
    fn from(err: EngineError) -> Self {
        ScanError::EngineFailure(err.to_string())
    }
}

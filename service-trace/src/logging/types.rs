use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Per-invocation integer tying an enter record to its exit or error record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationId(pub u64);

impl CorrelationId {
    /// The raw counter value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context handed to the logger with every record of one invocation.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Correlation id of the invocation.
    pub id: CorrelationId,
    /// Method the invocation belongs to.
    pub method: Arc<str>,
    /// When the invocation entered the logging wrapper.
    pub started_at: Instant,
}

impl CallContext {
    /// Creates a context starting now.
    pub fn new(id: CorrelationId, method: Arc<str>) -> Self {
        Self {
            id,
            method,
            started_at: Instant::now(),
        }
    }

    /// Time since the invocation entered the logging wrapper.
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Channel a record was emitted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Enter/exit records.
    Debug,
    /// Failure records.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debug => write!(f, "debug"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A single emitted record, in a form suitable for JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    /// Display name of the service.
    pub service: String,
    /// Channel.
    pub level: LogLevel,
    /// Correlation id.
    pub id: CorrelationId,
    /// Label, e.g. `ENTER add:`.
    pub message: String,
    /// Rendered payload.
    pub payload: String,
    /// Microseconds since the invocation started.
    pub elapsed_us: u64,
}

impl LogRecord {
    /// Builds a record for the given context.
    pub fn new(
        service: &str,
        level: LogLevel,
        ctx: &CallContext,
        message: &str,
        payload: &str,
    ) -> Self {
        Self {
            service: service.to_string(),
            level,
            id: ctx.id,
            message: message.to_string(),
            payload: payload.to_string(),
            elapsed_us: ctx.elapsed().as_micros() as u64,
        }
    }
}

use crate::logging::types::{CallContext, LogLevel, LogRecord};
use std::sync::Arc;

// =============================================================================
// Logger Trait
// =============================================================================

/// Sink for the records of decorated operations.
///
/// The two channels are independent: `debug` receives enter/exit records,
/// `error` receives failures. Implementations must not panic; anything
/// they do happens inline with the call being logged.
pub trait Logger: Send + Sync {
    /// Emits a debug-level record.
    fn debug(&self, ctx: &CallContext, message: &str, payload: &str);

    /// Emits an error-level record.
    fn error(&self, ctx: &CallContext, message: &str, payload: &str);

    /// Returns false when debug records are discarded, letting callers skip
    /// building their payloads.
    fn is_debug_enabled(&self) -> bool {
        true
    }
}

// =============================================================================
// TracingLogger
// =============================================================================

/// Default logger that uses the tracing crate with structured fields.
///
/// Every record carries `service`, `id`, `method` and `elapsed_us` fields;
/// the message is the label followed by the payload.
#[derive(Debug, Clone)]
pub struct TracingLogger {
    service: Arc<str>,
    verbose: bool,
}

impl TracingLogger {
    /// Creates a logger for the named service with debug records enabled.
    pub fn new(service: &str) -> Self {
        Self {
            service: Arc::from(service),
            verbose: true,
        }
    }

    /// Enables or disables debug records.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// The service this logger was created for.
    pub fn service(&self) -> &str {
        &self.service
    }
}

impl Logger for TracingLogger {
    fn debug(&self, ctx: &CallContext, message: &str, payload: &str) {
        if !self.verbose {
            return;
        }
        tracing::debug!(
            service = %self.service,
            id = ctx.id.get(),
            method = %ctx.method,
            elapsed_us = ctx.elapsed().as_micros() as u64,
            "{} {}",
            message,
            payload
        );
    }

    fn error(&self, ctx: &CallContext, message: &str, payload: &str) {
        tracing::error!(
            service = %self.service,
            id = ctx.id.get(),
            method = %ctx.method,
            elapsed_us = ctx.elapsed().as_micros() as u64,
            "{} {}",
            message,
            payload
        );
    }

    fn is_debug_enabled(&self) -> bool {
        self.verbose
    }
}

// =============================================================================
// JsonLogger
// =============================================================================

/// A logger that emits each record as one JSON document.
///
/// Records go to the `service_trace_json` tracing target, which log
/// aggregation setups can route separately.
#[derive(Debug, Clone)]
pub struct JsonLogger {
    service: Arc<str>,
    verbose: bool,
}

impl JsonLogger {
    /// Creates a JSON logger for the named service.
    pub fn new(service: &str) -> Self {
        Self {
            service: Arc::from(service),
            verbose: true,
        }
    }

    /// Enables or disables debug records.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    fn emit(&self, level: LogLevel, ctx: &CallContext, message: &str, payload: &str) {
        let record = LogRecord::new(&self.service, level, ctx, message, payload);
        if let Ok(json) = serde_json::to_string(&record) {
            match level {
                LogLevel::Debug => tracing::debug!(target: "service_trace_json", "{}", json),
                LogLevel::Error => tracing::error!(target: "service_trace_json", "{}", json),
            }
        }
    }
}

impl Logger for JsonLogger {
    fn debug(&self, ctx: &CallContext, message: &str, payload: &str) {
        if self.verbose {
            self.emit(LogLevel::Debug, ctx, message, payload);
        }
    }

    fn error(&self, ctx: &CallContext, message: &str, payload: &str) {
        self.emit(LogLevel::Error, ctx, message, payload);
    }

    fn is_debug_enabled(&self) -> bool {
        self.verbose
    }
}

// =============================================================================
// MockLogger (for testing)
// =============================================================================

#[cfg(test)]
use std::sync::Mutex;

/// A mock logger that captures records for testing.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct MockLogger {
    service: Arc<str>,
    verbose: bool,
    records: Arc<Mutex<Vec<LogRecord>>>,
}

#[cfg(test)]
impl Default for MockLogger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl MockLogger {
    /// Creates a new mock logger.
    pub fn new() -> Self {
        Self {
            service: Arc::from("mock"),
            verbose: true,
            records: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A handle sharing this logger's records under another service name.
    pub fn for_service(&self, service: &str, verbose: bool) -> Self {
        Self {
            service: Arc::from(service),
            verbose,
            records: Arc::clone(&self.records),
        }
    }

    /// Returns all captured records.
    pub fn records(&self) -> Vec<LogRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Returns the captured records of one level.
    pub fn records_at(&self, level: LogLevel) -> Vec<LogRecord> {
        self.records()
            .into_iter()
            .filter(|r| r.level == level)
            .collect()
    }

    /// Clears all captured records.
    pub fn clear(&self) {
        self.records.lock().unwrap().clear();
    }

    /// Returns the number of captured records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    /// Returns true if no records have been captured.
    pub fn is_empty(&self) -> bool {
        self.records.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
impl Logger for MockLogger {
    fn debug(&self, ctx: &CallContext, message: &str, payload: &str) {
        if self.verbose {
            let record = LogRecord::new(&self.service, LogLevel::Debug, ctx, message, payload);
            self.records.lock().unwrap().push(record);
        }
    }

    fn error(&self, ctx: &CallContext, message: &str, payload: &str) {
        let record = LogRecord::new(&self.service, LogLevel::Error, ctx, message, payload);
        self.records.lock().unwrap().push(record);
    }

    fn is_debug_enabled(&self) -> bool {
        self.verbose
    }
}

//! Correlation-tagged enter/exit logging
//!
//! Every call through a decorated operation produces exactly one
//! `ENTER <method>:` record and exactly one ` EXIT <method>:` or
//! `ERROR <method>:` record, all carrying the same [`CorrelationId`].
//! Deferred results are logged when they settle.
//!
//! # Architecture
//!
//! - **types**: correlation ids, call context and record types
//! - **logger**: the [`Logger`] trait and the tracing/JSON implementations
//! - **middleware**: the wrapper that emits the records around a handler
//!
//! # Custom Logger
//!
//! ```rust,ignore
//! use service_trace::{configure, ConfigureOptions, JsonLogger, Logger};
//! use std::sync::Arc;
//!
//! configure(ConfigureOptions::new().with_logger_factory(|service, _| {
//!     Arc::new(JsonLogger::new(service)) as Arc<dyn Logger>
//! }))?;
//! ```

mod logger;
mod middleware;
mod types;

pub use types::{CallContext, CorrelationId, LogLevel, LogRecord};

pub use logger::{JsonLogger, Logger, TracingLogger};

pub use middleware::with_logging;

#[cfg(test)]
pub use logger::MockLogger;

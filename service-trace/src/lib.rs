#![warn(missing_docs)]
//! # service-trace
//!
//! Validation and correlation-tagged logging for service operations.
//!
//! ## Overview
//!
//! Decorating a collection of operations replaces each one with a wrapper
//! that:
//! - **Validates** positional arguments against the operation's schema,
//!   coercing them to their declared types
//! - **Logs** an `ENTER` record with the normalized, sanitized arguments
//!   before the call
//! - **Logs** an ` EXIT` record with the sanitized result, or an `ERROR`
//!   record, after the call, immediately or once a deferred result settles
//! - **Correlates** both records of a call with one increasing id
//!
//! ## Architecture
//!
//! ```text
//!  caller
//!    │ args
//!    ▼
//! ┌──────────────────────┐  id, ENTER record
//! │ Logging wrapper      │──────────────────────▶ Logger
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐  named args ─▶ Schema
//! │ Validation wrapper   │
//! └──────────┬───────────┘
//!            ▼
//! ┌──────────────────────┐
//! │ Operation            │  Outcome::Ready | Outcome::Deferred
//! └──────────────────────┘
//!            │ result / error
//!            ▼
//!   EXIT or ERROR record, same id
//! ```
//!
//! Values written to records go through the [`Serializer`], which replaces
//! cycles with `'[Circular]'`, redacts configured field names, truncates
//! long arrays and limits depth. Serialization never fails a call.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use service_trace::prelude::*;
//!
//! let mut operations = Operations::new();
//! operations.insert(
//!     "add".into(),
//!     Operation::sync(|args| {
//!         let a = args[0].as_f64().unwrap_or_default();
//!         let b = args[1].as_f64().unwrap_or_default();
//!         Ok(Value::from(a + b))
//!     })
//!     .with_params(["a", "b"])
//!     .with_schema(
//!         ObjectSchema::new()
//!             .field("a", FieldRule::number().required())
//!             .field("b", FieldRule::number().required()),
//!     ),
//! );
//!
//! service_trace::decorate(&mut operations, "calculator");
//!
//! // '1' and '2' are coerced to numbers by the schema
//! let sum = operations["add"].call(vec!["1".into(), "2".into()]).await?;
//! assert_eq!(sum.as_f64(), Some(3.0));
//! ```
//!
//! ## Configuration
//!
//! ```rust,ignore
//! service_trace::configure(
//!     ConfigureOptions::new()
//!         .with_remove_fields(["password", "apiKey"])
//!         .with_max_array_length(10),
//! )?;
//! ```
//!
//! Settings are read at call time, so configuration changes apply to
//! operations decorated earlier.

pub mod args;
pub mod config;
pub mod constants;
mod decorator;
mod error;
pub mod logging;
mod operation;
mod runtime;
pub mod schema;
pub mod serializer;
pub mod validation;
mod value;

#[cfg(test)]
mod tests;

// Re-export main types
pub use args::{NamedArgs, named_to_value, to_named, to_positional};
pub use config::{ConfigValidationError, ConfigureOptions, LoggerFactory, ParamResolver, Settings};
pub use decorator::{Operations, Service};
pub use error::{CallError, CallResult, ErrorCode, OperationError, ValidationError};
pub use logging::{
    CallContext, CorrelationId, JsonLogger, LogLevel, LogRecord, Logger, TracingLogger,
    with_logging,
};
pub use operation::{Handler, Operation, OperationMeta, Outcome};
pub use runtime::Runtime;
pub use schema::{FieldKind, FieldRule, ObjectSchema, Schema};
pub use serializer::{SerializeError, Serializer};
pub use validation::with_validation;
pub use value::{Fields, Shared, Value, ValueError};

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use service_trace::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Errors
        CallError,
        CallResult,
        // Configuration
        ConfigureOptions,
        ErrorCode,
        // Schema
        FieldRule,
        // Logging
        JsonLogger,
        Logger,
        ObjectSchema,
        // Operations
        Operation,
        OperationError,
        Operations,
        Outcome,
        Runtime,
        Schema,
        Service,
        TracingLogger,
        ValidationError,
        // Values
        Value,
    };
}

// =============================================================================
// Global runtime
// =============================================================================

/// Merges `options` into the global settings.
///
/// # Errors
///
/// Returns an error if the merged settings are invalid; the previous
/// settings then stay in force.
pub fn configure(options: ConfigureOptions) -> Result<(), ConfigValidationError> {
    Runtime::global().configure(options)
}

/// Decorates `operations` in place using the global runtime.
pub fn decorate(operations: &mut Operations, service_name: &str) {
    Runtime::global().decorate(operations, service_name);
}

/// Restores the global defaults and restarts correlation ids at 1.
pub fn reset() {
    Runtime::global().reset();
}

/// Renders `value` with the global settings.
pub fn serialize(value: &Value) -> String {
    Runtime::global().serializer().serialize(value)
}

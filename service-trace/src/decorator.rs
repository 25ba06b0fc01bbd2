//! Service decoration
//!
//! [`Runtime::decorate`] walks a named collection of operations and
//! replaces each entry with a wrapped version: validation innermost,
//! logging outermost. [`Service`] bundles a collection with its display
//! name for callers that dispatch by method name.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_trace::prelude::*;
//!
//! let mut service = Service::new("calculator").operation(
//!     "add",
//!     Operation::sync(|args| {
//!         let a = args[0].as_f64().unwrap_or_default();
//!         let b = args[1].as_f64().unwrap_or_default();
//!         Ok(Value::from(a + b))
//!     })
//!     .with_params(["a", "b"]),
//! );
//! service.decorate(&Runtime::global());
//!
//! let sum = service.call("add", vec![1.into(), 2.into()]).await?;
//! ```

use crate::error::{CallResult, OperationError};
use crate::logging::with_logging;
use crate::operation::{Operation, OperationMeta, Outcome};
use crate::runtime::Runtime;
use crate::validation::with_validation;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};

/// Operations keyed by method name.
pub type Operations = HashMap<String, Operation>;

// =============================================================================
// Decoration
// =============================================================================

impl Runtime {
    /// Replaces every operation in `operations` with its decorated version.
    ///
    /// Parameter names come from the operation's declaration, else from the
    /// configured resolver, else none. One logger is built per call to
    /// `decorate`, named after `service_name`.
    ///
    /// Decorating an already-decorated collection wraps it again.
    pub fn decorate(self: &Arc<Self>, operations: &mut Operations, service_name: &str) {
        let settings = self.settings();
        let logger = (settings.logger_factory)(service_name, &settings);

        for (name, operation) in operations.iter_mut() {
            let params: Arc<[String]> = match operation.params() {
                Some(declared) => Arc::from(declared),
                None => settings
                    .param_resolver
                    .as_ref()
                    .and_then(|resolve| resolve(name.as_str()))
                    .map(Arc::from)
                    .unwrap_or_else(|| Arc::from(Vec::new())),
            };

            let meta = Arc::new(OperationMeta {
                method_name: name.clone(),
                params,
                schema: operation.schema().cloned(),
                remove_output: operation.remove_output(),
                synchronous: operation.is_synchronous(),
            });
            trace!(service = %service_name, ?meta, "Decorating operation");

            let handler = with_validation(operation.handler(), Arc::clone(&meta));
            let handler = with_logging(
                handler,
                Arc::clone(&logger),
                Arc::clone(&meta),
                Arc::clone(self),
            );
            *operation = Operation::decorated(&meta, handler);
        }

        debug!(
            service = %service_name,
            operations = operations.len(),
            "Service decorated"
        );
    }
}

// =============================================================================
// Service
// =============================================================================

/// A named collection of operations.
#[derive(Debug, Clone)]
pub struct Service {
    name: String,
    operations: Operations,
}

impl Service {
    /// Creates an empty service.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Operations::new(),
        }
    }

    /// Registers an operation, replacing any previous one with that name.
    #[must_use = "This method returns a new Service and does not modify self"]
    pub fn operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// The service's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Looks up an operation.
    pub fn get(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Registered method names, sorted.
    pub fn method_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operations.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Decorates every operation in place.
    pub fn decorate(&mut self, runtime: &Arc<Runtime>) {
        runtime.decorate(&mut self.operations, &self.name);
    }

    /// Calls an operation by name.
    ///
    /// An unknown name yields an immediate `NOT_FOUND` failure.
    pub fn call(&self, name: &str, args: Vec<Value>) -> Outcome {
        match self.operations.get(name) {
            Some(operation) => operation.call(args),
            None => Outcome::fail(OperationError::operation_not_found(&self.name, name)),
        }
    }

    /// Calls an operation by name and waits for its result.
    pub async fn call_async(&self, name: &str, args: Vec<Value>) -> CallResult {
        self.call(name, args).settle().await
    }

    /// Consumes the service, returning its operations.
    pub fn into_operations(self) -> Operations {
        self.operations
    }
}

//! Argument validation wrapper
//!
//! Runs an operation's schema over its named arguments and calls the
//! operation with the normalized values. Arguments beyond the declared
//! parameters are not validated but still reach the operation.
//!
//! A validation failure is delivered the way the operation delivers its
//! own failures: immediately for synchronous operations, as a deferred
//! failure for deferred ones.

use crate::args::{to_named, to_positional};
use crate::operation::{Handler, Outcome, OperationMeta};
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, trace};

/// Wraps `handler` with schema validation.
///
/// Returns `handler` itself when `meta` has no schema.
pub fn with_validation(handler: Handler, meta: Arc<OperationMeta>) -> Handler {
    let Some(schema) = meta.schema.clone() else {
        trace!(method = %meta.method_name, "No schema declared, skipping validation");
        return handler;
    };

    Arc::new(move |args: Vec<Value>| {
        let named = to_named(&meta.params, &args);
        match schema.validate(&named) {
            Ok(normalized) => {
                trace!(method = %meta.method_name, "Arguments validated");
                handler(to_positional(&meta.params, normalized, &args))
            }
            Err(error) => {
                debug!(
                    method = %meta.method_name,
                    field = %error.field,
                    code = %error.code,
                    synchronous = meta.synchronous,
                    "Rejecting call with invalid arguments"
                );
                if meta.synchronous {
                    Outcome::fail(error)
                } else {
                    Outcome::deferred_fail(error)
                }
            }
        }
    })
}

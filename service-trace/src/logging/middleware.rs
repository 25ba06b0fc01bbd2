use crate::args::{named_to_value, to_named};
use crate::constants::{EMPTY_ARGS_MARKER, REMOVED_MARKER};
use crate::error::CallError;
use crate::logging::logger::Logger;
use crate::logging::types::CallContext;
use crate::operation::{Handler, Outcome, OperationMeta};
use crate::runtime::Runtime;
use crate::serializer::Serializer;
use crate::value::Value;
use std::sync::Arc;

// =============================================================================
// Helper Functions
// =============================================================================

/// Record labels, formatted once per operation.
struct Labels {
    enter: String,
    exit: String,
    error: String,
}

impl Labels {
    fn new(method: &str) -> Self {
        Self {
            enter: format!("ENTER {}:", method),
            exit: format!(" EXIT {}:", method),
            error: format!("ERROR {}:", method),
        }
    }
}

/// Renders the arguments by parameter name, or `{}` when none are declared.
///
/// Arguments that satisfy the operation's schema are rendered in their
/// normalized form, i.e. as the operation receives them. Rejected
/// arguments are rendered as given.
fn render_input(serializer: &Serializer, meta: &OperationMeta, args: &[Value]) -> String {
    if meta.params.is_empty() {
        return EMPTY_ARGS_MARKER.to_string();
    }
    let named = to_named(&meta.params, args);
    let named = match &meta.schema {
        Some(schema) => schema.validate(&named).unwrap_or(named),
        None => named,
    };
    serializer.serialize(&named_to_value(&named))
}

fn render_output(serializer: &Serializer, remove_output: bool, value: &Value) -> String {
    if remove_output {
        serializer.serialize(&Value::from(REMOVED_MARKER))
    } else {
        serializer.serialize(value)
    }
}

fn failure_payload(method: &str, input: &str, error: &CallError) -> String {
    format!("method={} input={} error={}", method, input, error)
}

fn emit_exit(
    logger: &dyn Logger,
    ctx: &CallContext,
    labels: &Labels,
    serializer: &Serializer,
    meta: &OperationMeta,
    value: &Value,
) {
    let payload = render_output(serializer, meta.remove_output, value);
    logger.debug(ctx, &labels.exit, &payload);
}

// =============================================================================
// Wrapper
// =============================================================================

/// Wraps `handler` with enter/exit/error records.
///
/// Each call takes the next correlation id from `runtime`, emits
/// `ENTER <method>:` with the rendered (schema-normalized) arguments,
/// invokes `handler` and then emits ` EXIT <method>:` with the rendered
/// result, or an error record. A deferred outcome stays deferred; its
/// records are emitted when it settles. Results and errors are returned
/// unchanged.
///
/// Settings are read once at the start of each call. Debug records are
/// emitted only while the runtime is verbose and the logger accepts them.
pub fn with_logging(
    handler: Handler,
    logger: Arc<dyn Logger>,
    meta: Arc<OperationMeta>,
    runtime: Arc<Runtime>,
) -> Handler {
    let method: Arc<str> = Arc::from(meta.method_name.as_str());
    let labels = Arc::new(Labels::new(&meta.method_name));

    Arc::new(move |args: Vec<Value>| {
        let ctx = CallContext::new(runtime.next_correlation_id(), Arc::clone(&method));
        let serializer = runtime.serializer();
        let debug = runtime.is_verbose() && logger.is_debug_enabled();

        // Input is rendered up front only when it will be logged; the
        // deferred error path renders it lazily from a copy otherwise.
        let (input, retained) = if debug {
            let rendered = render_input(&serializer, &meta, &args);
            logger.debug(&ctx, &labels.enter, &rendered);
            (Some(rendered), None)
        } else {
            (None, Some(args.clone()))
        };

        match handler(args) {
            Outcome::Ready(Ok(value)) => {
                if debug {
                    emit_exit(logger.as_ref(), &ctx, &labels, &serializer, &meta, &value);
                }
                Outcome::Ready(Ok(value))
            }
            Outcome::Ready(Err(error)) => {
                logger.error(&ctx, &labels.error, &error.to_string());
                Outcome::Ready(Err(error))
            }
            Outcome::Deferred(future) => {
                let logger = Arc::clone(&logger);
                let labels = Arc::clone(&labels);
                let meta = Arc::clone(&meta);

                Outcome::deferred(async move {
                    match future.await {
                        Ok(value) => {
                            if debug {
                                emit_exit(logger.as_ref(), &ctx, &labels, &serializer, &meta, &value);
                            }
                            Ok(value)
                        }
                        Err(error) => {
                            let input = input.unwrap_or_else(|| {
                                render_input(
                                    &serializer,
                                    &meta,
                                    retained.as_deref().unwrap_or_default(),
                                )
                            });
                            let payload = failure_payload(&meta.method_name, &input, &error);
                            logger.error(&ctx, &labels.error, &payload);
                            Err(error)
                        }
                    }
                })
            }
        }
    })
}

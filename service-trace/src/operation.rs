//! Operations and their outcomes
//!
//! An [`Operation`] is a callable taking positional [`Value`] arguments,
//! plus the metadata the decorator needs (parameter names, schema,
//! output suppression, synchronous or deferred).
//!
//! Calling an operation yields an [`Outcome`]: either a result that is
//! already known, or a boxed future that settles later. Wrappers match on
//! the variant instead of probing the returned value.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_trace::prelude::*;
//!
//! let add = Operation::sync(|args| {
//!     let a = args[0].as_f64().unwrap_or_default();
//!     let b = args[1].as_f64().unwrap_or_default();
//!     Ok(Value::from(a + b))
//! })
//! .with_params(["a", "b"]);
//!
//! let fetch = Operation::deferred(|args| async move {
//!     Ok(args.first().cloned().unwrap_or_default())
//! })
//! .with_params(["id"]);
//! ```

use crate::error::{CallError, CallResult, OperationError};
use crate::schema::Schema;
use crate::value::Value;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::sync::Arc;

/// The result of invoking an operation.
pub enum Outcome {
    /// The result is already known.
    Ready(CallResult),
    /// The result settles later.
    Deferred(BoxFuture<'static, CallResult>),
}

impl Outcome {
    /// An immediate success.
    pub fn ok(value: impl Into<Value>) -> Self {
        Outcome::Ready(Ok(value.into()))
    }

    /// An immediate failure.
    pub fn fail(error: impl Into<CallError>) -> Self {
        Outcome::Ready(Err(error.into()))
    }

    /// A result that settles when `future` completes.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = CallResult> + Send + 'static,
    {
        Outcome::Deferred(future.boxed())
    }

    /// A deferred result that settles to `error`.
    pub fn deferred_fail(error: impl Into<CallError>) -> Self {
        let error = error.into();
        Outcome::deferred(async move { Err(error) })
    }

    /// Returns true for [`Outcome::Deferred`].
    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }

    /// Returns the result if it is already known, or gives the outcome back.
    pub fn into_ready(self) -> Result<CallResult, Self> {
        match self {
            Outcome::Ready(result) => Ok(result),
            deferred @ Outcome::Deferred(_) => Err(deferred),
        }
    }

    /// Waits for the result, whichever variant this is.
    pub async fn settle(self) -> CallResult {
        match self {
            Outcome::Ready(result) => result,
            Outcome::Deferred(future) => future.await,
        }
    }
}

impl IntoFuture for Outcome {
    type Output = CallResult;
    type IntoFuture = BoxFuture<'static, CallResult>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Outcome::Ready(result) => futures::future::ready(result).boxed(),
            Outcome::Deferred(future) => future,
        }
    }
}

impl fmt::Debug for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Ready(result) => f.debug_tuple("Ready").field(result).finish(),
            Outcome::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Type-erased operation body.
pub type Handler = Arc<dyn Fn(Vec<Value>) -> Outcome + Send + Sync>;

/// Per-operation metadata fixed at decoration time.
#[derive(Clone)]
pub struct OperationMeta {
    /// Key the operation was registered under.
    pub method_name: String,
    /// Parameter names in declaration order.
    pub params: Arc<[String]>,
    /// Argument schema, if any.
    pub schema: Option<Arc<dyn Schema>>,
    /// Replace the result with `'<removed>'` in exit records.
    pub remove_output: bool,
    /// Validation failures are returned immediately rather than deferred.
    pub synchronous: bool,
}

impl fmt::Debug for OperationMeta {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationMeta")
            .field("method_name", &self.method_name)
            .field("params", &self.params)
            .field("schema", &self.schema.is_some())
            .field("remove_output", &self.remove_output)
            .field("synchronous", &self.synchronous)
            .finish()
    }
}

/// A callable service operation with its declared metadata.
///
/// Cloning is cheap and yields a handle to the same body. Decoration
/// replaces the entry in a collection; clones taken earlier keep calling
/// the undecorated body.
#[derive(Clone)]
pub struct Operation {
    handler: Handler,
    params: Option<Arc<[String]>>,
    schema: Option<Arc<dyn Schema>>,
    remove_output: bool,
    synchronous: bool,
    method_name: Option<String>,
}

impl Operation {
    /// Wraps a type-erased handler.
    pub fn from_handler(handler: Handler, synchronous: bool) -> Self {
        Self {
            handler,
            params: None,
            schema: None,
            remove_output: false,
            synchronous,
            method_name: None,
        }
    }

    /// An operation that returns its result directly.
    pub fn sync<F>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Result<Value, OperationError> + Send + Sync + 'static,
    {
        Self::from_handler(
            Arc::new(move |args| Outcome::Ready(f(args).map_err(CallError::from))),
            true,
        )
    }

    /// An operation whose result settles later.
    pub fn deferred<F, Fut>(f: F) -> Self
    where
        F: Fn(Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, OperationError>> + Send + 'static,
    {
        Self::from_handler(
            Arc::new(move |args| {
                let future = f(args);
                Outcome::deferred(async move { future.await.map_err(CallError::from) })
            }),
            false,
        )
    }

    /// Declares the parameter names, in positional order.
    pub fn with_params(mut self, params: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.params = Some(params.into_iter().map(Into::into).collect());
        self
    }

    /// Attaches an argument schema.
    pub fn with_schema(mut self, schema: impl Schema + 'static) -> Self {
        self.schema = Some(Arc::new(schema));
        self
    }

    /// Attaches a shared argument schema.
    pub fn with_shared_schema(mut self, schema: Arc<dyn Schema>) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Keeps results out of exit records.
    pub fn with_remove_output(mut self, remove: bool) -> Self {
        self.remove_output = remove;
        self
    }

    /// Invokes the operation.
    pub fn call(&self, args: Vec<Value>) -> Outcome {
        (self.handler)(args)
    }

    /// Declared parameter names, if any.
    pub fn params(&self) -> Option<&[String]> {
        self.params.as_deref()
    }

    /// The argument schema, if any.
    pub fn schema(&self) -> Option<&Arc<dyn Schema>> {
        self.schema.as_ref()
    }

    /// Whether results are kept out of exit records.
    pub fn remove_output(&self) -> bool {
        self.remove_output
    }

    /// Whether the operation was declared synchronous.
    pub fn is_synchronous(&self) -> bool {
        self.synchronous
    }

    /// The registered name, set once the operation has been decorated.
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    /// Returns true once the operation has been decorated.
    pub fn is_decorated(&self) -> bool {
        self.method_name.is_some()
    }

    pub(crate) fn handler(&self) -> Handler {
        Arc::clone(&self.handler)
    }

    /// Builds the decorated replacement, carrying the resolved metadata.
    pub(crate) fn decorated(meta: &OperationMeta, handler: Handler) -> Self {
        Self {
            handler,
            params: Some(Arc::clone(&meta.params)),
            schema: meta.schema.clone(),
            remove_output: meta.remove_output,
            synchronous: meta.synchronous,
            method_name: Some(meta.method_name.clone()),
        }
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("method_name", &self.method_name)
            .field("params", &self.params)
            .field("schema", &self.schema.is_some())
            .field("remove_output", &self.remove_output)
            .field("synchronous", &self.synchronous)
            .finish()
    }
}

//! Cycle-safe, redacting payload serializer
//!
//! Turns an arbitrary [`Value`] graph into a single-line, human-readable
//! rendering for log records. Serialization happens in two steps:
//!
//! - **sanitize**: a depth-first, field-name-aware transform into a
//!   `serde_json::Value` tree. Revisited containers become `'[Circular]'`,
//!   redacted fields become `'<removed>'`, `req` / `res` fields are reduced
//!   to their useful parts and long arrays become `Array(<len>)`.
//! - **render**: prints the tree inspect-style, replacing containers
//!   nested deeper than the configured depth with `[Object]` / `[Array]`.
//!
//! [`Serializer::serialize`] never fails. If sanitizing hits a poisoned
//! container or the nesting guard, a warning is traced and a shallow
//! description of the value is returned instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_trace::{Serializer, Settings, Value};
//!
//! let serializer = Serializer::new(&Settings::default());
//! let user = Value::object_from([("name", "alice"), ("password", "hunter2")]);
//! assert_eq!(serializer.serialize(&user), "{ name: 'alice', password: '<removed>' }");
//! ```

mod http;
mod render;
mod sanitize;

pub use render::render;

use crate::config::Settings;
use crate::value::{Value, ValueError};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;

/// Internal serializer failure. Never escapes [`Serializer::serialize`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum SerializeError {
    /// A container could not be read.
    #[error("unreadable container: {0}")]
    Unreadable(#[from] ValueError),
    /// The graph nests deeper than the recursion guard.
    #[error("value nests deeper than {limit} levels")]
    TooDeep {
        /// The recursion guard that was hit
        limit: usize,
    },
}

/// Snapshot of the settings the serializer needs.
///
/// Cheap to clone. A serializer built from settings keeps using those
/// values even if the runtime is reconfigured afterwards.
#[derive(Debug, Clone)]
pub struct Serializer {
    removed_field_names: Arc<HashSet<String>>,
    max_depth: usize,
    max_array_length: usize,
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new(&Settings::default())
    }
}

impl Serializer {
    /// Creates a serializer from the given settings.
    pub fn new(settings: &Settings) -> Self {
        Self {
            removed_field_names: Arc::new(settings.removed_field_names.clone()),
            max_depth: settings.max_depth,
            max_array_length: settings.max_array_length,
        }
    }

    /// Rendering depth in force.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Array truncation threshold in force.
    pub fn max_array_length(&self) -> usize {
        self.max_array_length
    }

    /// Returns true if `field` is redacted.
    pub fn is_removed(&self, field: &str) -> bool {
        self.removed_field_names.contains(field)
    }

    /// Produces the sanitized snapshot of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`] on a poisoned container or when the graph
    /// nests deeper than the recursion guard.
    pub fn sanitize(&self, value: &Value) -> Result<serde_json::Value, SerializeError> {
        sanitize::Sanitizer::new(self).run(value)
    }

    /// Renders `value` for a log record. Never fails.
    pub fn serialize(&self, value: &Value) -> String {
        match self.sanitize(value) {
            Ok(tree) => render(&tree, self.max_depth),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    kind = value.kind(),
                    "Failed to serialize value for logging, using fallback"
                );
                value.describe()
            }
        }
    }
}

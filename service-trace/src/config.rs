//! Process-scoped configuration.
//!
//! [`Settings`] is the full configuration held by a
//! [`Runtime`](crate::Runtime). It is never replaced wholesale: callers hand a
//! partial [`ConfigureOptions`] to `configure`, and every option that is
//! present overwrites the matching setting.
//!
//! # Example
//! ```rust,ignore
//! use service_trace::{configure, ConfigureOptions};
//!
//! configure(
//!     ConfigureOptions::new()
//!         .with_remove_fields(["password", "ssn"])
//!         .with_depth(2)
//!         .with_debug(false),
//! )?;
//!
//! // Or from JSON
//! let options = ConfigureOptions::from_json(r#"{"maxArrayLength": 10}"#)?;
//! ```

use crate::constants::{
    DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_DEPTH, DEFAULT_REMOVED_FIELDS, MAX_NESTING,
};
use crate::logging::{Logger, TracingLogger};
use serde::Deserialize;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Builds the logger for a service, given its display name and the
/// settings in force at decoration time.
pub type LoggerFactory = Arc<dyn Fn(&str, &Settings) -> Arc<dyn Logger> + Send + Sync>;

/// Resolves parameter names for an operation that did not declare them.
/// Receives the method name; `None` means "unknown".
pub type ParamResolver = Arc<dyn Fn(&str) -> Option<Vec<String>> + Send + Sync>;

/// Error type for configuration validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigValidationError {
    /// Redacted field names must not be empty
    #[error("redacted field names must not be empty")]
    EmptyFieldName,
    /// depth exceeds the nesting guard
    #[error("depth must be at most {max} (got {got})")]
    DepthTooLarge {
        /// Requested depth
        got: usize,
        /// Largest accepted depth
        max: usize,
    },
    /// Options could not be parsed
    #[error("invalid options: {0}")]
    Parse(String),
}

fn default_logger_factory() -> LoggerFactory {
    Arc::new(|service: &str, _: &Settings| Arc::new(TracingLogger::new(service)) as Arc<dyn Logger>)
}

/// Full configuration consulted by the serializer and the decorator.
#[derive(Clone)]
pub struct Settings {
    /// Field names whose values are replaced by `'<removed>'`.
    pub removed_field_names: HashSet<String>,
    /// Whether debug-level records (enter/exit) are emitted. Checked on
    /// every call, in addition to the logger's own filter.
    pub verbose: bool,
    /// Containers nested deeper than this render as placeholders.
    pub max_depth: usize,
    /// Arrays longer than this render as `Array(<len>)`.
    pub max_array_length: usize,
    /// Builds one logger per decorated service.
    pub logger_factory: LoggerFactory,
    /// Fallback source of parameter names.
    pub param_resolver: Option<ParamResolver>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            removed_field_names: DEFAULT_REMOVED_FIELDS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            verbose: true,
            max_depth: DEFAULT_MAX_DEPTH,
            max_array_length: DEFAULT_MAX_ARRAY_LENGTH,
            logger_factory: default_logger_factory(),
            param_resolver: None,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("removed_field_names", &self.removed_field_names)
            .field("verbose", &self.verbose)
            .field("max_depth", &self.max_depth)
            .field("max_array_length", &self.max_array_length)
            .field("param_resolver", &self.param_resolver.is_some())
            .finish()
    }
}

impl Settings {
    /// Validate the settings.
    ///
    /// # Errors
    ///
    /// Returns an error if a redacted field name is empty or `max_depth`
    /// exceeds [`MAX_NESTING`].
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.removed_field_names.iter().any(|f| f.is_empty()) {
            return Err(ConfigValidationError::EmptyFieldName);
        }
        if self.max_depth > MAX_NESTING {
            return Err(ConfigValidationError::DepthTooLarge {
                got: self.max_depth,
                max: MAX_NESTING,
            });
        }
        Ok(())
    }

    /// Returns a copy with `options` merged in.
    pub fn merged(&self, options: ConfigureOptions) -> Self {
        let mut next = self.clone();
        if let Some(fields) = options.remove_fields {
            next.removed_field_names = fields;
        }
        if let Some(debug) = options.debug {
            next.verbose = debug;
        }
        if let Some(depth) = options.depth {
            next.max_depth = depth;
        }
        if let Some(max) = options.max_array_length {
            next.max_array_length = max;
        }
        if let Some(factory) = options.logger_factory {
            next.logger_factory = factory;
        }
        if let Some(resolver) = options.param_resolver {
            next.param_resolver = Some(resolver);
        }
        next
    }
}

/// Partial configuration. Absent options leave the current setting alone.
#[derive(Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ConfigureOptions {
    /// Replaces the set of redacted field names.
    pub remove_fields: Option<HashSet<String>>,
    /// Enables or disables debug-level records.
    pub debug: Option<bool>,
    /// Rendering depth.
    pub depth: Option<usize>,
    /// Array truncation threshold.
    pub max_array_length: Option<usize>,
    /// Logger factory.
    #[serde(skip)]
    pub logger_factory: Option<LoggerFactory>,
    /// Parameter-name resolver.
    #[serde(skip)]
    pub param_resolver: Option<ParamResolver>,
}

impl fmt::Debug for ConfigureOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigureOptions")
            .field("remove_fields", &self.remove_fields)
            .field("debug", &self.debug)
            .field("depth", &self.depth)
            .field("max_array_length", &self.max_array_length)
            .field("logger_factory", &self.logger_factory.is_some())
            .field("param_resolver", &self.param_resolver.is_some())
            .finish()
    }
}

impl ConfigureOptions {
    /// Creates empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options from a JSON document with camelCase keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigValidationError::Parse`] for malformed JSON or
    /// unknown keys.
    pub fn from_json(json: &str) -> Result<Self, ConfigValidationError> {
        serde_json::from_str(json).map_err(|e| ConfigValidationError::Parse(e.to_string()))
    }

    /// Sets the redacted field names (replacing the current set).
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_remove_fields(mut self, fields: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.remove_fields = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Enables or disables debug-level records.
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = Some(enabled);
        self
    }

    /// Sets the rendering depth.
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Sets the array truncation threshold.
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_max_array_length(mut self, max: usize) -> Self {
        self.max_array_length = Some(max);
        self
    }

    /// Sets the logger factory.
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_logger_factory<F>(mut self, factory: F) -> Self
    where
        F: Fn(&str, &Settings) -> Arc<dyn Logger> + Send + Sync + 'static,
    {
        self.logger_factory = Some(Arc::new(factory));
        self
    }

    /// Sets the parameter-name resolver used for undeclared parameters.
    #[must_use = "This method returns new options and does not modify self"]
    pub fn with_param_resolver<F>(mut self, resolver: F) -> Self
    where
        F: Fn(&str) -> Option<Vec<String>> + Send + Sync + 'static,
    {
        self.param_resolver = Some(Arc::new(resolver));
        self
    }
}

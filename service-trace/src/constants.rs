//! Constants and default values.
//!
//! Markers that appear in rendered payloads and the defaults of
//! [`Settings`](crate::Settings) live here so tests and loggers can refer
//! to them by name.

/// Field names redacted by default.
pub const DEFAULT_REMOVED_FIELDS: &[&str] = &["password", "token", "accessToken"];

/// Default rendering depth for serialized payloads.
pub const DEFAULT_MAX_DEPTH: usize = 4;

/// Arrays longer than this render as `Array(<len>)` by default.
pub const DEFAULT_MAX_ARRAY_LENGTH: usize = 30;

/// Hard recursion guard for sanitizing; deeper graphs fall back to a
/// degraded rendering. Also the upper bound accepted for `depth`.
pub const MAX_NESTING: usize = 256;

/// Replacement for redacted fields and for suppressed outputs.
pub const REMOVED_MARKER: &str = "<removed>";

/// Replacement for containers already visited in the current pass.
pub const CIRCULAR_MARKER: &str = "[Circular]";

/// Payload logged for operations that declare no parameters.
pub const EMPTY_ARGS_MARKER: &str = "{}";

/// Field names used by the `req` / `res` shorthand.
pub const REQUEST_FIELD: &str = "req";
/// See [`REQUEST_FIELD`].
pub const RESPONSE_FIELD: &str = "res";

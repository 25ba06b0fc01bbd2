//! Argument schemas
//!
//! The decorator does not care how arguments are checked; it hands the
//! named arguments to a [`Schema`] and uses whatever normalized mapping comes
//! back. Any closure with the right signature is a schema, so an external
//! validation engine can be plugged in directly.
//!
//! [`ObjectSchema`] is the bundled engine: per-argument rules with a small
//! amount of coercion (numeric-looking text becomes a number, `"true"` /
//! `"false"` become booleans). Validation stops at the first failing
//! argument.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_trace::schema::{FieldRule, ObjectSchema};
//!
//! let schema = ObjectSchema::new()
//!     .field("a", FieldRule::number().required())
//!     .field("b", FieldRule::number().required())
//!     .field("label", FieldRule::string().max_length(32));
//! ```

use crate::args::NamedArgs;
use crate::error::ValidationError;
use crate::value::Value;
use regex::Regex;
use serde_json::Number;
use std::fmt;
use tracing::{debug, trace, warn};

/// Validates and normalizes named arguments.
pub trait Schema: Send + Sync {
    /// Returns the normalized arguments or the first violation found.
    fn validate(&self, args: &NamedArgs) -> Result<NamedArgs, ValidationError>;
}

impl<F> Schema for F
where
    F: Fn(&NamedArgs) -> Result<NamedArgs, ValidationError> + Send + Sync,
{
    fn validate(&self, args: &NamedArgs) -> Result<NamedArgs, ValidationError> {
        self(args)
    }
}

/// Expected type of an argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldKind {
    /// Anything, including null
    Any,
    /// Number; numeric text is coerced
    Number,
    /// Whole number; integral numbers and integer text are coerced
    Integer,
    /// Text
    String,
    /// Boolean; `"true"` / `"false"` are coerced
    Boolean,
    /// Array
    Array,
    /// Object
    Object,
}

impl FieldKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
        }
    }
}

#[derive(Clone)]
struct PatternRule {
    source: String,
    compiled: Option<Regex>,
}

/// Constraints for one argument.
#[derive(Clone)]
pub struct FieldRule {
    kind: FieldKind,
    required: bool,
    nullable: bool,
    default: Option<Value>,
    min: Option<f64>,
    max: Option<f64>,
    min_length: Option<usize>,
    max_length: Option<usize>,
    pattern: Option<PatternRule>,
    one_of: Option<Vec<String>>,
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("kind", &self.kind)
            .field("required", &self.required)
            .field("nullable", &self.nullable)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("min_length", &self.min_length)
            .field("max_length", &self.max_length)
            .field("pattern", &self.pattern.as_ref().map(|p| p.source.as_str()))
            .field("one_of", &self.one_of)
            .finish()
    }
}

impl FieldRule {
    /// Creates a rule of the given kind; optional and non-nullable.
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            required: false,
            nullable: false,
            default: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            pattern: None,
            one_of: None,
        }
    }

    /// Any value.
    pub fn any() -> Self {
        Self::new(FieldKind::Any)
    }

    /// A number.
    pub fn number() -> Self {
        Self::new(FieldKind::Number)
    }

    /// A whole number.
    pub fn integer() -> Self {
        Self::new(FieldKind::Integer)
    }

    /// Text.
    pub fn string() -> Self {
        Self::new(FieldKind::String)
    }

    /// A boolean.
    pub fn boolean() -> Self {
        Self::new(FieldKind::Boolean)
    }

    /// An array.
    pub fn array() -> Self {
        Self::new(FieldKind::Array)
    }

    /// An object.
    pub fn object() -> Self {
        Self::new(FieldKind::Object)
    }

    /// The argument must be supplied.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Null is accepted as-is.
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Value used when the argument is absent.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Inclusive lower bound for numbers.
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive upper bound for numbers.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Minimum text length in characters.
    pub fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Maximum text length in characters.
    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Text must match the regular expression.
    ///
    /// An invalid expression is reported as a validation failure on every
    /// call rather than at construction.
    pub fn pattern(mut self, pattern: &str) -> Self {
        let compiled = match Regex::new(pattern) {
            Ok(re) => Some(re),
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "Invalid validation regex pattern");
                None
            }
        };
        self.pattern = Some(PatternRule {
            source: pattern.to_string(),
            compiled,
        });
        self
    }

    /// Text must be one of the given values.
    pub fn one_of(mut self, allowed: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.one_of = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    /// Checks and coerces a single value. `None` means the argument is absent.
    fn apply(&self, field: &str, value: Option<&Value>) -> Result<Option<Value>, ValidationError> {
        let value = match value {
            None => {
                if let Some(default) = &self.default {
                    trace!(field = %field, "Using default value");
                    return Ok(Some(default.clone()));
                }
                if self.required {
                    return Err(ValidationError::required(field));
                }
                return Ok(None);
            }
            Some(Value::Null) if self.nullable || self.kind == FieldKind::Any => {
                return Ok(Some(Value::Null));
            }
            Some(Value::Null) if self.required => return Err(ValidationError::required(field)),
            Some(value) => value,
        };

        let coerced = self.coerce(field, value)?;
        self.check_bounds(field, &coerced)?;
        Ok(Some(coerced))
    }

    fn coerce(&self, field: &str, value: &Value) -> Result<Value, ValidationError> {
        let wrong_type = || ValidationError::wrong_type(field, self.kind.name());
        match self.kind {
            FieldKind::Any => Ok(value.clone()),
            FieldKind::Number => match value {
                Value::Number(_) => Ok(value.clone()),
                Value::String(s) => parse_number(s).map(Value::Number).ok_or_else(wrong_type),
                _ => Err(wrong_type()),
            },
            FieldKind::Integer => {
                let number = match value {
                    Value::Number(n) => Some(n.clone()),
                    Value::String(s) => parse_number(s),
                    _ => None,
                };
                number
                    .and_then(|n| integral(&n))
                    .map(Value::from)
                    .ok_or_else(wrong_type)
            }
            FieldKind::String => match value {
                Value::String(_) => Ok(value.clone()),
                _ => Err(wrong_type()),
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => Ok(value.clone()),
                Value::String(s) if s.eq_ignore_ascii_case("true") => Ok(Value::Bool(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Ok(Value::Bool(false)),
                _ => Err(wrong_type()),
            },
            FieldKind::Array => match value {
                Value::Array(_) => Ok(value.clone()),
                _ => Err(wrong_type()),
            },
            FieldKind::Object => match value {
                Value::Object(_) => Ok(value.clone()),
                _ => Err(wrong_type()),
            },
        }
    }

    fn check_bounds(&self, field: &str, value: &Value) -> Result<(), ValidationError> {
        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min
                && n < min
            {
                return Err(ValidationError::min(field, min));
            }
            if let Some(max) = self.max
                && n > max
            {
                return Err(ValidationError::max(field, max));
            }
        }

        if let Some(s) = value.as_str() {
            let length = s.chars().count();
            if let Some(min) = self.min_length
                && length < min
            {
                return Err(ValidationError::min_length(field, min));
            }
            if let Some(max) = self.max_length
                && length > max
            {
                return Err(ValidationError::max_length(field, max));
            }
            if let Some(rule) = &self.pattern {
                match &rule.compiled {
                    Some(re) if re.is_match(s) => {}
                    Some(_) => return Err(ValidationError::pattern(field, &rule.source)),
                    None => {
                        return Err(ValidationError::new(
                            field,
                            format!("Invalid validation pattern: {}", rule.source),
                            "invalid_pattern",
                        ));
                    }
                }
            }
            if let Some(allowed) = &self.one_of
                && !allowed.iter().any(|a| a == s)
            {
                return Err(ValidationError::one_of(field, allowed));
            }
        }

        Ok(())
    }
}

fn parse_number(text: &str) -> Option<Number> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(i.into());
    }
    text.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .and_then(Number::from_f64)
}

fn integral(n: &Number) -> Option<i64> {
    if let Some(i) = n.as_i64() {
        return Some(i);
    }
    n.as_f64()
        .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
        .map(|f| f as i64)
}

/// Rules for a set of named arguments.
///
/// Arguments without a rule pass through untouched.
#[derive(Debug, Clone, Default)]
pub struct ObjectSchema {
    fields: Vec<(String, FieldRule)>,
}

impl ObjectSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the rule for an argument.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        let name = name.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = rule,
            None => self.fields.push((name, rule)),
        }
        self
    }

    /// Names of the arguments that have rules, in declaration order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }
}

impl Schema for ObjectSchema {
    fn validate(&self, args: &NamedArgs) -> Result<NamedArgs, ValidationError> {
        let mut normalized = args.clone();
        for (name, rule) in &self.fields {
            match rule.apply(name, args.get(name)) {
                Ok(Some(value)) => {
                    normalized.insert(name.clone(), value);
                }
                Ok(None) => {}
                Err(e) => {
                    debug!(field = %e.field, code = %e.code, "Argument validation failed");
                    return Err(e);
                }
            }
        }
        trace!(fields = self.fields.len(), "Argument validation passed");
        Ok(normalized)
    }
}

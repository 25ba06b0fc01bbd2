//! Dynamic runtime values passed to and returned from operations.
//!
//! Scalars are stored inline. Arrays and objects are shared handles
//! (`Arc<RwLock<..>>`), so two `Value`s can point at the same container and
//! a container can hold a handle to itself. Container identity is the
//! address of the shared allocation, which is what the serializer uses for
//! cycle detection.
//!
//! # Example
//!
//! ```rust,ignore
//! use service_trace::Value;
//!
//! let user = Value::object();
//! user.insert("name", "alice");
//! user.insert("self", user.clone()); // cyclic, still representable
//! ```

use serde_json::Number;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};
use thiserror::Error;

/// Field storage of an object value.
pub type Fields = BTreeMap<String, Value>;

/// Errors raised while reading or converting a [`Value`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ValueError {
    /// A container lock was poisoned by a panicking writer.
    #[error("container lock poisoned")]
    Poisoned,
    /// The value graph contains a cycle and has no tree form.
    #[error("value graph contains a cycle")]
    Cyclic,
}

/// A shared, lockable container with reference identity.
pub struct Shared<T>(Arc<RwLock<T>>);

impl<T> Shared<T> {
    fn new(inner: T) -> Self {
        Self(Arc::new(RwLock::new(inner)))
    }

    /// Address of the shared allocation; equal for clones of the same handle.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.0) as *const () as usize
    }

    /// Returns true when both handles point at the same container.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Strict read access, failing on a poisoned lock.
    pub fn try_read(&self) -> Result<RwLockReadGuard<'_, T>, ValueError> {
        self.0.read().map_err(|_| ValueError::Poisoned)
    }

    fn read(&self) -> RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = self.0.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<T> Clone for Shared<T> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

/// A dynamically typed value with shared containers.
#[derive(Clone, Default)]
pub enum Value {
    /// Absent or null value.
    #[default]
    Null,
    /// Boolean.
    Bool(bool),
    /// JSON-compatible number.
    Number(Number),
    /// UTF-8 text.
    String(String),
    /// Ordered sequence.
    Array(Shared<Vec<Value>>),
    /// String-keyed record.
    Object(Shared<Fields>),
}

impl Value {
    /// Creates a new empty object.
    pub fn object() -> Self {
        Value::Object(Shared::new(Fields::new()))
    }

    /// Creates an object from key/value pairs.
    pub fn object_from<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let fields = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Value::Object(Shared::new(fields))
    }

    /// Creates an array from the given items.
    pub fn array(items: impl IntoIterator<Item = impl Into<Value>>) -> Self {
        Value::Array(Shared::new(items.into_iter().map(Into::into).collect()))
    }

    /// Sets a field on an object. Returns the previous value, if any.
    ///
    /// Has no effect on non-object values.
    pub fn insert(&self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        match self {
            Value::Object(shared) => shared.write(|fields| fields.insert(key.into(), value.into())),
            _ => None,
        }
    }

    /// Appends an item to an array. Has no effect on non-array values.
    pub fn push(&self, value: impl Into<Value>) {
        if let Value::Array(shared) = self {
            shared.write(|items| items.push(value.into()));
        }
    }

    /// Returns a field of an object (a cheap handle clone for containers).
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(shared) => shared.read().get(key).cloned(),
            _ => None,
        }
    }

    /// Returns an element of an array.
    pub fn at(&self, index: usize) -> Option<Value> {
        match self {
            Value::Array(shared) => shared.read().get(index).cloned(),
            _ => None,
        }
    }

    /// Number of elements or fields; `None` for scalars.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Array(shared) => Some(shared.read().len()),
            Value::Object(shared) => Some(shared.read().len()),
            _ => None,
        }
    }

    /// Returns true for `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for arrays and objects.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::Array(_) | Value::Object(_))
    }

    /// Numeric view of the value.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// Integer view of the value.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Text view of the value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Boolean view of the value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Short type name used in messages and degraded renderings.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Identity of the container, `None` for scalars.
    pub fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(shared) => Some(shared.identity()),
            Value::Object(shared) => Some(shared.identity()),
            _ => None,
        }
    }

    /// A one-level description that never descends into containers.
    pub fn describe(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => format!("'{}'", s),
            Value::Array(shared) => match shared.try_read() {
                Ok(items) => format!("[Array({})]", items.len()),
                Err(_) => "[Array]".to_string(),
            },
            Value::Object(shared) => match shared.try_read() {
                Ok(fields) => {
                    let keys: Vec<&str> = fields.keys().map(String::as_str).collect();
                    format!("[Object {{ {} }}]", keys.join(", "))
                }
                Err(_) => "[Object]".to_string(),
            },
        }
    }

    /// Converts to a JSON tree. Fails on cycles and poisoned containers.
    pub fn to_json(&self) -> Result<serde_json::Value, ValueError> {
        let mut path = Vec::new();
        self.to_json_inner(&mut path)
    }

    fn to_json_inner(&self, path: &mut Vec<usize>) -> Result<serde_json::Value, ValueError> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Array(shared) => {
                let id = shared.identity();
                if path.contains(&id) {
                    return Err(ValueError::Cyclic);
                }
                let items: Vec<Value> = shared.try_read()?.clone();
                path.push(id);
                let out = items
                    .iter()
                    .map(|item| item.to_json_inner(path))
                    .collect::<Result<Vec<_>, _>>()?;
                path.pop();
                serde_json::Value::Array(out)
            }
            Value::Object(shared) => {
                let id = shared.identity();
                if path.contains(&id) {
                    return Err(ValueError::Cyclic);
                }
                let fields: Fields = shared.try_read()?.clone();
                path.push(id);
                let mut out = serde_json::Map::new();
                for (key, value) in &fields {
                    out.insert(key.clone(), value.to_json_inner(path)?);
                }
                path.pop();
                serde_json::Value::Object(out)
            }
        })
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_json() {
            Ok(json) => write!(f, "{}", json),
            Err(_) => write!(f, "{}", self.describe()),
        }
    }
}

/// Scalars compare by value; containers compare by identity, or by their
/// JSON form when both are acyclic.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) if a.ptr_eq(b) => true,
            (Value::Object(a), Value::Object(b)) if a.ptr_eq(b) => true,
            (Value::Array(_), Value::Array(_)) | (Value::Object(_), Value::Object(_)) => {
                match (self.to_json(), other.to_json()) {
                    (Ok(a), Ok(b)) => a == b,
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::array(items),
            serde_json::Value::Object(map) => Value::object_from(map),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n.into())
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n.into())
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(n.into())
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n.into())
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number((n as u64).into())
    }
}

/// Non-finite floats have no JSON form and become `Null`.
impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::array(items)
    }
}

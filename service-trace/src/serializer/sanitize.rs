use super::{SerializeError, Serializer, http};
use crate::constants::{
    CIRCULAR_MARKER, MAX_NESTING, REMOVED_MARKER, REQUEST_FIELD, RESPONSE_FIELD,
};
use crate::value::{Fields, Value};
use serde_json::Value as Json;
use std::collections::HashSet;

/// One serialization pass. The visited set lives exactly as long as the pass.
pub(super) struct Sanitizer<'a> {
    serializer: &'a Serializer,
    visited: HashSet<usize>,
}

impl<'a> Sanitizer<'a> {
    pub(super) fn new(serializer: &'a Serializer) -> Self {
        Self {
            serializer,
            visited: HashSet::new(),
        }
    }

    pub(super) fn run(mut self, value: &Value) -> Result<Json, SerializeError> {
        self.node(value, 0)
    }

    fn node(&mut self, value: &Value, depth: usize) -> Result<Json, SerializeError> {
        if depth > MAX_NESTING {
            return Err(SerializeError::TooDeep { limit: MAX_NESTING });
        }

        match value {
            Value::Null => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Number(n) => Ok(Json::Number(n.clone())),
            Value::String(s) => Ok(Json::String(s.clone())),
            Value::Array(shared) => {
                if !self.visited.insert(shared.identity()) {
                    return Ok(Json::String(CIRCULAR_MARKER.to_string()));
                }
                // Copy the handles out so no lock is held while recursing.
                let items: Vec<Value> = shared.try_read()?.clone();
                if items.len() > self.serializer.max_array_length() {
                    return Ok(Json::String(format!("Array({})", items.len())));
                }
                items
                    .iter()
                    .map(|item| self.node(item, depth + 1))
                    .collect::<Result<Vec<_>, _>>()
                    .map(Json::Array)
            }
            Value::Object(shared) => {
                if !self.visited.insert(shared.identity()) {
                    return Ok(Json::String(CIRCULAR_MARKER.to_string()));
                }
                let fields: Fields = shared.try_read()?.clone();
                self.fields(&fields, depth)
            }
        }
    }

    fn field(&mut self, name: &str, value: &Value, depth: usize) -> Result<Json, SerializeError> {
        if self.serializer.is_removed(name) {
            return Ok(Json::String(REMOVED_MARKER.to_string()));
        }

        let projected = match name {
            REQUEST_FIELD => http::request_projection(value)?,
            RESPONSE_FIELD => http::response_projection(value)?,
            _ => None,
        };

        match projected {
            Some(projection) => {
                if depth > MAX_NESTING {
                    return Err(SerializeError::TooDeep { limit: MAX_NESTING });
                }
                self.fields(&projection, depth)
            }
            None => self.node(value, depth),
        }
    }

    fn fields(&mut self, fields: &Fields, depth: usize) -> Result<Json, SerializeError> {
        let mut out = serde_json::Map::new();
        for (name, field) in fields {
            out.insert(name.clone(), self.field(name, field, depth + 1)?);
        }
        Ok(Json::Object(out))
    }
}

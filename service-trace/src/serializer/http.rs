//! Reduced views of HTTP request/response objects.
//!
//! Only applied to fields named exactly `req` / `res`.

use crate::value::{Fields, Value, ValueError};

fn read_field(value: &Value, key: &str) -> Result<Option<Value>, ValueError> {
    match value {
        Value::Object(shared) => Ok(shared.try_read()?.get(key).cloned()),
        _ => Ok(None),
    }
}

/// `{method, url, headers, remoteAddress, remotePort}` for an object that
/// carries a `connection` object. Missing source fields are left out.
///
/// Projections are plain field maps, not containers, so they never take
/// part in cycle detection.
pub(super) fn request_projection(req: &Value) -> Result<Option<Fields>, ValueError> {
    let connection = match read_field(req, "connection")? {
        Some(conn @ Value::Object(_)) => conn,
        _ => return Ok(None),
    };

    let mut projection = Fields::new();
    for key in ["method", "url", "headers"] {
        if let Some(v) = read_field(req, key)? {
            projection.insert(key.to_string(), v);
        }
    }
    for key in ["remoteAddress", "remotePort"] {
        if let Some(v) = read_field(&connection, key)? {
            projection.insert(key.to_string(), v);
        }
    }
    Ok(Some(projection))
}

/// `{statusCode, header}` for an object with a numeric `statusCode`;
/// `header` comes from the internal `_header` field.
pub(super) fn response_projection(res: &Value) -> Result<Option<Fields>, ValueError> {
    let status = match read_field(res, "statusCode")? {
        Some(code @ Value::Number(_)) => code,
        _ => return Ok(None),
    };

    let mut projection = Fields::new();
    projection.insert("statusCode".to_string(), status);
    if let Some(header) = read_field(res, "_header")? {
        projection.insert("header".to_string(), header);
    }
    Ok(Some(projection))
}

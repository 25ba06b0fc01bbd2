//! Positional ↔ named argument mapping.
//!
//! Operations are called with positional arguments, but schemas and log
//! records work with names. The declared parameter list is the bridge.

use crate::value::Value;
use std::collections::BTreeMap;

/// Arguments keyed by parameter name.
pub type NamedArgs = BTreeMap<String, Value>;

/// Maps positional arguments to parameter names by position.
///
/// Arguments beyond the declared parameters are left out, and parameters
/// without an argument are absent from the mapping.
pub fn to_named(params: &[String], args: &[Value]) -> NamedArgs {
    params
        .iter()
        .zip(args.iter())
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Rebuilds the positional list from a (normalized) mapping.
///
/// Declared parameters come first, in declaration order, with `Null` for
/// any the mapping lacks. Surplus arguments from `original` (those beyond
/// the declared count) are appended unchanged.
pub fn to_positional(params: &[String], mut named: NamedArgs, original: &[Value]) -> Vec<Value> {
    let mut args: Vec<Value> = params
        .iter()
        .map(|name| named.remove(name).unwrap_or_default())
        .collect();
    if original.len() > params.len() {
        args.extend(original[params.len()..].iter().cloned());
    }
    args
}

/// Wraps a mapping in an object value, e.g. for serialization.
pub fn named_to_value(named: &NamedArgs) -> Value {
    Value::object_from(named.iter().map(|(k, v)| (k.clone(), v.clone())))
}

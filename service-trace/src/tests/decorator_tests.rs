use super::mock_runtime;
use crate::logging::LogLevel;
use crate::schema::{FieldRule, ObjectSchema};
use crate::{
    CallError, ConfigureOptions, ErrorCode, Operation, OperationError, Operations, Service, Value,
};

use proptest::prelude::*;
use std::collections::HashSet;

fn add() -> Operation {
    Operation::sync(|args| {
        let a = args[0].as_f64().unwrap_or_default();
        let b = args[1].as_f64().unwrap_or_default();
        Ok(Value::from(a + b))
    })
    .with_params(["a", "b"])
    .with_schema(
        ObjectSchema::new()
            .field("a", FieldRule::number().required())
            .field("b", FieldRule::number().required()),
    )
}

fn find_user() -> Operation {
    Operation::deferred(|args: Vec<Value>| async move {
        match args[0].as_i64() {
            Some(1) => Ok(Value::object_from([
                ("id", Value::from(1)),
                ("password", Value::from("hash")),
            ])),
            _ => Err(OperationError::not_found("user not found")),
        }
    })
    .with_params(["id"])
    .with_schema(ObjectSchema::new().field("id", FieldRule::integer().required()))
}

fn calculator() -> Service {
    Service::new("calculator")
        .operation("add", add())
        .operation("divide", {
            Operation::sync(|args| {
                let a = args[0].as_f64().unwrap_or_default();
                let b = args[1].as_f64().unwrap_or_default();
                if b == 0.0 {
                    return Err(OperationError::bad_request("division by zero"));
                }
                Ok(Value::from(a / b))
            })
            .with_params(["a", "b"])
        })
}

// =============================================================================
// End-to-end
// =============================================================================

#[test]
fn test_add_with_text_arguments() {
    let (runtime, logger) = mock_runtime();
    let mut service = calculator();
    service.decorate(&runtime);

    let sum = service
        .call("add", vec!["1".into(), "2".into()])
        .into_ready()
        .unwrap()
        .unwrap();
    assert_eq!(sum.as_f64(), Some(3.0));

    let records = logger.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].service, "calculator");
    assert_eq!(records[0].message, "ENTER add:");
    assert_eq!(records[0].payload, "{ a: 1, b: 2 }");
    assert_eq!(records[1].message, " EXIT add:");
    assert_eq!(records[1].payload, "3.0");
}

#[test]
fn test_decorated_result_matches_undecorated() {
    let (runtime, _) = mock_runtime();
    let original = add();
    let mut operations = Operations::new();
    operations.insert("add".into(), original.clone());
    runtime.decorate(&mut operations, "calc");

    let args = vec![Value::from(4), Value::from(5)];
    let plain = original.call(args.clone()).into_ready().unwrap();
    let decorated = operations["add"].call(args).into_ready().unwrap();
    assert_eq!(plain, decorated);
}

#[test]
fn test_decoration_carries_metadata() {
    let (runtime, _) = mock_runtime();
    let mut operations = Operations::new();
    operations.insert("add".into(), add().with_remove_output(true));
    operations.insert("find".into(), find_user());
    runtime.decorate(&mut operations, "svc");

    let add = &operations["add"];
    assert!(add.is_decorated());
    assert_eq!(add.method_name(), Some("add"));
    assert_eq!(add.params(), Some(&["a".to_string(), "b".to_string()][..]));
    assert!(add.schema().is_some());
    assert!(add.remove_output());
    assert!(add.is_synchronous());

    assert!(!operations["find"].is_synchronous());
}

#[test]
fn test_earlier_clones_stay_undecorated() {
    let (runtime, logger) = mock_runtime();
    let mut service = calculator();
    let before = service.get("add").cloned().unwrap();
    service.decorate(&runtime);

    let _ = before.call(vec![1.into(), 2.into()]);
    assert!(logger.is_empty());
    assert!(!before.is_decorated());
}

#[test]
fn test_operation_error_passes_through() {
    let (runtime, logger) = mock_runtime();
    let mut service = calculator();
    service.decorate(&runtime);

    let err = service
        .call("divide", vec![1.into(), 0.into()])
        .into_ready()
        .unwrap()
        .unwrap_err();
    assert_eq!(
        err,
        CallError::Operation(OperationError::bad_request("division by zero"))
    );
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "ERROR divide:");
}

#[test]
fn test_unknown_operation() {
    let service = calculator();
    let err = service
        .call("multiply", vec![])
        .into_ready()
        .unwrap()
        .unwrap_err();
    assert_eq!(err.as_operation().map(|e| e.code), Some(ErrorCode::NotFound));
}

#[test]
fn test_method_names_are_sorted() {
    assert_eq!(calculator().method_names(), vec!["add", "divide"]);
}

// =============================================================================
// Validation through the decorator
// =============================================================================

#[test]
fn test_sync_validation_failure_is_immediate_and_logged() {
    let (runtime, logger) = mock_runtime();
    let mut service = calculator();
    service.decorate(&runtime);

    let outcome = service.call("add", vec!["x".into(), 2.into()]);
    assert!(!outcome.is_deferred());
    let err = outcome.into_ready().unwrap().unwrap_err();
    assert_eq!(err.as_validation().map(|e| e.field.as_str()), Some("a"));

    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert_eq!(
        errors[0].payload,
        "validation failed: \"a\" must be a number"
    );
    assert_eq!(logger.records()[0].payload, "{ a: 'x', b: 2 }");
}

#[tokio::test]
async fn test_deferred_validation_failure_is_deferred() {
    let (runtime, logger) = mock_runtime();
    let mut service = Service::new("users").operation("find", find_user());
    service.decorate(&runtime);

    let outcome = service.call("find", vec!["abc".into()]);
    assert!(outcome.is_deferred());
    let err = outcome.await.unwrap_err();
    assert!(err.is_validation());
    assert_eq!(logger.records_at(LogLevel::Error).len(), 1);
}

#[tokio::test]
async fn test_deferred_success_and_failure() {
    let (runtime, logger) = mock_runtime();
    let mut service = Service::new("users").operation("find", find_user());
    service.decorate(&runtime);

    let user = service.call_async("find", vec!["1".into()]).await.unwrap();
    assert_eq!(user.get("id"), Some(Value::from(1)));
    assert_eq!(logger.records()[0].payload, "{ id: 1 }");
    assert_eq!(logger.records()[1].payload, "{ id: 1, password: '<removed>' }");

    let err = service.call_async("find", vec![2.into()]).await.unwrap_err();
    assert_eq!(err.as_operation().map(|e| e.code), Some(ErrorCode::NotFound));
    let errors = logger.records_at(LogLevel::Error);
    assert_eq!(
        errors[0].payload,
        "method=find input={ id: 2 } error=[NOT_FOUND] user not found"
    );
}

// =============================================================================
// Parameter names
// =============================================================================

#[test]
fn test_resolver_supplies_undeclared_params() {
    let (runtime, logger) = mock_runtime();
    runtime
        .configure(ConfigureOptions::new().with_param_resolver(|method| {
            (method == "greet").then(|| vec!["name".to_string()])
        }))
        .unwrap();

    let mut service = Service::new("greeter").operation(
        "greet",
        Operation::sync(|args| Ok(Value::from(format!("hi {}", args[0].as_str().unwrap_or("?"))))),
    );
    service.decorate(&runtime);

    let _ = service.call("greet", vec!["ann".into()]);
    assert_eq!(logger.records()[0].payload, "{ name: 'ann' }");
    assert_eq!(
        service.get("greet").and_then(|op| op.params()),
        Some(&["name".to_string()][..])
    );
}

#[test]
fn test_unknown_params_render_empty_input() {
    let (runtime, logger) = mock_runtime();
    let mut service = Service::new("misc").operation("now", Operation::sync(|_| Ok(Value::from(0))));
    service.decorate(&runtime);

    let _ = service.call("now", vec![1.into(), 2.into()]);
    assert_eq!(logger.records()[0].payload, "{}");
}

// =============================================================================
// Configuration at call time
// =============================================================================

#[test]
fn test_reconfiguration_applies_without_redecoration() {
    let (runtime, logger) = mock_runtime();
    let mut service = Service::new("svc").operation(
        "echo",
        Operation::sync(|args| Ok(args[0].clone())).with_params(["ssn"]),
    );
    service.decorate(&runtime);

    let _ = service.call("echo", vec!["123".into()]);
    runtime
        .configure(ConfigureOptions::new().with_remove_fields(["ssn"]))
        .unwrap();
    let _ = service.call("echo", vec!["123".into()]);
    runtime
        .configure(ConfigureOptions::new().with_debug(false))
        .unwrap();
    let _ = service.call("echo", vec!["123".into()]);

    let records = logger.records();
    assert_eq!(records.len(), 4);
    assert_eq!(records[0].payload, "{ ssn: '123' }");
    assert_eq!(records[2].payload, "{ ssn: '<removed>' }");
}

#[test]
fn test_reset_restarts_ids() {
    let (runtime, logger) = mock_runtime();
    let mut service = calculator();
    service.decorate(&runtime);

    let _ = service.call("add", vec![1.into(), 1.into()]);
    let _ = service.call("add", vec![1.into(), 1.into()]);
    runtime.reset_counter();
    logger.clear();
    let _ = service.call("add", vec![1.into(), 1.into()]);
    assert_eq!(logger.records()[0].id.get(), 1);
}

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    /// Property: every call gets one fresh id, shared by exactly one enter
    /// and one exit-or-error record, and ids strictly increase.
    #[test]
    fn prop_one_id_per_call(inputs in prop::collection::vec(prop_oneof![
        any::<i32>().prop_map(|n| n.to_string()),
        "[a-z]{1,4}",
    ], 1..20)) {
        let (runtime, logger) = mock_runtime();
        let mut service = calculator();
        service.decorate(&runtime);

        for input in &inputs {
            let _ = service.call("add", vec![input.as_str().into(), 1.into()]);
        }

        let records = logger.records();
        prop_assert_eq!(records.len(), inputs.len() * 2);
        let mut seen = HashSet::new();
        let mut last = 0;
        for pair in records.chunks(2) {
            prop_assert_eq!(pair[0].id, pair[1].id);
            prop_assert!(pair[0].message.starts_with("ENTER"));
            prop_assert!(pair[1].id.get() > last);
            last = pair[1].id.get();
            prop_assert!(seen.insert(pair[0].id));
        }
    }
}

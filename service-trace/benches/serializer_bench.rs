use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use serde_json::json;
use service_trace::{Logger, Operation, Operations, Runtime, Serializer, Value};
use service_trace::logging::CallContext;
use std::hint::black_box;
use std::sync::Arc;

struct NullLogger;

impl Logger for NullLogger {
    fn debug(&self, _: &CallContext, _: &str, _: &str) {}
    fn error(&self, _: &CallContext, _: &str, _: &str) {}
}

fn user(id: i64) -> Value {
    Value::from(json!({
        "id": id,
        "name": "Alice",
        "email": "alice@example.com",
        "password": "hunter2",
        "roles": ["admin", "user"],
        "profile": {"bio": "Hello", "address": {"city": "Paris", "zip": "75001"}}
    }))
}

fn bench_serialize(c: &mut Criterion) {
    let mut group = c.benchmark_group("serialize");
    let serializer = Serializer::default();

    group.bench_function("flat_object", |b| {
        let value = Value::object_from([("a", 1), ("b", 2), ("c", 3)]);
        b.iter(|| serializer.serialize(black_box(&value)));
    });

    group.bench_function("nested_user", |b| {
        let value = user(1);
        b.iter(|| serializer.serialize(black_box(&value)));
    });

    group.bench_function("cyclic", |b| {
        let value = user(1);
        value.insert("self", value.clone());
        b.iter(|| serializer.serialize(black_box(&value)));
    });

    for len in [10usize, 30, 1000] {
        group.bench_with_input(BenchmarkId::new("array", len), &len, |b, &len| {
            let value = Value::array((0..len as i64).map(user));
            b.iter(|| serializer.serialize(black_box(&value)));
        });
    }

    group.finish();
}

fn bench_decorated_call(c: &mut Criterion) {
    let mut group = c.benchmark_group("decorated_call");

    let add = || {
        Operation::sync(|args| {
            let a = args[0].as_f64().unwrap_or_default();
            let b = args[1].as_f64().unwrap_or_default();
            Ok(Value::from(a + b))
        })
        .with_params(["a", "b"])
    };

    group.bench_function("undecorated", |b| {
        let op = add();
        b.iter(|| op.call(black_box(vec![1.into(), 2.into()])));
    });

    group.bench_function("decorated", |b| {
        let runtime = Runtime::new();
        runtime
            .configure(
                service_trace::ConfigureOptions::new()
                    .with_logger_factory(|_, _| Arc::new(NullLogger) as Arc<dyn Logger>),
            )
            .unwrap();
        let mut operations = Operations::new();
        operations.insert("add".into(), add());
        runtime.decorate(&mut operations, "bench");
        let op = &operations["add"];
        b.iter(|| op.call(black_box(vec![1.into(), 2.into()])));
    });

    group.finish();
}

criterion_group!(benches, bench_serialize, bench_decorated_call);
criterion_main!(benches);

//! Demo application for service-trace
//!
//! Builds the example services, decorates them and drives a short script
//! of calls, so the enter/exit records can be seen on the console.

pub mod services;

use service_trace::{CallResult, ConfigValidationError, ConfigureOptions, Runtime, Service, Value};
use services::{AppContext, calculator_service, users_service};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Errors that stop the demo before any call is made.
#[derive(Debug, Error)]
pub enum DemoError {
    /// The options file could not be read.
    #[error("failed to read options file: {0}")]
    Io(#[from] std::io::Error),
    /// The options were rejected.
    #[error(transparent)]
    Config(#[from] ConfigValidationError),
}

/// Initialize tracing with the SERVICE_TRACE_LOG environment variable.
///
/// Defaults to "debug" so that enter/exit records are visible.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env("SERVICE_TRACE_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Applies a JSON options file (camelCase keys) to `runtime`.
pub fn load_options(runtime: &Runtime, path: &Path) -> Result<(), DemoError> {
    let json = std::fs::read_to_string(path)?;
    runtime.configure(ConfigureOptions::from_json(&json)?)?;
    info!(path = %path.display(), "Loaded service-trace options");
    Ok(())
}

/// The example services, decorated with `runtime`.
pub fn decorated_services(runtime: &Arc<Runtime>) -> (Service, Service) {
    let mut calculator = calculator_service();
    let mut users = users_service(AppContext::new());
    calculator.decorate(runtime);
    users.decorate(runtime);
    (calculator, users)
}

fn describe(call: &str, result: &CallResult) -> String {
    match result {
        Ok(value) => format!("{} -> {:?}", call, value),
        Err(error) => format!("{} -> error: {}", call, error),
    }
}

/// Runs the demo script and returns one line per call.
pub async fn run_script(runtime: &Arc<Runtime>) -> Vec<String> {
    let (calculator, users) = decorated_services(runtime);
    let mut transcript = Vec::new();

    let calls: [(&Service, &str, Vec<Value>); 9] = [
        (&calculator, "add", vec!["1".into(), "2".into()]),
        (&calculator, "divide", vec![10.into(), 4.into()]),
        (&calculator, "divide", vec![1.into(), 0.into()]),
        (&calculator, "add", vec!["one".into(), 2.into()]),
        (&users, "get", vec![1.into()]),
        (&users, "get", vec![42.into()]),
        (
            &users,
            "create",
            vec!["Carol".into(), "carol@example.com".into(), "s3cret!".into()],
        ),
        (
            &users,
            "login",
            vec!["carol@example.com".into(), "s3cret!".into()],
        ),
        (&users, "list", vec![2.into()]),
    ];

    for (service, method, args) in calls {
        let label = format!("{}.{}", service.name(), method);
        let result = service.call_async(method, args).await;
        transcript.push(describe(&label, &result));
    }

    transcript
}

//! Test module for service-trace
//!
//! Unit tests plus property-based tests using proptest. Tests that decorate
//! operations build their own [`Runtime`] so that correlation ids and
//! settings never leak between tests.

use crate::logging::{Logger, MockLogger};
use crate::{ConfigureOptions, Runtime};
use std::sync::Arc;


#[cfg(test)]
pub mod config_tests;

#[cfg(test)]
pub mod decorator_tests;






/// A fresh runtime whose services all log into the returned mock.
pub fn mock_runtime() -> (Arc<Runtime>, MockLogger) {
    let sink = MockLogger::new();
    let runtime = Runtime::new();
    let factory_sink = sink.clone();
    runtime
        .configure(
            ConfigureOptions::new().with_logger_factory(move |service, _| {
                Arc::new(factory_sink.for_service(service, true)) as Arc<dyn Logger>
            }),
        )
        .unwrap();
    (runtime, sink)
}

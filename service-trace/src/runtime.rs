//! Process-scoped runtime state
//!
//! A [`Runtime`] owns the two pieces of shared state the decorator needs:
//! the current [`Settings`] and the correlation counter. Decorated
//! operations hold an `Arc<Runtime>` and read both on every call, so
//! reconfiguring a runtime affects operations that were decorated before.
//!
//! Most programs use the lazily-created [`Runtime::global`] through the
//! crate-level [`configure`](crate::configure) and
//! [`decorate`](crate::decorate) functions. Tests usually build their own.

use crate::config::{ConfigValidationError, ConfigureOptions, Settings};
use crate::logging::CorrelationId;
use crate::serializer::Serializer;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::{debug, info};

struct State {
    settings: Settings,
    serializer: Serializer,
}

impl State {
    fn new(settings: Settings) -> Self {
        let serializer = Serializer::new(&settings);
        Self {
            settings,
            serializer,
        }
    }
}

static GLOBAL: LazyLock<Arc<Runtime>> = LazyLock::new(Runtime::new);

/// Settings plus correlation counter.
pub struct Runtime {
    state: RwLock<State>,
    counter: AtomicU64,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("settings", &self.settings())
            .field("last_id", &self.counter.load(Ordering::SeqCst))
            .finish()
    }
}

impl Runtime {
    /// Creates a runtime with default settings.
    pub fn new() -> Arc<Self> {
        Self::with_settings(Settings::default())
    }

    /// Creates a runtime with the given settings.
    pub fn with_settings(settings: Settings) -> Arc<Self> {
        Arc::new(Self {
            state: RwLock::new(State::new(settings)),
            counter: AtomicU64::new(0),
        })
    }

    /// The process-wide runtime.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    /// Merges `options` into the current settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the merged settings are invalid; the current
    /// settings are then left unchanged.
    pub fn configure(&self, options: ConfigureOptions) -> Result<(), ConfigValidationError> {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let next = state.settings.merged(options);
        next.validate()?;
        info!(
            removed_fields = next.removed_field_names.len(),
            verbose = next.verbose,
            max_depth = next.max_depth,
            max_array_length = next.max_array_length,
            "Runtime reconfigured"
        );
        *state = State::new(next);
        Ok(())
    }

    /// A copy of the current settings.
    pub fn settings(&self) -> Settings {
        self.read_state(|state| state.settings.clone())
    }

    /// A serializer for the current settings.
    pub fn serializer(&self) -> Serializer {
        self.read_state(|state| state.serializer.clone())
    }

    /// Whether enter/exit records are currently enabled.
    pub fn is_verbose(&self) -> bool {
        self.read_state(|state| state.settings.verbose)
    }

    /// Allocates the next correlation id. The first id is 1.
    pub fn next_correlation_id(&self) -> CorrelationId {
        CorrelationId(self.counter.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Restarts correlation ids at 1.
    pub fn reset_counter(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }

    /// Restores default settings and restarts correlation ids at 1.
    pub fn reset(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state = State::new(Settings::default());
        self.reset_counter();
        debug!("Runtime reset to defaults");
    }

    fn read_state<R>(&self, f: impl FnOnce(&State) -> R) -> R {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }
}

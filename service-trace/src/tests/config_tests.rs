use crate::config::{ConfigValidationError, ConfigureOptions, Settings};
use crate::constants::{DEFAULT_MAX_ARRAY_LENGTH, DEFAULT_MAX_DEPTH, MAX_NESTING};
use crate::{Runtime, Value};

use proptest::prelude::*;

// =============================================================================
// Defaults and merging
// =============================================================================

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert!(settings.verbose);
    assert_eq!(settings.max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(settings.max_array_length, DEFAULT_MAX_ARRAY_LENGTH);
    for field in ["password", "token", "accessToken"] {
        assert!(settings.removed_field_names.contains(field));
    }
    assert!(settings.param_resolver.is_none());
    assert!(settings.validate().is_ok());
}

#[test]
fn test_merge_overwrites_present_keys_only() {
    let merged = Settings::default().merged(ConfigureOptions::new().with_depth(2));
    assert_eq!(merged.max_depth, 2);
    assert_eq!(merged.max_array_length, DEFAULT_MAX_ARRAY_LENGTH);
    assert!(merged.verbose);
    assert!(merged.removed_field_names.contains("password"));
}

#[test]
fn test_merges_accumulate() {
    let runtime = Runtime::new();
    runtime
        .configure(ConfigureOptions::new().with_depth(2))
        .unwrap();
    runtime
        .configure(ConfigureOptions::new().with_max_array_length(5))
        .unwrap();

    let settings = runtime.settings();
    assert_eq!(settings.max_depth, 2);
    assert_eq!(settings.max_array_length, 5);
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn test_empty_field_name_is_rejected() {
    let runtime = Runtime::new();
    let err = runtime
        .configure(ConfigureOptions::new().with_remove_fields(["ok", ""]))
        .unwrap_err();
    assert_eq!(err, ConfigValidationError::EmptyFieldName);
}

#[test]
fn test_excessive_depth_is_rejected() {
    let runtime = Runtime::new();
    let err = runtime
        .configure(ConfigureOptions::new().with_depth(MAX_NESTING + 1))
        .unwrap_err();
    assert!(matches!(err, ConfigValidationError::DepthTooLarge { .. }));
}

#[test]
fn test_rejected_options_leave_settings_unchanged() {
    let runtime = Runtime::new();
    let _ = runtime.configure(
        ConfigureOptions::new()
            .with_max_array_length(1)
            .with_remove_fields([""]),
    );
    assert_eq!(runtime.settings().max_array_length, DEFAULT_MAX_ARRAY_LENGTH);
}

// =============================================================================
// JSON options
// =============================================================================

#[test]
fn test_options_from_json() {
    let options = ConfigureOptions::from_json(
        r#"{"removeFields": ["secret"], "debug": false, "depth": 3, "maxArrayLength": 10}"#,
    )
    .unwrap();
    let settings = Settings::default().merged(options);
    assert!(!settings.verbose);
    assert_eq!(settings.max_depth, 3);
    assert_eq!(settings.max_array_length, 10);
    assert!(settings.removed_field_names.contains("secret"));
    assert!(!settings.removed_field_names.contains("password"));
}

#[test]
fn test_unknown_json_key_is_rejected() {
    let err = ConfigureOptions::from_json(r#"{"maxDepth": 3}"#).unwrap_err();
    assert!(matches!(err, ConfigValidationError::Parse(_)));
}

// =============================================================================
// Runtime
// =============================================================================

#[test]
fn test_ids_start_at_one_and_increase() {
    let runtime = Runtime::new();
    assert_eq!(runtime.next_correlation_id().get(), 1);
    assert_eq!(runtime.next_correlation_id().get(), 2);
    runtime.reset_counter();
    assert_eq!(runtime.next_correlation_id().get(), 1);
}

#[test]
fn test_reset_restores_defaults() {
    let runtime = Runtime::new();
    runtime
        .configure(ConfigureOptions::new().with_debug(false).with_depth(1))
        .unwrap();
    let _ = runtime.next_correlation_id();
    runtime.reset();

    assert!(runtime.is_verbose());
    assert_eq!(runtime.settings().max_depth, DEFAULT_MAX_DEPTH);
    assert_eq!(runtime.next_correlation_id().get(), 1);
}

#[test]
fn test_ids_are_unique_across_threads() {
    let runtime = Runtime::new();
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let runtime = runtime.clone();
            std::thread::spawn(move || {
                (0..250)
                    .map(|_| runtime.next_correlation_id().get())
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let mut ids: Vec<u64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    ids.sort_unstable();
    assert_eq!(ids, (1..=1000).collect::<Vec<_>>());
}

#[test]
fn test_global_serialize_uses_global_settings() {
    let rendered = crate::serialize(&Value::object_from([("password", "x")]));
    assert_eq!(rendered, "{ password: '<removed>' }");
}

// =============================================================================
// Property-Based Tests
// =============================================================================

proptest! {
    /// Property: any depth up to the nesting guard is accepted.
    #[test]
    fn prop_valid_depths_accepted(depth in 0usize..=MAX_NESTING) {
        let runtime = Runtime::new();
        prop_assert!(runtime.configure(ConfigureOptions::new().with_depth(depth)).is_ok());
        prop_assert_eq!(runtime.settings().max_depth, depth);
    }

    /// Property: non-empty field names are always accepted and replace the set.
    #[test]
    fn prop_field_names_replace_set(
        names in prop::collection::hash_set("[a-zA-Z]{1,12}", 1..8)
    ) {
        let runtime = Runtime::new();
        prop_assert!(runtime
            .configure(ConfigureOptions::new().with_remove_fields(names.clone()))
            .is_ok());
        prop_assert_eq!(runtime.settings().removed_field_names, names);
    }
}

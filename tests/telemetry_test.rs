//! Integration tests for telemetry initialization and span helpers.

use parallel_runner::Runner;
use parallel_runner::model::Mode;
use std::time::Duration;
use uuid::Uuid;

#[test]
fn telemetry_initializes_without_endpoint() {
    // A subscriber can only be set once per process, so a second init
    // returning Err is acceptable.
    let config = parallel_runner::telemetry::TelemetryConfig {
        endpoint: None,
        service_name: "runner-test".to_string(),
    };
    if let Ok(guard) = parallel_runner::telemetry::init_telemetry(config) {
        assert!(!guard.is_exporting());
    }
}

#[test]
fn telemetry_config_treats_empty_endpoint_as_unset() {
    unsafe {
        std::env::set_var("OTEL_ENDPOINT", "");
    }
    let config = parallel_runner::telemetry::TelemetryConfig::from_env("runner-test");
    assert!(config.endpoint.is_none());
    assert_eq!(config.service_name, "runner-test");
    unsafe {
        std::env::remove_var("OTEL_ENDPOINT");
    }
}

#[test]
fn run_span_creates_and_records_finish() {
    let id = Uuid::new_v4();
    let span = parallel_runner::telemetry::run::start_run_span(&id, Mode::Parallel, 3);
    parallel_runner::telemetry::run::record_run_finished(&span, Duration::from_millis(12), 1);
}

#[test]
fn runs_emit_without_subscriber_or_meter_provider() {
    let mut runner: Runner<u8, ()> = Runner::new();
    runner.add(|| Ok(1));
    runner.add(|| Err(()));
    assert_eq!(runner.run_blocking().unwrap(), vec![Ok(1), Err(())]);
}

//! Metric instrument factories for parallel-runner.
//!
//! Uses the OTel Meter API with the globally-registered `MeterProvider`.
//! Without an installed provider every instrument is a no-op.

use opentelemetry::metrics::{Counter, Histogram, Meter};

/// Name of the meter and tracer used by this crate.
pub const METER_NAME: &str = "parallel-runner";

fn meter() -> Meter {
    opentelemetry::global::meter(METER_NAME)
}

/// Counter: runs started.
/// Labels: `mode` ("parallel" | "serial").
pub fn runs_started() -> Counter<u64> {
    meter()
        .u64_counter("runner.runs.started")
        .with_description("Number of runs started")
        .build()
}

/// Counter: jobs that passed the rate gate and began executing.
pub fn jobs_started() -> Counter<u64> {
    meter()
        .u64_counter("runner.jobs.started")
        .with_description("Number of jobs started")
        .build()
}

/// Counter: jobs that returned.
/// Labels: `result` ("ok" | "error").
pub fn jobs_completed() -> Counter<u64> {
    meter()
        .u64_counter("runner.jobs.completed")
        .with_description("Number of jobs completed")
        .build()
}

/// Counter: jobs whose body panicked.
pub fn jobs_panicked() -> Counter<u64> {
    meter()
        .u64_counter("runner.jobs.panicked")
        .with_description("Number of jobs that panicked")
        .build()
}

/// Histogram: job body duration in milliseconds.
pub fn job_duration_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("runner.job.duration_ms")
        .with_description("Job execution duration in milliseconds")
        .with_unit("ms")
        .build()
}

/// Histogram: time a worker spent waiting on the rate gate.
pub fn gate_wait_ms() -> Histogram<f64> {
    meter()
        .f64_histogram("runner.gate.wait_ms")
        .with_description("Time spent waiting for a rate gate slot")
        .with_unit("ms")
        .build()
}

//! Run span helpers.
//!
//! One span covers one `run` or `run_serial` call. Job events emitted by
//! workers nest under it.

use crate::model::Mode;
use std::time::Duration;
use tracing::Span;
use uuid::Uuid;

/// Start a span for one run.
///
/// `run.elapsed_ms` is declared empty and filled in by [`record_run_finished`].
pub fn start_run_span(run_id: &Uuid, mode: Mode, jobs: usize) -> Span {
    tracing::info_span!(
        "runner.run",
        "run.id" = %run_id,
        "run.mode" = mode.as_str(),
        "run.jobs" = jobs,
        "run.elapsed_ms" = tracing::field::Empty,
    )
}

/// Record the total run duration on the span and emit a summary event.
pub fn record_run_finished(span: &Span, elapsed: Duration, failed: usize) {
    let elapsed_ms = elapsed.as_millis() as u64;
    span.record("run.elapsed_ms", elapsed_ms);
    span.in_scope(|| {
        tracing::info!(elapsed_ms, failed, "run finished");
    });
}

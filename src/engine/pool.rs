//! Worker pool: a fixed set of interchangeable workers pulling jobs from one
//! dispatch channel.
//!
//! Every worker loops: take the next job, wait for a rate-gate slot, run the
//! job body on the blocking pool, send the tagged outcome. Joining every
//! worker is the completion barrier for a run.

use crate::engine::gate::RateGate;
use crate::model::{IndexedJob, IndexedResult, JobIndex};
use crate::telemetry::metrics;
use opentelemetry::KeyValue;
use opentelemetry::metrics::{Counter, Histogram};
use std::any::Any;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, warn};

type Dispatch<T, E> = Arc<Mutex<mpsc::Receiver<IndexedJob<T, E>>>>;
type Panic = Box<dyn Any + Send + 'static>;

/// What a worker reports when it runs out of jobs.
struct WorkerExit {
    id: usize,
    handled: usize,
    panic: Option<Panic>,
}

/// A pool of `size` workers sharing one rate gate.
#[derive(Debug, Clone)]
pub struct WorkerPool {
    size: usize,
    gate: RateGate,
}

impl WorkerPool {
    pub fn new(size: usize, gate: RateGate) -> Self {
        Self { size, gate }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Run every job, sending exactly one result per job on `results`.
    ///
    /// Returns once all workers have exited. If a job panicked, the rest of
    /// the jobs still run to completion and the first panic is then resumed
    /// on the caller.
    pub async fn execute<T, E, I>(self, jobs: I, results: mpsc::Sender<IndexedResult<T, E>>)
    where
        T: Send + 'static,
        E: Send + 'static,
        I: ExactSizeIterator<Item = IndexedJob<T, E>>,
    {
        let total = jobs.len();
        let (dispatch_tx, dispatch_rx) = mpsc::channel(total.max(1));
        let dispatch: Dispatch<T, E> = Arc::new(Mutex::new(dispatch_rx));
        let instruments = Instruments::new();

        let mut workers = JoinSet::new();
        for id in 0..self.size {
            workers.spawn(worker(
                id,
                Arc::clone(&dispatch),
                results.clone(),
                self.gate.clone(),
                instruments.clone(),
            ));
        }
        drop(results);

        // Capacity covers every job, so this never waits on a worker.
        for job in jobs {
            if dispatch_tx.send(job).await.is_err() {
                warn!("all workers exited before dispatch finished");
                break;
            }
        }
        drop(dispatch_tx);

        let mut first_panic: Option<Panic> = None;
        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(exit) => {
                    debug!(worker = exit.id, handled = exit.handled, "worker exited");
                    if first_panic.is_none() {
                        first_panic = exit.panic;
                    }
                }
                Err(e) => error!("worker task failed: {e}"),
            }
        }

        if let Some(payload) = first_panic {
            std::panic::resume_unwind(payload);
        }
    }
}

/// One worker loop.
///
/// A panicking job produces no result; the worker keeps the first payload
/// and moves on to the next job.
async fn worker<T, E>(
    id: usize,
    jobs: Dispatch<T, E>,
    results: mpsc::Sender<IndexedResult<T, E>>,
    gate: RateGate,
    instruments: Instruments,
) -> WorkerExit
where
    T: Send + 'static,
    E: Send + 'static,
{
    let mut exit = WorkerExit {
        id,
        handled: 0,
        panic: None,
    };
    loop {
        // Hold the lock only while waiting for the next job.
        let next = jobs.lock().await.recv().await;
        let Some(job) = next else {
            return exit;
        };
        let index = job.index;

        let waited = gate.acquire().await;
        instruments.gate_wait_ms.record(waited.as_secs_f64() * 1000.0, &[]);
        instruments.started.add(1, &[]);
        debug!(worker = id, job = %index, waited_ms = waited.as_millis() as u64, "job started");

        let started = Instant::now();
        let result = match tokio::task::spawn_blocking(move || job.execute()).await {
            Ok(result) => result,
            Err(e) => {
                instruments.panicked.add(1, &[]);
                match e.try_into_panic() {
                    Ok(payload) => {
                        error!(worker = id, job = %index, "job panicked");
                        if exit.panic.is_none() {
                            exit.panic = Some(payload);
                        }
                    }
                    Err(e) => error!(worker = id, job = %index, "job task failed: {e}"),
                }
                continue;
            }
        };
        exit.handled += 1;

        instruments.record_finished(index, result.outcome.is_ok(), started);
        if results.send(result).await.is_err() {
            warn!(worker = id, "result channel closed, stopping");
            return exit;
        }
    }
}

/// Metric instruments shared by the workers of one pool.
#[derive(Clone)]
struct Instruments {
    started: Counter<u64>,
    completed: Counter<u64>,
    panicked: Counter<u64>,
    duration_ms: Histogram<f64>,
    gate_wait_ms: Histogram<f64>,
}

impl Instruments {
    fn new() -> Self {
        Self {
            started: metrics::jobs_started(),
            completed: metrics::jobs_completed(),
            panicked: metrics::jobs_panicked(),
            duration_ms: metrics::job_duration_ms(),
            gate_wait_ms: metrics::gate_wait_ms(),
        }
    }

    fn record_finished(&self, index: JobIndex, ok: bool, started: Instant) {
        let elapsed = started.elapsed();
        let label = if ok { "ok" } else { "error" };
        self.completed.add(1, &[KeyValue::new("result", label)]);
        self.duration_ms.record(elapsed.as_secs_f64() * 1000.0, &[]);
        debug!(job = %index, ok, elapsed_ms = elapsed.as_millis() as u64, "job finished");
    }
}

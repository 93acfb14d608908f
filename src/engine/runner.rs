//! Runner: registration plus the two execution modes.
//!
//! A runner collects jobs with [`Runner::add`], then consumes itself in
//! [`Runner::run`] (parallel) or [`Runner::run_serial`]. Either way the
//! returned vector holds one outcome per job, in registration order.

use crate::config::{RunnerConfig, RunnerOption};
use crate::engine::collector::ResultCollector;
use crate::engine::gate::RateGate;
use crate::engine::pool::WorkerPool;
use crate::engine::queue::JobQueue;
use crate::error::Result;
use crate::model::{IndexedJob, JobIndex, Mode, Outcome};
use crate::telemetry::metrics;
use crate::telemetry::run::{record_run_finished, start_run_span};
use opentelemetry::KeyValue;
use std::time::Instant;
use tokio::sync::mpsc;
use tracing::{Instrument, debug, info};
use uuid::Uuid;

/// Executes registered jobs and returns their outcomes in registration order.
pub struct Runner<T, E> {
    config: RunnerConfig,
    queue: JobQueue<T, E>,
}

impl<T, E> Runner<T, E> {
    /// A runner with no worker cap and no rate limit.
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    /// A runner configured by options such as [`with_limit`] and [`with_ticket`].
    ///
    /// Fails with [`Error::Config`] if an option carries a zero.
    ///
    /// [`with_limit`]: crate::config::with_limit
    /// [`with_ticket`]: crate::config::with_ticket
    /// [`Error::Config`]: crate::error::Error::Config
    pub fn with_options(opts: impl IntoIterator<Item = RunnerOption>) -> Result<Self> {
        Ok(Self::with_config(RunnerConfig::from_options(opts)?))
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        Self {
            config,
            queue: JobQueue::new(),
        }
    }

    pub fn config(&self) -> RunnerConfig {
        self.config
    }

    /// Queue a job without running it. Its outcome lands at the returned index.
    pub fn add<F>(&mut self, job: F) -> JobIndex
    where
        F: FnOnce() -> Outcome<T, E> + Send + 'static,
    {
        self.queue.push(job)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Run every job one at a time, in order, on the calling thread.
    ///
    /// No rate limiting and no concurrency. A panicking job unwinds straight
    /// into the caller.
    pub fn run_serial(self) -> Vec<Outcome<T, E>> {
        let total = self.queue.len();
        let run_id = Uuid::new_v4();
        let span = start_run_span(&run_id, Mode::Serial, total);
        let _entered = span.enter();

        metrics::runs_started().add(1, &[KeyValue::new("mode", Mode::Serial.as_str())]);
        info!(jobs = total, "run started");
        let started = Instant::now();

        let outcomes: Vec<_> = self
            .queue
            .into_indexed()
            .map(|job: IndexedJob<T, E>| {
                let index = job.index;
                let result = job.execute();
                debug!(job = %index, ok = result.outcome.is_ok(), "job finished");
                result.outcome
            })
            .collect();

        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        record_run_finished(&span, started.elapsed(), failed);
        outcomes
    }
}

impl<T, E> Runner<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Run every job on a pool of `min(worker_limit, jobs)` workers, each job
    /// start gated by the configured rate.
    ///
    /// Resolves once every job has finished. If a job panicked, the remaining
    /// jobs still run and the panic is then resumed here.
    pub async fn run(self) -> Vec<Outcome<T, E>> {
        let total = self.queue.len();
        let run_id = Uuid::new_v4();
        let span = start_run_span(&run_id, Mode::Parallel, total);
        let config = self.config;
        let queue = self.queue;

        async move {
            let pool = WorkerPool::new(
                config.worker_limit.cap(total),
                RateGate::from_limit(config.rate_per_second),
            );
            metrics::runs_started().add(1, &[KeyValue::new("mode", Mode::Parallel.as_str())]);
            info!(
                jobs = total,
                workers = pool.size(),
                rate = %config.rate_per_second,
                "run started"
            );
            let started = Instant::now();

            // Sized so no worker ever waits on the collector.
            let (results_tx, mut results_rx) = mpsc::channel(total.max(1));
            pool.execute(queue.into_indexed(), results_tx).await;

            let mut collector = ResultCollector::new(total);
            collector.drain(&mut results_rx).await;
            let outcomes = collector.finish();

            let failed = outcomes.iter().filter(|o| o.is_err()).count();
            record_run_finished(&tracing::Span::current(), started.elapsed(), failed);
            outcomes
        }
        .instrument(span)
        .await
    }

    /// Blocking form of [`Runner::run`] that drives its own tokio runtime.
    ///
    /// Must not be called from inside an async context.
    pub fn run_blocking(self) -> Result<Vec<Outcome<T, E>>> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("parallel-runner")
            .build()?;
        Ok(runtime.block_on(self.run()))
    }
}

impl<T, E> Default for Runner<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> std::fmt::Debug for Runner<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runner")
            .field("config", &self.config)
            .field("jobs", &self.queue.len())
            .finish()
    }
}

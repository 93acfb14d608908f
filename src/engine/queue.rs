//! Staging buffer for registered jobs.

use crate::model::{IndexedJob, Job, JobIndex, Outcome};

/// Ordered, append-only list of jobs waiting for a run.
pub struct JobQueue<T, E> {
    jobs: Vec<Job<T, E>>,
}

impl<T, E> JobQueue<T, E> {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    /// Append a job. Returns the index its result will land at.
    pub fn push<F>(&mut self, job: F) -> JobIndex
    where
        F: FnOnce() -> Outcome<T, E> + Send + 'static,
    {
        let index = JobIndex(self.jobs.len());
        self.jobs.push(Box::new(job));
        index
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Consume the queue, pairing each job with its registration index.
    pub fn into_indexed(self) -> impl ExactSizeIterator<Item = IndexedJob<T, E>> {
        self.jobs
            .into_iter()
            .enumerate()
            .map(|(i, job)| IndexedJob {
                index: JobIndex(i),
                job,
            })
    }
}

impl<T, E> Default for JobQueue<T, E> {
    fn default() -> Self {
        Self::new()
    }
}

//! Core data model.
//!
//! A job is a zero-argument computation that yields either a value or an
//! error. Jobs are identified only by the position they were registered at.

/// The outcome of one job: the value it produced, or its error.
///
/// A job with nothing to report on success can use `T = Option<V>` and
/// return `Ok(None)`.
pub type Outcome<T, E> = std::result::Result<T, E>;

/// A registered computation.
pub type Job<T, E> = Box<dyn FnOnce() -> Outcome<T, E> + Send + 'static>;

/// 0-based registration position of a job. Also the index of its result slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobIndex(pub usize);

impl JobIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

impl std::fmt::Display for JobIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A job tagged with its index. Moved into exactly one worker.
pub struct IndexedJob<T, E> {
    pub index: JobIndex,
    pub job: Job<T, E>,
}

impl<T, E> IndexedJob<T, E> {
    /// Run the job body, tagging the outcome with this job's index.
    pub fn execute(self) -> IndexedResult<T, E> {
        IndexedResult {
            index: self.index,
            outcome: (self.job)(),
        }
    }
}

impl<T, E> std::fmt::Debug for IndexedJob<T, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedJob")
            .field("index", &self.index)
            .finish_non_exhaustive()
    }
}

/// An outcome tagged with the index of the job that produced it.
#[derive(Debug)]
pub struct IndexedResult<T, E> {
    pub index: JobIndex,
    pub outcome: Outcome<T, E>,
}

/// How a run executes its jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Parallel,
    Serial,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Parallel => "parallel",
            Mode::Serial => "serial",
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Execution engine: job queue, rate gate, worker pool, result collector,
//! and the runner that wires them together.

pub mod collector;
pub mod gate;
pub mod pool;
pub mod queue;
pub mod runner;

pub use collector::ResultCollector;
pub use gate::RateGate;
pub use pool::WorkerPool;
pub use queue::JobQueue;
pub use runner::Runner;

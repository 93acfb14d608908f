//! # parallel-runner
//!
//! Runs an ordered list of fallible jobs, either in parallel on a bounded
//! worker pool with an optional start-rate limit, or one at a time. Results
//! come back in registration order regardless of completion order.
//!
//! ```no_run
//! use parallel_runner::{Runner, with_limit, with_ticket};
//!
//! # async fn demo() -> parallel_runner::error::Result<()> {
//! let mut runner: Runner<Option<&str>, String> =
//!     Runner::with_options([with_limit(4), with_ticket(10)])?;
//! runner.add(|| Ok(None));
//! runner.add(|| Err("err-1".to_string()));
//! runner.add(|| Ok(Some("result-2")));
//!
//! let outcomes = runner.run().await;
//! assert_eq!(outcomes[2], Ok(Some("result-2")));
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod telemetry;

pub use config::{Limit, RunnerConfig, RunnerOption, with_limit, with_ticket};
pub use engine::Runner;
pub use model::{JobIndex, Outcome};

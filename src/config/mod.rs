//! Runner configuration.
//!
//! A runner is configured once, at construction, and never changes after.
//! Configuration can come from options in code, from environment variables,
//! or from a TOML file. In the env and file forms a value of `0` (or no value
//! at all) means unbounded; in code, `0` is a construction error.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::env::VarError;
use std::num::NonZeroUsize;
use std::path::Path;

/// Environment variable holding the worker cap.
pub const WORKER_LIMIT_VAR: &str = "RUNNER_WORKER_LIMIT";
/// Environment variable holding the job-start rate (starts per second).
pub const RATE_PER_SECOND_VAR: &str = "RUNNER_RATE_PER_SECOND";

/// An upper bound that may be absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "usize", into = "usize")]
pub enum Limit {
    #[default]
    Unbounded,
    Bounded(NonZeroUsize),
}

impl Limit {
    /// The bound, or `None` when unbounded.
    pub fn get(self) -> Option<usize> {
        match self {
            Limit::Unbounded => None,
            Limit::Bounded(n) => Some(n.get()),
        }
    }

    pub fn is_unbounded(self) -> bool {
        matches!(self, Limit::Unbounded)
    }

    /// Clamp `n` to this limit.
    pub fn cap(self, n: usize) -> usize {
        match self {
            Limit::Unbounded => n,
            Limit::Bounded(limit) => n.min(limit.get()),
        }
    }
}

impl From<usize> for Limit {
    fn from(n: usize) -> Self {
        NonZeroUsize::new(n).map_or(Limit::Unbounded, Limit::Bounded)
    }
}

impl From<Limit> for usize {
    fn from(limit: Limit) -> Self {
        limit.get().unwrap_or(0)
    }
}

impl std::fmt::Display for Limit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Limit::Unbounded => write!(f, "unbounded"),
            Limit::Bounded(n) => write!(f, "{n}"),
        }
    }
}

/// A single construction option for a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerOption {
    /// At most this many jobs execute at the same time.
    Limit(usize),
    /// At most this many jobs start per second.
    Ticket(usize),
}

/// Restrict the number of jobs executing in parallel.
pub fn with_limit(n: usize) -> RunnerOption {
    RunnerOption::Limit(n)
}

/// Restrict the number of jobs started per second.
pub fn with_ticket(n: usize) -> RunnerOption {
    RunnerOption::Ticket(n)
}

/// Immutable runner configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default)]
    pub worker_limit: Limit,
    #[serde(default)]
    pub rate_per_second: Limit,
}

/// Top-level TOML wrapper.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    runner: RunnerConfig,
}

impl RunnerConfig {
    /// Build a configuration from options. Later options override earlier ones.
    pub fn from_options(opts: impl IntoIterator<Item = RunnerOption>) -> Result<Self> {
        let mut config = Self::default();
        for opt in opts {
            config.apply(opt)?;
        }
        Ok(config)
    }

    /// Apply one option on top of this configuration.
    pub fn apply(&mut self, opt: RunnerOption) -> Result<()> {
        match opt {
            RunnerOption::Limit(n) => {
                self.worker_limit = Limit::Bounded(positive("worker limit", n)?)
            }
            RunnerOption::Ticket(n) => {
                self.rate_per_second = Limit::Bounded(positive("rate per second", n)?)
            }
        }
        Ok(())
    }

    /// Load configuration from environment variables.
    ///
    /// Unset variables keep the unbounded default. In local dev, call
    /// `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            worker_limit: optional_var(WORKER_LIMIT_VAR)?,
            rate_per_second: optional_var(RATE_PER_SECOND_VAR)?,
        })
    }

    /// Parse a TOML document with a `[runner]` table.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| Error::Config(format!("bad runner config: {e}")))?;
        Ok(file.runner)
    }

    /// Load a TOML config file from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read runner config {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Overlay the bounded fields of `other` onto this configuration.
    pub fn merge(self, other: RunnerConfig) -> Self {
        Self {
            worker_limit: if other.worker_limit.is_unbounded() {
                self.worker_limit
            } else {
                other.worker_limit
            },
            rate_per_second: if other.rate_per_second.is_unbounded() {
                self.rate_per_second
            } else {
                other.rate_per_second
            },
        }
    }
}

fn positive(what: &str, n: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(n).ok_or_else(|| Error::Config(format!("{what} must be positive, got {n}")))
}

fn optional_var(name: &str) -> Result<Limit> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<usize>()
            .map(Limit::from)
            .map_err(|e| Error::Config(format!("{name}={raw:?} is not a valid count: {e}"))),
        Err(VarError::NotPresent) => Ok(Limit::Unbounded),
        Err(VarError::NotUnicode(raw)) => Err(Error::Config(format!(
            "{name}={raw:?} is not valid unicode"
        ))),
    }
}

//! Rate gate: bounds how often jobs may start, across all workers.
//!
//! The gate hands out evenly spaced start slots. The first caller starts
//! immediately; every later caller gets the slot one interval after the last
//! reserved one. Idle time is not banked, so there is never a burst.

use crate::config::Limit;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};

/// Cloneable handle to one shared start schedule.
///
/// With rate `r`, `m` starts take at least `(m - 1) / r` seconds.
#[derive(Debug, Clone)]
pub struct RateGate {
    schedule: Option<Arc<Schedule>>,
}

#[derive(Debug)]
struct Schedule {
    interval: Duration,
    next: Mutex<Option<Instant>>,
}

impl RateGate {
    /// A gate that never blocks.
    pub fn unbounded() -> Self {
        Self { schedule: None }
    }

    /// A gate admitting at most `per_second` starts per second.
    pub fn per_second(per_second: usize) -> Self {
        if per_second == 0 {
            return Self::unbounded();
        }
        let interval = Duration::from_nanos(1_000_000_000 / per_second as u64);
        if interval.is_zero() {
            return Self::unbounded();
        }
        Self {
            schedule: Some(Arc::new(Schedule {
                interval,
                next: Mutex::new(None),
            })),
        }
    }

    pub fn from_limit(limit: Limit) -> Self {
        match limit.get() {
            Some(n) => Self::per_second(n),
            None => Self::unbounded(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.schedule.is_none()
    }

    /// Spacing between consecutive starts, if bounded.
    pub fn interval(&self) -> Option<Duration> {
        self.schedule.as_ref().map(|s| s.interval)
    }

    /// Wait for a start slot. Returns how long the caller waited.
    pub async fn acquire(&self) -> Duration {
        let Some(schedule) = &self.schedule else {
            return Duration::ZERO;
        };

        let now = Instant::now();
        let slot = {
            let mut next = schedule.next.lock().await;
            let slot = match *next {
                Some(reserved) if reserved > now => reserved,
                _ => now,
            };
            *next = Some(slot + schedule.interval);
            slot
        };

        if slot > now {
            sleep_until(slot).await;
        }
        slot.saturating_duration_since(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unbounded_gate_never_waits() {
        let gate = RateGate::unbounded();
        let start = Instant::now();
        for _ in 0..1000 {
            assert_eq!(gate.acquire().await, Duration::ZERO);
        }
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[test]
    fn zero_rate_is_unbounded() {
        assert!(RateGate::per_second(0).is_unbounded());
        assert!(RateGate::from_limit(Limit::Unbounded).is_unbounded());
    }

    #[test]
    fn interval_is_inverse_of_rate() {
        let gate = RateGate::per_second(4);
        assert_eq!(gate.interval(), Some(Duration::from_millis(250)));
    }

    #[tokio::test]
    async fn first_acquire_is_immediate() {
        let gate = RateGate::per_second(1);
        let start = Instant::now();
        gate.acquire().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn starts_are_spaced_by_interval() {
        let gate = RateGate::per_second(20);
        let start = Instant::now();
        for _ in 0..5 {
            gate.acquire().await;
        }
        // 5 starts at 50ms spacing: the last one is at 200ms.
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn clones_share_one_schedule() {
        let gate = RateGate::per_second(20);
        let start = Instant::now();
        let mut handles = Vec::new();
        for _ in 0..6 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.acquire().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        // 6 starts across clones: the last one is at 250ms.
        assert!(start.elapsed() >= Duration::from_millis(250));
    }
}

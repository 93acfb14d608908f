//! Result collection: places tagged outcomes into their registration slots.

use crate::model::{IndexedResult, Outcome};
use tokio::sync::mpsc;

/// Preallocated, index-addressed output for one run.
///
/// Each slot is written exactly once. Arrival order is irrelevant.
pub struct ResultCollector<T, E> {
    slots: Vec<Option<Outcome<T, E>>>,
    remaining: usize,
}

impl<T, E> ResultCollector<T, E> {
    pub fn new(expected: usize) -> Self {
        let mut slots = Vec::with_capacity(expected);
        slots.resize_with(expected, || None);
        Self {
            slots,
            remaining: expected,
        }
    }

    /// Number of slots still unwritten.
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    pub fn is_complete(&self) -> bool {
        self.remaining == 0
    }

    /// Store one outcome in the slot named by its index.
    ///
    /// # Panics
    ///
    /// If the index is out of range or the slot was already written. Either
    /// means two workers were handed the same job, which the pool never does.
    pub fn record(&mut self, result: IndexedResult<T, E>) {
        let IndexedResult { index, outcome } = result;
        let slot = &mut self.slots[index.get()];
        assert!(slot.is_none(), "result slot {index} written twice");
        *slot = Some(outcome);
        self.remaining -= 1;
    }

    /// Drain `results` until every slot is filled or the channel closes.
    pub async fn drain(&mut self, results: &mut mpsc::Receiver<IndexedResult<T, E>>) {
        while !self.is_complete() {
            match results.recv().await {
                Some(result) => self.record(result),
                None => break,
            }
        }
    }

    /// The ordered outcomes.
    ///
    /// # Panics
    ///
    /// If any slot is still unwritten.
    pub fn finish(self) -> Vec<Outcome<T, E>> {
        let remaining = self.remaining;
        self.slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| panic!("run finished with {remaining} unwritten slot(s)"))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::JobIndex;

    type Tagged = IndexedResult<&'static str, &'static str>;

    fn tagged(i: usize, outcome: Outcome<&'static str, &'static str>) -> Tagged {
        IndexedResult {
            index: JobIndex(i),
            outcome,
        }
    }

    #[test]
    fn out_of_order_arrivals_land_in_order() {
        let mut collector = ResultCollector::new(3);
        collector.record(tagged(2, Ok("c")));
        collector.record(tagged(0, Ok("a")));
        assert_eq!(collector.remaining(), 1);
        collector.record(tagged(1, Err("b")));
        assert!(collector.is_complete());
        assert_eq!(collector.finish(), vec![Ok("a"), Err("b"), Ok("c")]);
    }

    #[test]
    fn empty_collector_is_complete() {
        let collector: ResultCollector<(), ()> = ResultCollector::new(0);
        assert!(collector.is_complete());
        assert!(collector.finish().is_empty());
    }

    #[test]
    #[should_panic(expected = "written twice")]
    fn duplicate_index_panics() {
        let mut collector = ResultCollector::new(2);
        collector.record(tagged(0, Ok("a")));
        collector.record(tagged(0, Ok("again")));
    }

    #[test]
    #[should_panic(expected = "unwritten")]
    fn finish_with_gaps_panics() {
        let mut collector = ResultCollector::new(2);
        collector.record(tagged(1, Ok("b")));
        let _ = collector.finish();
    }

    #[tokio::test]
    async fn drain_stops_when_complete() {
        let (tx, mut rx) = mpsc::channel(4);
        tx.send(tagged(1, Ok("b"))).await.unwrap();
        tx.send(tagged(0, Ok("a"))).await.unwrap();
        let mut collector = ResultCollector::new(2);
        // Sender is still open; drain must return once both slots are filled.
        collector.drain(&mut rx).await;
        assert_eq!(collector.finish(), vec![Ok("a"), Ok("b")]);
        drop(tx);
    }
}

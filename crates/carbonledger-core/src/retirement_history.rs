//! Append-only retirement log, one ordered list per batch.

use std::collections::HashMap;

use carbonledger_types::{BatchId, RetirementRecord};

#[derive(Debug, Clone, Default)]
pub struct RetirementHistory {
    records: HashMap<BatchId, Vec<RetirementRecord>>,
}

impl RetirementHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `record` to the end of batch `id`'s list.
    pub fn append(&mut self, id: BatchId, record: RetirementRecord) {
        self.records.entry(id).or_default().push(record);
    }

    /// Records for batch `id` in insertion order. Empty if none yet.
    #[must_use]
    pub fn history_of(&self, id: BatchId) -> &[RetirementRecord] {
        self.records.get(&id).map_or(&[], Vec::as_slice)
    }

    /// Sum of recorded retirement amounts for batch `id`.
    #[must_use]
    pub fn total_retired(&self, id: BatchId) -> u128 {
        self.history_of(id)
            .iter()
            .map(|r| u128::from(r.amount))
            .sum()
    }

    /// Batches that have at least one record, in id order.
    #[must_use]
    pub fn batch_ids(&self) -> Vec<BatchId> {
        let mut ids: Vec<BatchId> = self
            .records
            .iter()
            .filter(|(_, list)| !list.is_empty())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

//! Ordered output aggregator
//!
//! Reassembly workers running in parallel produce records in whatever order
//! the scheduler lets them. The collector accepts appends from any thread
//! and restores the original trace order at the end by sorting on the
//! unique line index.

use crate::types::DecodedRecord;
use std::sync::Mutex;

/// Thread-safe, append-only collector for decoded records
///
/// Shared by reference across reassembly workers; every append takes the
/// lock for a single push. Once all workers have finished,
/// [`into_sorted`](Self::into_sorted) consumes the collector and yields the
/// records in ascending line-index order.
#[derive(Debug, Default)]
pub struct RecordCollector {
    records: Mutex<Vec<DecodedRecord>>,
}

impl RecordCollector {
    /// Create an empty collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one record; safe to call concurrently
    ///
    /// A panicking worker must not lose the records other workers already
    /// appended, so a poisoned lock is recovered rather than propagated.
    pub fn append(&self, record: DecodedRecord) {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push(record);
    }

    /// Number of records collected so far
    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the collector and return the records sorted by line index
    ///
    /// Indices are unique across all records of one decoding run, so the
    /// resulting order is total and deterministic.
    pub fn into_sorted(self) -> Vec<DecodedRecord> {
        let mut records = self
            .records
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.sort_unstable_by_key(|record| record.index());
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(index: usize) -> DecodedRecord {
        DecodedRecord::Message {
            index,
            can_id: 0x700,
            payload: vec![0xAA],
        }
    }

    #[test]
    fn test_append_and_sort() {
        let collector = RecordCollector::new();
        collector.append(create_test_record(2));
        collector.append(create_test_record(0));
        collector.append(create_test_record(1));

        let records = collector.into_sorted();
        let indices: Vec<usize> = records.iter().map(|r| r.index()).collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_len_and_is_empty() {
        let collector = RecordCollector::new();
        assert!(collector.is_empty());

        collector.append(create_test_record(0));
        assert_eq!(collector.len(), 1);
        assert!(!collector.is_empty());
    }

    #[test]
    fn test_sort_spans_record_kinds() {
        let collector = RecordCollector::new();
        collector.append(create_test_record(1));
        collector.append(DecodedRecord::FlowControl {
            index: 0,
            can_id: 0x7E8,
            status: crate::types::FlowStatus::ClearToSend,
            block_size: 0,
            st_min: 20,
        });

        let records = collector.into_sorted();
        assert!(matches!(records[0], DecodedRecord::FlowControl { .. }));
        assert!(matches!(records[1], DecodedRecord::Message { .. }));
    }

    #[test]
    fn test_concurrent_appends() {
        let collector = RecordCollector::new();
        std::thread::scope(|scope| {
            for chunk in 0..4usize {
                let collector = &collector;
                scope.spawn(move || {
                    for offset in 0..25 {
                        collector.append(create_test_record(chunk * 25 + offset));
                    }
                });
            }
        });

        let records = collector.into_sorted();
        assert_eq!(records.len(), 100);
        for (position, record) in records.iter().enumerate() {
            assert_eq!(record.index(), position);
        }
    }
}

//! Bounded, most-recent-first transaction log

use std::collections::VecDeque;

use super::event::TransactionEvent;

/// Default number of rows kept for the log table.
pub const DEFAULT_LOG_CAPACITY: usize = 15;

pub struct TransactionLog {
    entries: VecDeque<TransactionEvent>,
    capacity: usize,
}

impl Default for TransactionLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

impl TransactionLog {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Insert at the front, evicting the oldest entry past capacity.
    pub fn append(&mut self, event: TransactionEvent) {
        self.entries.push_front(event);
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first.
    pub fn list(&self) -> impl ExactSizeIterator<Item = &TransactionEvent> {
        self.entries.iter()
    }

    /// Owned copy for handing to another thread.
    pub fn snapshot(&self) -> Vec<TransactionEvent> {
        self.entries.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&TransactionEvent> {
        self.entries.front()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::TxKind;

    fn event(n: u64) -> TransactionEvent {
        TransactionEvent::synthetic(TxKind::Transfer, n as f64, n)
    }

    #[test]
    fn length_is_min_of_appends_and_capacity() {
        for n in [0usize, 1, 14, 15, 16, 100] {
            let mut log = TransactionLog::default();
            for i in 0..n {
                log.append(event(i as u64));
                assert!(log.len() <= log.capacity());
            }
            assert_eq!(log.len(), n.min(DEFAULT_LOG_CAPACITY));
        }
    }

    #[test]
    fn newest_entry_is_first() {
        let mut log = TransactionLog::new(3);
        for i in 0..5 {
            log.append(event(i));
            assert_eq!(log.latest().map(|e| e.observed_at), Some(i));
        }
        let order: Vec<u64> = log.list().map(|e| e.observed_at).collect();
        assert_eq!(order, vec![4, 3, 2]);
    }

    #[test]
    fn snapshot_is_detached() {
        let mut log = TransactionLog::new(2);
        log.append(event(1));
        let snap = log.snapshot();
        log.append(event(2));
        assert_eq!(snap.len(), 1);
        assert_eq!(log.len(), 2);
    }
}

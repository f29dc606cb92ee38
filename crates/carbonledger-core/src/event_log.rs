//! Append-only log of committed ledger events.

use carbonledger_types::{LedgerError, LedgerEvent, LedgerEventKind, Result};
use chrono::{DateTime, Utc};

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<LedgerEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn append(&mut self, kind: LedgerEventKind, committed_at: DateTime<Utc>) -> u64 {
        let sequence = self.events.len() as u64;
        self.events.push(LedgerEvent {
            sequence,
            kind,
            committed_at,
        });
        sequence
    }

    #[must_use]
    pub fn all(&self) -> &[LedgerEvent] {
        &self.events
    }

    /// Events with `sequence >= from`.
    #[must_use]
    pub fn since(&self, from: u64) -> &[LedgerEvent] {
        let start = usize::try_from(from).unwrap_or(usize::MAX).min(self.events.len());
        &self.events[start..]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Rebuild from stored events. Sequence numbers must be `0..n` in order.
    pub fn from_events(events: Vec<LedgerEvent>) -> Result<Self> {
        for (expected, event) in (0u64..).zip(&events) {
            if event.sequence != expected {
                return Err(LedgerError::Internal(format!(
                    "event log gap: expected sequence {expected}, found {}",
                    event.sequence
                )));
            }
        }
        Ok(Self { events })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use carbonledger_types::{BatchId, Principal};

    fn issued(id: u64) -> LedgerEventKind {
        LedgerEventKind::BatchIssued {
            batch_id: BatchId(id),
            recipient: Principal::new(),
            amount: 1,
            issuer: Principal::new(),
        }
    }

    #[test]
    fn sequences_follow_append_order() {
        let mut log = EventLog::new();
        assert_eq!(log.append(issued(1), Utc::now()), 0);
        assert_eq!(log.append(issued(2), Utc::now()), 1);
        assert_eq!(log.len(), 2);
        assert_eq!(log.since(1).len(), 1);
        assert_eq!(log.since(1)[0].kind.batch_id(), Some(BatchId(2)));
        assert!(log.since(99).is_empty());
    }

    #[test]
    fn rebuild_rejects_gaps() {
        let mut log = EventLog::new();
        log.append(issued(1), Utc::now());
        log.append(issued(2), Utc::now());
        let mut events = log.all().to_vec();
        events.remove(0);
        assert!(EventLog::from_events(events).is_err());
        assert!(EventLog::from_events(log.all().to_vec()).is_ok());
    }
}

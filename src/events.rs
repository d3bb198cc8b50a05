use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::types::{LoanId, OutputMode};

/// events emitted while building a report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    ScheduleGenerated {
        loan_id: LoanId,
        periods: u32,
        nominal_periods: u32,
        payment: Money,
    },
    EarlyPayoff {
        loan_id: LoanId,
        period: u32,
        payment_date: NaiveDate,
        closing_balance: Money,
    },
    LoanSkipped {
        loan_id: LoanId,
        index: usize,
        reason: String,
    },
    ReportBuilt {
        mode: OutputMode,
        loans: usize,
        rows: usize,
    },
}

/// event store for collecting events during a run
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// reasons recorded for every skipped loan
    pub fn skipped(&self) -> impl Iterator<Item = (&LoanId, &str)> {
        self.events.iter().filter_map(|e| match e {
            Event::LoanSkipped { loan_id, reason, .. } => Some((loan_id, reason.as_str())),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_events_drains() {
        let mut store = EventStore::new();
        store.emit(Event::ReportBuilt {
            mode: OutputMode::Summary,
            loans: 2,
            rows: 10,
        });
        assert_eq!(store.events().len(), 1);

        let taken = store.take_events();
        assert_eq!(taken.len(), 1);
        assert!(store.events().is_empty());
    }

    #[test]
    fn test_skipped_filter() {
        let mut store = EventStore::new();
        store.emit(Event::LoanSkipped {
            loan_id: LoanId::from("L-1"),
            index: 0,
            reason: "principal must be positive".to_string(),
        });
        store.emit(Event::ReportBuilt {
            mode: OutputMode::Combined,
            loans: 1,
            rows: 0,
        });

        let skipped: Vec<_> = store.skipped().collect();
        assert_eq!(skipped.len(), 1);
        assert_eq!(skipped[0].0, &LoanId::from("L-1"));
    }
}

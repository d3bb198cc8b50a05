use tracing::info;

use crate::config::ReportConfig;
use crate::consolidation::{consolidate, ConsolidatedReport};
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::loan::LoanRecord;
use crate::portfolio::PortfolioScheduler;

/// loans in, one consolidated report out; performs no I/O
pub fn build_report(
    loans: &[LoanRecord],
    config: &ReportConfig,
    events: &mut EventStore,
) -> Result<ConsolidatedReport> {
    let scheduler = PortfolioScheduler::new(config)?;
    let portfolio = scheduler.generate_all(loans, events)?;
    let report = consolidate(&portfolio, config.output_mode, config.daily_window_days);

    events.emit(Event::ReportBuilt {
        mode: report.mode(),
        loans: portfolio.loan_count(),
        rows: report.len(),
    });
    info!(mode = ?report.mode(), rows = report.len(), "report built");

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::{Money, Rate};
    use crate::types::{FailurePolicy, OutputMode};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn loans() -> Vec<LoanRecord> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        vec![
            LoanRecord::new(Money::from_major(10_000), Rate::from_decimal(dec!(0.05)), 12, start)
                .with_loan_id("A"),
            LoanRecord::new(Money::from_major(-1), Rate::from_decimal(dec!(0.05)), 12, start)
                .with_loan_id("broken"),
        ]
    }

    #[test]
    fn test_report_event_emitted() {
        let config = ReportConfig::new()
            .with_output_mode(OutputMode::Combined)
            .with_failure_policy(FailurePolicy::Skip);
        let mut events = EventStore::new();

        let report = build_report(&loans(), &config, &mut events).unwrap();

        assert_eq!(report.len(), 12);
        assert_eq!(events.skipped().count(), 1);
        assert!(matches!(
            events.events().last(),
            Some(Event::ReportBuilt { mode: OutputMode::Combined, loans: 1, rows: 12 })
        ));
    }

    #[test]
    fn test_abort_propagates() {
        let mut events = EventStore::new();
        assert!(build_report(&loans(), &ReportConfig::default(), &mut events).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ReportConfig::new().with_daily_window(0);
        assert!(build_report(&[], &config, &mut EventStore::new()).is_err());
    }
}

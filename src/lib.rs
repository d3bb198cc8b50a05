pub mod config;
pub mod consolidation;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod loan;
pub mod payments;
pub mod pipeline;
pub mod portfolio;
pub mod tape;
pub mod types;

// re-export key types
pub use config::ReportConfig;
pub use consolidation::{
    consolidate, ConsolidatedReport, PeriodValues, ReconciliationRow, SummaryRow,
};
pub use decimal::{Money, Rate};
pub use errors::{AmortizationError, Result};
pub use events::{Event, EventStore};
pub use loan::LoanRecord;
pub use payments::{level_payment, AmortizationSchedule, PeriodEntry, PeriodsTable, ScheduleGenerator};
pub use pipeline::build_report;
pub use portfolio::{PortfolioSchedule, PortfolioScheduler, SkippedLoan};
pub use types::{
    DateCadence, FailurePolicy, FrequencyConvention, LoanId, OutputMode, PaymentFrequency,
};

// re-export external dependencies that users will need
pub use chrono;
pub use rust_decimal::Decimal;

pub mod amortization;
pub mod annuity;
pub mod frequency;

pub use amortization::{AmortizationSchedule, PeriodEntry, ScheduleGenerator};
pub use annuity::level_payment;
pub use frequency::{payment_date, PeriodsTable};

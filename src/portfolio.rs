use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::ReportConfig;
use crate::decimal::Money;
use crate::errors::Result;
use crate::events::{Event, EventStore};
use crate::loan::LoanRecord;
use crate::payments::{AmortizationSchedule, PeriodEntry, ScheduleGenerator};
use crate::types::{FailurePolicy, LoanId, PaymentFrequency};

/// a loan left out of the run, with the reason
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedLoan {
    /// 0-based position on the loan tape, or in the batch for loans built in code
    pub index: usize,
    pub loan_id: LoanId,
    pub reason: String,
}

/// every loan's schedule in input order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PortfolioSchedule {
    pub schedules: Vec<AmortizationSchedule>,
    pub skipped: Vec<SkippedLoan>,
}

impl PortfolioSchedule {
    /// all entries, loan by loan
    pub fn entries(&self) -> impl Iterator<Item = &PeriodEntry> {
        self.schedules.iter().flat_map(|s| s.entries.iter())
    }

    /// the combined table
    pub fn combined(&self) -> Vec<PeriodEntry> {
        self.entries().cloned().collect()
    }

    pub fn loan_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn row_count(&self) -> usize {
        self.schedules.iter().map(|s| s.len()).sum()
    }

    pub fn total_interest(&self) -> Money {
        self.schedules.iter().map(|s| s.total_interest).sum()
    }

    pub fn schedule_for(&self, loan_id: &LoanId) -> Option<&AmortizationSchedule> {
        self.schedules.iter().find(|s| &s.loan_id == loan_id)
    }
}

/// runs the schedule generator over a batch of loans
#[derive(Debug, Clone)]
pub struct PortfolioScheduler {
    generator: ScheduleGenerator,
    default_frequency: PaymentFrequency,
    default_prepayment: Money,
    failure_policy: FailurePolicy,
    config: ReportConfig,
}

impl PortfolioScheduler {
    pub fn new(config: &ReportConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            generator: config.generator()?,
            default_frequency: config.default_frequency,
            default_prepayment: config.default_prepayment,
            failure_policy: config.failure_policy,
            config: config.clone(),
        })
    }

    pub fn generator(&self) -> &ScheduleGenerator {
        &self.generator
    }

    /// schedule one loan, tagged with its id or "N/A"
    pub fn schedule_loan(&self, loan: &LoanRecord) -> Result<AmortizationSchedule> {
        loan.validate()?;
        let loan_id = loan.loan_id();
        let schedule = self
            .generator
            .generate(
                loan.principal,
                loan.annual_rate,
                loan.term_months,
                loan.start_date,
                loan.frequency_or(self.default_frequency),
                loan.prepayment_or(self.default_prepayment),
            )
            .map_err(|err| err.for_loan(&loan_id))?;
        Ok(schedule.tagged(loan_id))
    }

    /// schedule every loan; record failures abort or skip per the failure policy
    pub fn generate_all(&self, loans: &[LoanRecord], events: &mut EventStore) -> Result<PortfolioSchedule> {
        let results = maybe_parallel_map(loans, &self.config, |loan| self.schedule_loan(loan));

        let mut portfolio = PortfolioSchedule::default();
        for (position, (loan, result)) in loans.iter().zip(results).enumerate() {
            match result {
                Ok(schedule) => {
                    record_schedule(&schedule, events);
                    portfolio.schedules.push(schedule);
                }
                Err(err) if err.is_record_error() && self.failure_policy == FailurePolicy::Skip => {
                    let index = loan.tape_index.unwrap_or(position);
                    let loan_id = loan.loan_id();
                    let reason = err.to_string();
                    warn!(index, %loan_id, %reason, "loan skipped");
                    events.emit(Event::LoanSkipped {
                        loan_id: loan_id.clone(),
                        index,
                        reason: reason.clone(),
                    });
                    portfolio.skipped.push(SkippedLoan { index, loan_id, reason });
                }
                Err(err) => return Err(err),
            }
        }

        info!(
            loans = portfolio.loan_count(),
            skipped = portfolio.skipped.len(),
            rows = portfolio.row_count(),
            "portfolio scheduled"
        );
        Ok(portfolio)
    }
}

fn record_schedule(schedule: &AmortizationSchedule, events: &mut EventStore) {
    events.emit(Event::ScheduleGenerated {
        loan_id: schedule.loan_id.clone(),
        periods: schedule.len() as u32,
        nominal_periods: schedule.nominal_periods,
        payment: schedule.payment,
    });
    if schedule.paid_off_early() {
        if let Some(last) = schedule.entries.last() {
            events.emit(Event::EarlyPayoff {
                loan_id: schedule.loan_id.clone(),
                period: last.period,
                payment_date: last.payment_date,
                closing_balance: last.closing_balance,
            });
        }
    }
}

/// maps loans in order, with rayon once the batch crosses the configured threshold
#[allow(unused_variables)]
fn maybe_parallel_map<T, U, F>(items: &[T], config: &ReportConfig, f: F) -> Vec<U>
where
    T: Sync,
    U: Send,
    F: Fn(&T) -> U + Sync + Send,
{
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        if config.should_parallelize(items.len()) {
            return items.par_iter().map(f).collect();
        }
    }

    items.iter().map(f).collect()
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::payments::annuity::level_payment;
use crate::payments::frequency::{payment_date, PeriodsTable};
use crate::types::{DateCadence, FrequencyConvention, LoanId, PaymentFrequency};

/// one row of a loan's schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodEntry {
    pub loan_id: LoanId,
    pub period: u32,
    pub payment_date: NaiveDate,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub prepayment: Money,
    pub closing_balance: Money,
}

impl PeriodEntry {
    /// scheduled principal plus prepayment
    pub fn total_reduction(&self) -> Money {
        self.principal_portion + self.prepayment
    }
}

/// amortization schedule for a single loan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub loan_id: LoanId,
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub frequency: PaymentFrequency,
    pub periods_per_year: u32,
    pub periodic_rate: Rate,
    pub nominal_periods: u32,
    pub payment: Money,
    pub prepayment: Money,
    pub entries: Vec<PeriodEntry>,
    pub total_interest: Money,
    pub total_payment: Money,
    pub total_prepayment: Money,
}

impl AmortizationSchedule {
    /// get entry for a 1-based period
    pub fn entry(&self, period: u32) -> Option<&PeriodEntry> {
        period
            .checked_sub(1)
            .and_then(|idx| self.entries.get(idx as usize))
    }

    /// closing balance of the last generated period
    pub fn final_balance(&self) -> Money {
        self.entries
            .last()
            .map(|e| e.closing_balance)
            .unwrap_or(self.principal)
    }

    /// true when the balance hit zero before the nominal term ran out
    pub fn paid_off_early(&self) -> bool {
        (self.entries.len() as u32) < self.nominal_periods
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// re-tag the schedule and every entry with `loan_id`
    pub fn tagged(mut self, loan_id: LoanId) -> Self {
        for entry in &mut self.entries {
            entry.loan_id = loan_id.clone();
        }
        self.loan_id = loan_id;
        self
    }
}

/// turns loan terms into a period-by-period schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleGenerator {
    table: PeriodsTable,
    cadence: DateCadence,
}

impl Default for ScheduleGenerator {
    fn default() -> Self {
        Self {
            table: PeriodsTable::default(),
            cadence: DateCadence::default(),
        }
    }
}

impl ScheduleGenerator {
    pub fn new(convention: FrequencyConvention, cadence: DateCadence) -> Result<Self> {
        Ok(Self {
            table: PeriodsTable::new(convention)?,
            cadence,
        })
    }

    pub fn with_table(table: PeriodsTable, cadence: DateCadence) -> Self {
        Self { table, cadence }
    }

    pub fn table(&self) -> &PeriodsTable {
        &self.table
    }

    pub fn cadence(&self) -> DateCadence {
        self.cadence
    }

    /// generate the schedule, stopping after the first period that closes at or below zero
    pub fn generate(
        &self,
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
        frequency: PaymentFrequency,
        prepayment: Money,
    ) -> Result<AmortizationSchedule> {
        let loan_id = LoanId::missing();
        if term_months == 0 {
            return Err(AmortizationError::invalid_loan(&loan_id, "term must be at least one month"));
        }
        if annual_rate.is_negative() {
            return Err(AmortizationError::invalid_loan(
                &loan_id,
                format!("interest rate must not be negative, got {}", annual_rate.as_decimal()),
            ));
        }
        if prepayment.is_negative() {
            return Err(AmortizationError::invalid_loan(
                &loan_id,
                format!("prepayment must not be negative, got {}", prepayment),
            ));
        }

        let periods_per_year = self.table.periods_per_year(frequency);
        let periodic_rate = annual_rate.per_period(periods_per_year);
        let nominal_periods = self.table.num_periods(term_months, frequency);
        let payment = level_payment(principal, periodic_rate, nominal_periods)?;

        let mut entries = Vec::new();
        let mut balance = principal;
        let mut total_interest = Money::ZERO;
        let mut total_payment = Money::ZERO;
        let mut total_prepayment = Money::ZERO;

        for period in 1..=nominal_periods {
            let opening_balance = balance;
            let interest_portion = opening_balance
                .checked_interest_at(periodic_rate)
                .ok_or_else(|| overflow("interest", period))?;
            let principal_portion = payment
                .checked_sub(interest_portion)
                .ok_or_else(|| overflow("principal portion", period))?;
            let closing_balance = principal_portion
                .checked_add(prepayment)
                .and_then(|reduction| opening_balance.checked_sub(reduction))
                .ok_or_else(|| overflow("closing balance", period))?;

            total_interest = total_interest
                .checked_add(interest_portion)
                .ok_or_else(|| overflow("total interest", period))?;
            total_payment = total_payment
                .checked_add(payment)
                .ok_or_else(|| overflow("total payment", period))?;
            total_prepayment = total_prepayment
                .checked_add(prepayment)
                .ok_or_else(|| overflow("total prepayment", period))?;

            entries.push(PeriodEntry {
                loan_id: loan_id.clone(),
                period,
                payment_date: payment_date(self.cadence, start_date, period, periods_per_year)?,
                opening_balance,
                payment,
                principal_portion,
                interest_portion,
                prepayment,
                closing_balance,
            });

            balance = closing_balance;
            if balance <= Money::ZERO {
                break;
            }
        }

        debug!(
            %frequency,
            periods = entries.len(),
            nominal_periods,
            %payment,
            final_balance = %balance,
            "schedule generated"
        );

        Ok(AmortizationSchedule {
            loan_id,
            principal,
            annual_rate,
            term_months,
            start_date,
            frequency,
            periods_per_year,
            periodic_rate,
            nominal_periods,
            payment,
            prepayment,
            entries,
            total_interest,
            total_payment,
            total_prepayment,
        })
    }
}

fn overflow(what: &str, period: u32) -> AmortizationError {
    AmortizationError::CalculationError {
        message: format!("{} overflowed in period {}", what, period),
    }
}

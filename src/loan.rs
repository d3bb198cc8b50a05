use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::types::{LoanId, PaymentFrequency};

/// one loan as read from a loan tape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub frequency: Option<PaymentFrequency>,
    #[serde(default)]
    pub prepayment: Option<Money>,
    #[serde(default)]
    pub loan_id: Option<LoanId>,
    /// 0-based data row on the loan tape this record came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tape_index: Option<usize>,
}

impl LoanRecord {
    pub fn new(principal: Money, annual_rate: Rate, term_months: u32, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            term_months,
            start_date,
            frequency: None,
            prepayment: None,
            loan_id: None,
            tape_index: None,
        }
    }

    pub fn with_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.frequency = Some(frequency);
        self
    }

    pub fn with_prepayment(mut self, prepayment: Money) -> Self {
        self.prepayment = Some(prepayment);
        self
    }

    pub fn with_loan_id(mut self, loan_id: impl Into<LoanId>) -> Self {
        self.loan_id = Some(loan_id.into());
        self
    }

    /// loan number, or the "N/A" sentinel
    pub fn loan_id(&self) -> LoanId {
        self.loan_id.clone().unwrap_or_default()
    }

    pub fn frequency_or(&self, default: PaymentFrequency) -> PaymentFrequency {
        self.frequency.unwrap_or(default)
    }

    pub fn prepayment_or(&self, default: Money) -> Money {
        self.prepayment.unwrap_or(default)
    }

    /// reject terms no schedule can be built from
    pub fn validate(&self) -> Result<()> {
        let id = self.loan_id();
        if !self.principal.is_positive() {
            return Err(AmortizationError::invalid_loan(
                &id,
                format!("principal must be positive, got {}", self.principal),
            ));
        }
        if self.term_months == 0 {
            return Err(AmortizationError::invalid_loan(&id, "term must be at least one month"));
        }
        if self.annual_rate.is_negative() {
            return Err(AmortizationError::invalid_loan(
                &id,
                format!("interest rate must not be negative, got {}", self.annual_rate.as_decimal()),
            ));
        }
        if let Some(prepayment) = self.prepayment {
            if prepayment.is_negative() {
                return Err(AmortizationError::invalid_loan(
                    &id,
                    format!("prepayment must not be negative, got {}", prepayment),
                ));
            }
        }
        Ok(())
    }
}

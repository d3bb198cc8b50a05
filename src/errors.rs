use thiserror::Error;

use crate::types::LoanId;

#[derive(Error, Debug)]
pub enum AmortizationError {
    #[error("invalid loan input for {loan_id}: {message}")]
    InvalidLoanInput {
        loan_id: LoanId,
        message: String,
    },

    #[error("missing required field `{field}` in row {row}")]
    MissingField {
        row: usize,
        field: &'static str,
    },

    #[error("unknown payment frequency: {value}")]
    InvalidFrequency {
        value: String,
    },

    #[error("invalid number in `{field}`: {value}")]
    InvalidNumber {
        field: &'static str,
        value: String,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("calculation error: {message}")]
    CalculationError {
        message: String,
    },

    #[error("loan {loan_id}: {source}")]
    LoanFailed {
        loan_id: LoanId,
        source: Box<AmortizationError>,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AmortizationError {
    pub(crate) fn invalid_loan(loan_id: &LoanId, message: impl Into<String>) -> Self {
        AmortizationError::InvalidLoanInput {
            loan_id: loan_id.clone(),
            message: message.into(),
        }
    }

    /// attach the loan id to a failure raised without one
    pub fn for_loan(self, loan_id: &LoanId) -> Self {
        match self {
            AmortizationError::InvalidLoanInput { loan_id: raised, message } if raised.is_missing() => {
                AmortizationError::InvalidLoanInput {
                    loan_id: loan_id.clone(),
                    message,
                }
            }
            err @ (AmortizationError::InvalidDate { .. } | AmortizationError::CalculationError { .. }) => {
                AmortizationError::LoanFailed {
                    loan_id: loan_id.clone(),
                    source: Box::new(err),
                }
            }
            other => other,
        }
    }

    /// true for failures scoped to a single loan record
    pub fn is_record_error(&self) -> bool {
        match self {
            AmortizationError::LoanFailed { source, .. } => source.is_record_error(),
            other => matches!(
                other,
                AmortizationError::InvalidLoanInput { .. }
                    | AmortizationError::MissingField { .. }
                    | AmortizationError::InvalidFrequency { .. }
                    | AmortizationError::InvalidNumber { .. }
                    | AmortizationError::InvalidDate { .. }
                    | AmortizationError::CalculationError { .. }
            ),
        }
    }
}

pub type Result<T> = std::result::Result<T, AmortizationError>;

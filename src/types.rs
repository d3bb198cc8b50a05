use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::AmortizationError;

/// identifier a loan is tagged with in every output row
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(String);

impl LoanId {
    /// sentinel used when a record carries no loan number
    pub const MISSING: &'static str = "N/A";

    pub fn new(id: impl Into<String>) -> Self {
        LoanId(id.into())
    }

    pub fn missing() -> Self {
        LoanId(Self::MISSING.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_missing(&self) -> bool {
        self.0 == Self::MISSING
    }
}

impl Default for LoanId {
    fn default() -> Self {
        LoanId::missing()
    }
}

impl fmt::Display for LoanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LoanId {
    fn from(s: &str) -> Self {
        LoanId::new(s)
    }
}

impl From<String> for LoanId {
    fn from(s: String) -> Self {
        LoanId(s)
    }
}

/// payment frequency as written on a loan tape
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub enum PaymentFrequency {
    #[default]
    Monthly,
    #[serde(rename = "Bi-Weekly")]
    BiWeekly,
    Weekly,
    #[serde(rename = "Semi-Monthly")]
    SemiMonthly,
    Quarterly,
    #[serde(rename = "Semi-Annually")]
    SemiAnnually,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 6] = [
        PaymentFrequency::Monthly,
        PaymentFrequency::BiWeekly,
        PaymentFrequency::Weekly,
        PaymentFrequency::SemiMonthly,
        PaymentFrequency::Quarterly,
        PaymentFrequency::SemiAnnually,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "Monthly",
            PaymentFrequency::BiWeekly => "Bi-Weekly",
            PaymentFrequency::Weekly => "Weekly",
            PaymentFrequency::SemiMonthly => "Semi-Monthly",
            PaymentFrequency::Quarterly => "Quarterly",
            PaymentFrequency::SemiAnnually => "Semi-Annually",
        }
    }
}

impl fmt::Display for PaymentFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PaymentFrequency {
    type Err = AmortizationError;

    /// case-insensitive, ignores spaces, dashes and underscores
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "monthly" => Ok(PaymentFrequency::Monthly),
            "biweekly" => Ok(PaymentFrequency::BiWeekly),
            "weekly" => Ok(PaymentFrequency::Weekly),
            "semimonthly" => Ok(PaymentFrequency::SemiMonthly),
            "quarterly" => Ok(PaymentFrequency::Quarterly),
            "semiannually" | "semiannual" => Ok(PaymentFrequency::SemiAnnually),
            _ => Err(AmortizationError::InvalidFrequency {
                value: s.to_string(),
            }),
        }
    }
}

/// which periods-per-year table a frequency resolves through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyConvention {
    /// weekly 48, bi-weekly 24: four and two payments per nominal month
    #[default]
    Nominal,
    /// weekly 52, bi-weekly 26: payments per calendar year
    Calendar,
}

/// how payment dates are spaced from the start date
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DateCadence {
    /// start + floor(365 * period / periods_per_year) days
    #[default]
    ProRataYear,
    /// start + 30 * period days regardless of frequency
    ThirtyDay,
    /// calendar months when the frequency divides a year into whole months
    CalendarMonth,
}

/// what the portfolio step does with a loan it cannot schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// fail the whole run on the first bad record
    #[default]
    Abort,
    /// drop the record and report why
    Skip,
}

/// shape of the consolidated output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OutputMode {
    /// every loan's schedule concatenated in input order
    Combined,
    /// totals per payment date across the portfolio
    #[default]
    Summary,
    /// monthly rows outer-joined against the daily expansion
    Reconciliation,
}

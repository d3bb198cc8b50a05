use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{AmortizationError, Result};
use crate::types::{DateCadence, FrequencyConvention, PaymentFrequency};

/// explicit frequency -> payments-per-year lookup, every frequency mapped exactly once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPeriodsTable")]
pub struct PeriodsTable {
    entries: [u32; 6],
}

/// deserialized shape, checked through `from_entries` before use
#[derive(Deserialize)]
struct RawPeriodsTable {
    entries: [u32; 6],
}

impl TryFrom<RawPeriodsTable> for PeriodsTable {
    type Error = AmortizationError;

    fn try_from(raw: RawPeriodsTable) -> Result<Self> {
        let entries: Vec<_> = PaymentFrequency::ALL
            .iter()
            .map(|&frequency| (frequency, raw.entries[slot_of(frequency)]))
            .collect();
        Self::from_entries(&entries)
    }
}

impl PeriodsTable {
    /// build the table for a named convention
    pub fn new(convention: FrequencyConvention) -> Result<Self> {
        let (weekly, bi_weekly) = match convention {
            FrequencyConvention::Nominal => (48, 24),
            FrequencyConvention::Calendar => (52, 26),
        };

        Self::from_entries(&[
            (PaymentFrequency::Monthly, 12),
            (PaymentFrequency::BiWeekly, bi_weekly),
            (PaymentFrequency::Weekly, weekly),
            (PaymentFrequency::SemiMonthly, 24),
            (PaymentFrequency::Quarterly, 4),
            (PaymentFrequency::SemiAnnually, 2),
        ])
    }

    /// build a custom table; rejects gaps, duplicates and zero counts
    pub fn from_entries(entries: &[(PaymentFrequency, u32)]) -> Result<Self> {
        let mut table: [Option<u32>; 6] = [None; 6];

        for &(frequency, periods) in entries {
            if periods == 0 {
                return Err(AmortizationError::InvalidConfiguration {
                    message: format!("{} must have at least one payment per year", frequency),
                });
            }
            let slot = &mut table[slot_of(frequency)];
            if slot.is_some() {
                return Err(AmortizationError::InvalidConfiguration {
                    message: format!("{} mapped more than once", frequency),
                });
            }
            *slot = Some(periods);
        }

        let mut resolved = [0u32; 6];
        for frequency in PaymentFrequency::ALL {
            let idx = slot_of(frequency);
            resolved[idx] = table[idx].ok_or_else(|| AmortizationError::InvalidConfiguration {
                message: format!("no periods-per-year entry for {}", frequency),
            })?;
        }

        Ok(Self { entries: resolved })
    }

    pub fn periods_per_year(&self, frequency: PaymentFrequency) -> u32 {
        self.entries[slot_of(frequency)]
    }

    /// payment periods spanning `term_months`, rounded up to a whole period
    pub fn num_periods(&self, term_months: u32, frequency: PaymentFrequency) -> u32 {
        let per_year = self.periods_per_year(frequency) as u64;
        let scaled = term_months as u64 * per_year;
        scaled.div_ceil(12).min(u32::MAX as u64) as u32
    }
}

impl Default for PeriodsTable {
    fn default() -> Self {
        Self {
            entries: [12, 24, 48, 24, 4, 2],
        }
    }
}

fn slot_of(frequency: PaymentFrequency) -> usize {
    match frequency {
        PaymentFrequency::Monthly => 0,
        PaymentFrequency::BiWeekly => 1,
        PaymentFrequency::Weekly => 2,
        PaymentFrequency::SemiMonthly => 3,
        PaymentFrequency::Quarterly => 4,
        PaymentFrequency::SemiAnnually => 5,
    }
}

/// date of the `period`-th payment after `start`
pub fn payment_date(
    cadence: DateCadence,
    start: NaiveDate,
    period: u32,
    periods_per_year: u32,
) -> Result<NaiveDate> {
    let shifted = match cadence {
        DateCadence::ProRataYear => start.checked_add_days(pro_rata_days(period, periods_per_year)),
        DateCadence::ThirtyDay => start.checked_add_days(Days::new(30 * period as u64)),
        DateCadence::CalendarMonth => {
            if 12 % periods_per_year == 0 {
                let months = (12 / periods_per_year) * period;
                start.checked_add_months(Months::new(months))
            } else {
                start.checked_add_days(pro_rata_days(period, periods_per_year))
            }
        }
    };

    shifted.ok_or_else(|| AmortizationError::InvalidDate {
        message: format!("payment {} from {} falls outside the supported calendar", period, start),
    })
}

fn pro_rata_days(period: u32, periods_per_year: u32) -> Days {
    Days::new(365 * period as u64 / periods_per_year as u64)
}

/// `count` consecutive days starting at `date`
pub fn day_window(date: NaiveDate, count: u32) -> impl Iterator<Item = NaiveDate> {
    (0..count as u64).filter_map(move |offset| date.checked_add_days(Days::new(offset)))
}

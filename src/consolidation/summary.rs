use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::decimal::Money;
use crate::payments::PeriodEntry;

/// portfolio totals for one payment date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub payment_date: NaiveDate,
    pub entries: usize,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub prepayment: Money,
    pub closing_balance: Money,
}

impl SummaryRow {
    fn empty(payment_date: NaiveDate) -> Self {
        Self {
            payment_date,
            entries: 0,
            opening_balance: Money::ZERO,
            payment: Money::ZERO,
            principal_portion: Money::ZERO,
            interest_portion: Money::ZERO,
            prepayment: Money::ZERO,
            closing_balance: Money::ZERO,
        }
    }

    fn absorb(&mut self, entry: &PeriodEntry) {
        self.entries += 1;
        self.opening_balance += entry.opening_balance;
        self.payment += entry.payment;
        self.principal_portion += entry.principal_portion;
        self.interest_portion += entry.interest_portion;
        self.prepayment += entry.prepayment;
        self.closing_balance += entry.closing_balance;
    }
}

/// sum every numeric field by payment date, ascending; loan ids are dropped
pub fn summarize_by_date<'a, I>(entries: I) -> Vec<SummaryRow>
where
    I: IntoIterator<Item = &'a PeriodEntry>,
{
    let mut by_date: BTreeMap<NaiveDate, SummaryRow> = BTreeMap::new();
    for entry in entries {
        by_date
            .entry(entry.payment_date)
            .or_insert_with(|| SummaryRow::empty(entry.payment_date))
            .absorb(entry);
    }
    by_date.into_values().collect()
}

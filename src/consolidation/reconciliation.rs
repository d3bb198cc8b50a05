use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::decimal::Money;
use crate::payments::frequency::day_window;
use crate::payments::PeriodEntry;
use crate::types::LoanId;

/// numeric fields of an entry, one join side
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodValues {
    pub period: u32,
    pub opening_balance: Money,
    pub payment: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub prepayment: Money,
    pub closing_balance: Money,
}

impl From<&PeriodEntry> for PeriodValues {
    fn from(entry: &PeriodEntry) -> Self {
        Self {
            period: entry.period,
            opening_balance: entry.opening_balance,
            payment: entry.payment,
            principal_portion: entry.principal_portion,
            interest_portion: entry.interest_portion,
            prepayment: entry.prepayment,
            closing_balance: entry.closing_balance,
        }
    }
}

/// one (loan, date) key of the monthly vs daily outer join
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationRow {
    pub loan_id: LoanId,
    pub payment_date: NaiveDate,
    pub monthly: Option<PeriodValues>,
    pub daily: Option<PeriodValues>,
}

/// replicate each entry over `window_days` consecutive dates, first (loan, date) wins
pub fn expand_daily<'a, I>(entries: I, window_days: u32) -> Vec<PeriodEntry>
where
    I: IntoIterator<Item = &'a PeriodEntry>,
{
    let mut seen: HashSet<(LoanId, NaiveDate)> = HashSet::new();
    let mut expanded = Vec::new();

    for entry in entries {
        for date in day_window(entry.payment_date, window_days) {
            if seen.insert((entry.loan_id.clone(), date)) {
                let mut copy = entry.clone();
                copy.payment_date = date;
                expanded.push(copy);
            }
        }
    }
    expanded
}

type JoinSides = (Vec<PeriodValues>, Vec<PeriodValues>);

/// full outer join on (loan id, payment date), sorted by that key
pub fn outer_join(monthly: &[PeriodEntry], daily: &[PeriodEntry]) -> Vec<ReconciliationRow> {
    let mut keyed: BTreeMap<(LoanId, NaiveDate), JoinSides> = BTreeMap::new();

    for entry in monthly {
        keyed
            .entry((entry.loan_id.clone(), entry.payment_date))
            .or_default()
            .0
            .push(entry.into());
    }
    for entry in daily {
        keyed
            .entry((entry.loan_id.clone(), entry.payment_date))
            .or_default()
            .1
            .push(entry.into());
    }

    let mut rows = Vec::new();
    for ((loan_id, payment_date), (left, right)) in keyed {
        let left: Vec<Option<PeriodValues>> = pad(left);
        let right: Vec<Option<PeriodValues>> = pad(right);
        for m in &left {
            for d in &right {
                rows.push(ReconciliationRow {
                    loan_id: loan_id.clone(),
                    payment_date,
                    monthly: m.clone(),
                    daily: d.clone(),
                });
            }
        }
    }
    rows
}

/// an unmatched side still yields one row, null on that side
fn pad(values: Vec<PeriodValues>) -> Vec<Option<PeriodValues>> {
    if values.is_empty() {
        vec![None]
    } else {
        values.into_iter().map(Some).collect()
    }
}

/// expand then join: the reconciliation table for a set of schedules
pub fn reconcile(entries: &[PeriodEntry], window_days: u32) -> Vec<ReconciliationRow> {
    let daily = expand_daily(entries, window_days);
    outer_join(entries, &daily)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(loan: &str, period: u32, payment_date: NaiveDate) -> PeriodEntry {
        PeriodEntry {
            loan_id: LoanId::from(loan),
            period,
            payment_date,
            opening_balance: Money::from_major(1_000),
            payment: Money::from_major(100),
            principal_portion: Money::from_major(95),
            interest_portion: Money::from_major(5),
            prepayment: Money::ZERO,
            closing_balance: Money::from_major(905),
        }
    }

    #[test]
    fn test_expansion_covers_window() {
        let expanded = expand_daily(&[entry("A", 1, date(2024, 1, 31))], 30);
        assert_eq!(expanded.len(), 30);
        assert_eq!(expanded[0].payment_date, date(2024, 1, 31));
        assert_eq!(expanded[29].payment_date, date(2024, 2, 29));
        assert!(expanded.iter().all(|e| e.period == 1));
    }

    #[test]
    fn test_expansion_drops_overlapping_dates() {
        // windows of 10 days from dates 5 days apart overlap by 5
        let entries = vec![entry("A", 1, date(2024, 1, 1)), entry("A", 2, date(2024, 1, 6))];
        let expanded = expand_daily(&entries, 10);

        assert_eq!(expanded.len(), 15);
        let jan_8: Vec<_> = expanded.iter().filter(|e| e.payment_date == date(2024, 1, 8)).collect();
        assert_eq!(jan_8.len(), 1);
        assert_eq!(jan_8[0].period, 1);
    }

    #[test]
    fn test_expansion_keeps_loans_apart() {
        let entries = vec![entry("A", 1, date(2024, 1, 1)), entry("B", 1, date(2024, 1, 1))];
        assert_eq!(expand_daily(&entries, 5).len(), 10);
    }

    #[test]
    fn test_outer_join_keeps_unmatched_sides() {
        let monthly = vec![entry("A", 1, date(2024, 1, 1)), entry("B", 1, date(2024, 1, 1))];
        let daily = vec![entry("A", 1, date(2024, 1, 1)), entry("A", 1, date(2024, 1, 2))];

        let rows = outer_join(&monthly, &daily);

        assert_eq!(rows.len(), 3);
        assert_eq!((rows[0].loan_id.as_str(), rows[0].payment_date), ("A", date(2024, 1, 1)));
        assert!(rows[0].monthly.is_some() && rows[0].daily.is_some());
        assert_eq!((rows[1].loan_id.as_str(), rows[1].payment_date), ("A", date(2024, 1, 2)));
        assert!(rows[1].monthly.is_none() && rows[1].daily.is_some());
        assert_eq!(rows[2].loan_id.as_str(), "B");
        assert!(rows[2].monthly.is_some() && rows[2].daily.is_none());
    }

    #[test]
    fn test_reconcile_sorted_by_loan_then_date() {
        let entries = vec![
            entry("B", 1, date(2024, 1, 31)),
            entry("A", 1, date(2024, 1, 31)),
            entry("A", 2, date(2024, 3, 1)),
        ];

        let rows = reconcile(&entries, 30);

        let keys: Vec<_> = rows.iter().map(|r| (r.loan_id.clone(), r.payment_date)).collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);

        // every monthly row lines up with its own day-zero copy
        let matched = rows.iter().filter(|r| r.monthly.is_some()).count();
        assert_eq!(matched, 3);
        assert!(rows.iter().all(|r| r.daily.is_some()));
        assert_eq!(rows.len(), 90);
    }
}

pub mod reconciliation;
pub mod summary;

use serde::{Deserialize, Serialize};

use crate::payments::PeriodEntry;
use crate::portfolio::PortfolioSchedule;
use crate::types::OutputMode;

pub use reconciliation::{expand_daily, outer_join, reconcile, PeriodValues, ReconciliationRow};
pub use summary::{summarize_by_date, SummaryRow};

/// the single table a run produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "rows", rename_all = "snake_case")]
pub enum ConsolidatedReport {
    Combined(Vec<PeriodEntry>),
    Summary(Vec<SummaryRow>),
    Reconciliation(Vec<ReconciliationRow>),
}

impl ConsolidatedReport {
    pub fn mode(&self) -> OutputMode {
        match self {
            ConsolidatedReport::Combined(_) => OutputMode::Combined,
            ConsolidatedReport::Summary(_) => OutputMode::Summary,
            ConsolidatedReport::Reconciliation(_) => OutputMode::Reconciliation,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ConsolidatedReport::Combined(rows) => rows.len(),
            ConsolidatedReport::Summary(rows) => rows.len(),
            ConsolidatedReport::Reconciliation(rows) => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// merge the portfolio's schedules into the requested view
pub fn consolidate(portfolio: &PortfolioSchedule, mode: OutputMode, daily_window_days: u32) -> ConsolidatedReport {
    match mode {
        OutputMode::Combined => ConsolidatedReport::Combined(portfolio.combined()),
        OutputMode::Summary => ConsolidatedReport::Summary(summarize_by_date(portfolio.entries())),
        OutputMode::Reconciliation => {
            ConsolidatedReport::Reconciliation(reconcile(&portfolio.combined(), daily_window_days))
        }
    }
}

use std::io;
use std::path::Path;

use crate::consolidation::{ConsolidatedReport, PeriodValues};
use crate::errors::Result;

const VALUE_COLUMNS: [&str; 7] = [
    "period",
    "opening_balance",
    "payment",
    "principal_portion",
    "interest_portion",
    "prepayment",
    "closing_balance",
];

/// write the report as one csv table
pub fn write_report<W: io::Write>(report: &ConsolidatedReport, sink: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(sink);

    match report {
        ConsolidatedReport::Combined(rows) => {
            let mut header = vec!["loan_number", "payment_date"];
            header.extend(VALUE_COLUMNS);
            wtr.write_record(&header)?;

            for row in rows {
                let mut record = vec![row.loan_id.to_string(), row.payment_date.to_string()];
                record.extend(values(&PeriodValues::from(row)));
                wtr.write_record(&record)?;
            }
        }
        ConsolidatedReport::Summary(rows) => {
            wtr.write_record([
                "payment_date",
                "entries",
                "opening_balance",
                "payment",
                "principal_portion",
                "interest_portion",
                "prepayment",
                "closing_balance",
            ])?;

            for row in rows {
                wtr.write_record([
                    row.payment_date.to_string(),
                    row.entries.to_string(),
                    row.opening_balance.to_string(),
                    row.payment.to_string(),
                    row.principal_portion.to_string(),
                    row.interest_portion.to_string(),
                    row.prepayment.to_string(),
                    row.closing_balance.to_string(),
                ])?;
            }
        }
        ConsolidatedReport::Reconciliation(rows) => {
            let mut header = vec!["loan_number".to_string(), "payment_date".to_string()];
            header.extend(VALUE_COLUMNS.iter().map(|c| format!("{}_monthly", c)));
            header.extend(VALUE_COLUMNS.iter().map(|c| format!("{}_daily", c)));
            wtr.write_record(&header)?;

            for row in rows {
                let mut record = vec![row.loan_id.to_string(), row.payment_date.to_string()];
                record.extend(optional_values(row.monthly.as_ref()));
                record.extend(optional_values(row.daily.as_ref()));
                wtr.write_record(&record)?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

/// write the report to a csv file
pub fn write_report_path(report: &ConsolidatedReport, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_report(report, io::BufWriter::new(file))
}

fn values(v: &PeriodValues) -> [String; 7] {
    [
        v.period.to_string(),
        v.opening_balance.to_string(),
        v.payment.to_string(),
        v.principal_portion.to_string(),
        v.interest_portion.to_string(),
        v.prepayment.to_string(),
        v.closing_balance.to_string(),
    ]
}

/// empty cells for the side of the join that had no row
fn optional_values(v: Option<&PeriodValues>) -> [String; 7] {
    v.map(values).unwrap_or_default()
}

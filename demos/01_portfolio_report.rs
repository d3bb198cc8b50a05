/// portfolio report - loan tape in, summary and reconciliation tables out
use amortization_rs::tape::{read_loan_tape, write_report};
use amortization_rs::{build_report, EventStore, FailurePolicy, ReportConfig};

const TAPE: &str = include_str!("data/loan_tape.csv");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let tape = read_loan_tape(TAPE.as_bytes(), FailurePolicy::Skip)?;
    for rejected in &tape.rejected {
        println!("rejected row {}: {}", rejected.index + 1, rejected.reason);
    }

    let config = ReportConfig::cash_flow_summary().with_failure_policy(FailurePolicy::Skip);
    let mut events = EventStore::new();
    let summary = build_report(&tape.records, &config, &mut events)?;
    println!("summary rows: {}", summary.len());
    write_report(&summary, std::io::stdout().lock())?;

    let config = ReportConfig::reconciliation().with_failure_policy(FailurePolicy::Skip);
    let recon = build_report(&tape.records, &config, &mut events)?;
    println!("reconciliation rows: {}", recon.len());

    for (loan_id, reason) in events.skipped() {
        println!("skipped {}: {}", loan_id, reason);
    }

    Ok(())
}

use std::io;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use amortization_rs::tape::{read_loan_tape_path, write_report, write_report_path};
use amortization_rs::{
    build_report, ConsolidatedReport, DateCadence, Event, EventStore, FailurePolicy,
    FrequencyConvention, OutputMode, ReportConfig,
};

/// Amortization schedules and consolidated cash-flow reports from a loan tape
#[derive(Parser)]
#[command(name = "amortize", version)]
struct Cli {
    /// Loan tape (csv)
    #[arg(long, short)]
    input: PathBuf,

    /// Destination file; stdout when omitted
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// JSON report configuration; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    mode: Option<Mode>,

    #[arg(long)]
    on_error: Option<OnError>,

    #[arg(long)]
    convention: Option<Convention>,

    #[arg(long)]
    cadence: Option<Cadence>,

    /// Days each period is replicated over in reconciliation mode
    #[arg(long)]
    daily_window: Option<u32>,

    #[arg(long, default_value = "csv")]
    format: Format,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Combined,
    Summary,
    Reconciliation,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OnError {
    Abort,
    Skip,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Convention {
    Nominal,
    Calendar,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Cadence {
    ProRata,
    ThirtyDay,
    CalendarMonth,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(error = %e, "run failed");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = resolve_config(&cli)?;

    let tape = read_loan_tape_path(&cli.input, config.failure_policy)?;
    let mut events = EventStore::new();
    for rejected in &tape.rejected {
        events.emit(Event::LoanSkipped {
            loan_id: rejected.loan_id.clone(),
            index: rejected.index,
            reason: rejected.reason.clone(),
        });
    }

    let report = build_report(&tape.records, &config, &mut events)?;
    emit(&report, &cli)?;

    let skipped = events.skipped().count();
    info!(rows = report.len(), skipped, "amortization report generated");
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<ReportConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ReportConfig::from_json_file(path)?,
        None => ReportConfig::default(),
    };

    if let Some(mode) = cli.mode {
        config.output_mode = match mode {
            Mode::Combined => OutputMode::Combined,
            Mode::Summary => OutputMode::Summary,
            Mode::Reconciliation => OutputMode::Reconciliation,
        };
    }
    if let Some(on_error) = cli.on_error {
        config.failure_policy = match on_error {
            OnError::Abort => FailurePolicy::Abort,
            OnError::Skip => FailurePolicy::Skip,
        };
    }
    if let Some(convention) = cli.convention {
        config.frequency_convention = match convention {
            Convention::Nominal => FrequencyConvention::Nominal,
            Convention::Calendar => FrequencyConvention::Calendar,
        };
    }
    if let Some(cadence) = cli.cadence {
        config.date_cadence = match cadence {
            Cadence::ProRata => DateCadence::ProRataYear,
            Cadence::ThirtyDay => DateCadence::ThirtyDay,
            Cadence::CalendarMonth => DateCadence::CalendarMonth,
        };
    }
    if let Some(days) = cli.daily_window {
        config.daily_window_days = days;
    }

    config.validate()?;
    Ok(config)
}

fn emit(report: &ConsolidatedReport, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    match (cli.format, &cli.output) {
        (Format::Csv, Some(path)) => write_report_path(report, path)?,
        (Format::Csv, None) => write_report(report, io::stdout().lock())?,
        (Format::Json, Some(path)) => std::fs::write(path, report.to_json_pretty()?)?,
        (Format::Json, None) => println!("{}", report.to_json_pretty()?),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(["amortize", "--input", "tape.csv"].iter().chain(args)).unwrap()
    }

    #[test]
    fn test_defaults_without_config() {
        let config = resolve_config(&parse(&[])).unwrap();
        assert_eq!(config, ReportConfig::default());
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        std::fs::write(
            &path,
            r#"{"output_mode":"summary","failure_policy":"skip","date_cadence":"thirty_day","daily_window_days":10}"#,
        )
        .unwrap();
        let path = path.to_string_lossy().into_owned();

        let config = resolve_config(&parse(&[
            "--config",
            &path,
            "--mode",
            "reconciliation",
            "--convention",
            "calendar",
            "--daily-window",
            "5",
        ]))
        .unwrap();

        assert_eq!(config.output_mode, OutputMode::Reconciliation);
        assert_eq!(config.frequency_convention, FrequencyConvention::Calendar);
        assert_eq!(config.daily_window_days, 5);
        // untouched by flags, kept from the file
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.date_cadence, DateCadence::ThirtyDay);
    }

    #[test]
    fn test_cadence_and_error_flags() {
        let config = resolve_config(&parse(&["--cadence", "calendar-month", "--on-error", "skip"])).unwrap();
        assert_eq!(config.date_cadence, DateCadence::CalendarMonth);
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
    }

    #[test]
    fn test_rejects_zero_daily_window() {
        let err = resolve_config(&parse(&["--daily-window", "0"])).unwrap_err();
        assert!(err.to_string().contains("daily window"));
    }
}

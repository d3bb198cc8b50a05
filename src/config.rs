use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::decimal::Money;
use crate::errors::{AmortizationError, Result};
use crate::payments::ScheduleGenerator;
use crate::types::{DateCadence, FailurePolicy, FrequencyConvention, OutputMode, PaymentFrequency};

/// default day window for the daily expansion in reconciliation mode
pub const DEFAULT_DAILY_WINDOW: u32 = 30;

/// default batch size at which the portfolio step goes parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 64;

/// report configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub output_mode: OutputMode,
    pub default_frequency: PaymentFrequency,
    pub default_prepayment: Money,
    pub frequency_convention: FrequencyConvention,
    pub date_cadence: DateCadence,
    pub failure_policy: FailurePolicy,
    pub daily_window_days: u32,
    pub parallel: bool,
    pub parallel_threshold: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_mode: OutputMode::Summary,
            default_frequency: PaymentFrequency::Monthly,
            default_prepayment: Money::ZERO,
            frequency_convention: FrequencyConvention::Nominal,
            date_cadence: DateCadence::ProRataYear,
            failure_policy: FailurePolicy::Abort,
            daily_window_days: DEFAULT_DAILY_WINDOW,
            parallel: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl ReportConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// the monthly schedule vs daily expansion workflow: thirty-day dates, reconciliation output
    pub fn reconciliation() -> Self {
        Self::default()
            .with_output_mode(OutputMode::Reconciliation)
            .with_date_cadence(DateCadence::ThirtyDay)
    }

    /// the cash-flow workflow: pro-rata dates, summary by payment date
    pub fn cash_flow_summary() -> Self {
        Self::default()
            .with_output_mode(OutputMode::Summary)
            .with_date_cadence(DateCadence::ProRataYear)
    }

    pub fn with_output_mode(mut self, mode: OutputMode) -> Self {
        self.output_mode = mode;
        self
    }

    pub fn with_default_frequency(mut self, frequency: PaymentFrequency) -> Self {
        self.default_frequency = frequency;
        self
    }

    pub fn with_default_prepayment(mut self, prepayment: Money) -> Self {
        self.default_prepayment = prepayment;
        self
    }

    pub fn with_frequency_convention(mut self, convention: FrequencyConvention) -> Self {
        self.frequency_convention = convention;
        self
    }

    pub fn with_date_cadence(mut self, cadence: DateCadence) -> Self {
        self.date_cadence = cadence;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_daily_window(mut self, days: u32) -> Self {
        self.daily_window_days = days;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.daily_window_days == 0 {
            return Err(AmortizationError::InvalidConfiguration {
                message: "daily window must cover at least one day".to_string(),
            });
        }
        if self.default_prepayment.is_negative() {
            return Err(AmortizationError::InvalidConfiguration {
                message: format!("default prepayment must not be negative, got {}", self.default_prepayment),
            });
        }
        Ok(())
    }

    /// schedule generator for this configuration's convention and cadence
    pub fn generator(&self) -> Result<ScheduleGenerator> {
        ScheduleGenerator::new(self.frequency_convention, self.date_cadence)
    }

    /// whether a batch of `count` loans should be mapped in parallel
    pub fn should_parallelize(&self, count: usize) -> bool {
        cfg!(feature = "parallel") && self.parallel && count >= self.parallel_threshold
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ReportConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReportConfig::default();
        assert_eq!(config.output_mode, OutputMode::Summary);
        assert_eq!(config.default_frequency, PaymentFrequency::Monthly);
        assert_eq!(config.default_prepayment, Money::ZERO);
        assert_eq!(config.failure_policy, FailurePolicy::Abort);
        assert_eq!(config.daily_window_days, 30);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = ReportConfig::new()
            .with_output_mode(OutputMode::Combined)
            .with_default_frequency(PaymentFrequency::Quarterly)
            .with_default_prepayment(Money::from_major(25))
            .with_failure_policy(FailurePolicy::Skip)
            .with_daily_window(7)
            .with_parallel(true)
            .with_threshold(10);

        assert_eq!(config.output_mode, OutputMode::Combined);
        assert_eq!(config.default_frequency, PaymentFrequency::Quarterly);
        assert_eq!(config.default_prepayment, Money::from_major(25));
        assert_eq!(config.failure_policy, FailurePolicy::Skip);
        assert_eq!(config.daily_window_days, 7);
        assert!(config.parallel);
        assert_eq!(config.parallel_threshold, 10);
    }

    #[test]
    fn test_presets() {
        let recon = ReportConfig::reconciliation();
        assert_eq!(recon.output_mode, OutputMode::Reconciliation);
        assert_eq!(recon.date_cadence, DateCadence::ThirtyDay);

        let summary = ReportConfig::cash_flow_summary();
        assert_eq!(summary.output_mode, OutputMode::Summary);
        assert_eq!(summary.date_cadence, DateCadence::ProRataYear);
    }

    #[test]
    fn test_validation() {
        assert!(ReportConfig::new().with_daily_window(0).validate().is_err());
        assert!(ReportConfig::new()
            .with_default_prepayment(Money::from_major(-1))
            .validate()
            .is_err());
    }

    #[test]
    fn test_should_parallelize() {
        let config = ReportConfig::new().with_parallel(true).with_threshold(100);

        #[cfg(feature = "parallel")]
        {
            assert!(!config.should_parallelize(50));
            assert!(config.should_parallelize(100));
        }

        #[cfg(not(feature = "parallel"))]
        {
            assert!(!config.should_parallelize(50));
            assert!(!config.should_parallelize(100));
        }

        assert!(!ReportConfig::new().should_parallelize(1_000));
    }

    #[test]
    fn test_json_partial_overrides() {
        let config = ReportConfig::from_json_str(
            r#"{ "output_mode": "reconciliation", "frequency_convention": "calendar", "daily_window_days": 14 }"#,
        )
        .unwrap();

        assert_eq!(config.output_mode, OutputMode::Reconciliation);
        assert_eq!(config.frequency_convention, FrequencyConvention::Calendar);
        assert_eq!(config.daily_window_days, 14);
        assert_eq!(config.default_frequency, PaymentFrequency::Monthly);
    }

    #[test]
    fn test_json_rejects_invalid() {
        assert!(ReportConfig::from_json_str(r#"{ "daily_window_days": 0 }"#).is_err());
        assert!(ReportConfig::from_json_str(r#"{ "output_mode": "pivot" }"#).is_err());
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ReportConfig::reconciliation().with_failure_policy(FailurePolicy::Skip);
        let json = serde_json::to_string(&config).unwrap();
        let back: ReportConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}

use rust_decimal::Decimal;

use crate::decimal::{Money, Rate};
use crate::errors::{AmortizationError, Result};
use crate::types::LoanId;

/// fixed payment that retires `principal` over `num_periods` at `periodic_rate`
///
/// A zero rate takes the straight-line branch `principal / num_periods`.
pub fn level_payment(principal: Money, periodic_rate: Rate, num_periods: u32) -> Result<Money> {
    let unknown = LoanId::missing();
    if num_periods == 0 {
        return Err(AmortizationError::invalid_loan(&unknown, "number of periods must be positive"));
    }
    if !principal.is_positive() {
        return Err(AmortizationError::invalid_loan(
            &unknown,
            format!("principal must be positive, got {}", principal),
        ));
    }
    if periodic_rate.is_negative() {
        return Err(AmortizationError::invalid_loan(
            &unknown,
            format!("periodic rate must not be negative, got {}", periodic_rate.as_decimal()),
        ));
    }

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(num_periods));
    }

    // PMT = P * r * (1 + r)^n / ((1 + r)^n - 1)
    let r = periodic_rate.as_decimal();
    let compound = growth_factor(r, num_periods)?;

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| overflow(num_periods))?;
    let denominator = compound - Decimal::ONE;

    Ok(Money::from_decimal(numerator / denominator))
}

/// (1 + r)^n by repeated multiplication
fn growth_factor(r: Decimal, n: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound.checked_mul(base).ok_or_else(|| overflow(n))?;
    }
    Ok(compound)
}

fn overflow(n: u32) -> AmortizationError {
    AmortizationError::CalculationError {
        message: format!("compound factor overflows over {} periods", n),
    }
}

/// quick start - one loan, one schedule
use amortization_rs::chrono::NaiveDate;
use amortization_rs::{Money, PaymentFrequency, Rate, ScheduleGenerator};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 30-year $120,000 mortgage at 6%
    let schedule = ScheduleGenerator::default().generate(
        Money::from_major(120_000),
        Rate::from_percentage(6),
        360,
        NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad date")?,
        PaymentFrequency::Monthly,
        Money::ZERO,
    )?;

    println!("level payment: {}", schedule.payment.round_dp(2));
    for entry in schedule.entries.iter().take(3) {
        println!(
            "{} {:>10} interest {:>8} principal {:>8} balance {:>12}",
            entry.payment_date,
            entry.payment.round_dp(2),
            entry.interest_portion.round_dp(2),
            entry.principal_portion.round_dp(2),
            entry.closing_balance.round_dp(2),
        );
    }
    println!("total interest: {}", schedule.total_interest.round_dp(2));

    Ok(())
}

/// several prepayments over the life of a loan, including ones outside its window
use emi_prepayment::chrono::NaiveDate;
use emi_prepayment::format::{describe, format_inr};
use emi_prepayment::{AmortizationEngine, LoanTerms, Money, PrepaymentEvent, Rate, Tenure};
use rust_decimal_macros::dec;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad start date")?;
    let loan = LoanTerms::from_years(Money::from_major(5_000_000), Rate::from_percent(dec!(8.5)), 25, start);

    let events = vec![
        PrepaymentEvent::at_month(start, 37, Money::from_major(300_000))?,
        PrepaymentEvent::at_month(start, 13, Money::from_major(200_000))?,
        PrepaymentEvent::at_month(start, 61, Money::from_major(500_000))?,
        // before the loan starts
        PrepaymentEvent::new(Money::from_major(50_000), NaiveDate::from_ymd_opt(2023, 6, 1).ok_or("bad date")?),
    ];

    let engine = AmortizationEngine::default();
    let result = engine.evaluate(&loan, &events)?;

    println!("loan: {} at {} for {} months", format_inr(loan.principal), loan.annual_rate, loan.tenure_months);
    println!("baseline emi: {}", format_inr(result.baseline_emi));
    println!();

    for outcome in &result.outcomes {
        let savings = outcome
            .interest_savings
            .map(format_inr)
            .unwrap_or_else(|| "n/a".to_string());
        println!(
            "{}  prepaid {:>12}  emi {:>10}  payoff {}  saved {} ({})",
            outcome.date,
            format_inr(outcome.applied_amount),
            format_inr(outcome.new_emi),
            outcome.new_payoff,
            savings,
            outcome.interest_savings.map(describe).unwrap_or_default(),
        );
    }

    for skipped in &result.skipped {
        println!("{}  skipped {} ({:?})", skipped.date, format_inr(skipped.amount), skipped.reason);
    }

    println!();
    println!("total saved: {}", format_inr(result.total_savings));
    match result.final_tenure {
        Tenure::Months(m) => println!("paid off after {} months, {} early", m, loan.tenure_months - m),
        Tenure::Unpayable => println!("remaining balance can not be paid off"),
    }

    // the display schedule marks prepayment months
    let comparison = engine.compare(&loan, &events)?;
    for row in comparison.with_prepayments.prepayment_rows() {
        println!(
            "month {:>3}: paid {} + prepaid {}, balance {}",
            row.month,
            format_inr(row.payment),
            format_inr(row.prepayment),
            format_inr(row.remaining_balance)
        );
    }
    println!(
        "schedule is {} months shorter, interest {} -> {}",
        comparison.tenure_reduction_months,
        format_inr(comparison.original.total_interest),
        format_inr(comparison.with_prepayments.total_interest)
    );

    Ok(())
}

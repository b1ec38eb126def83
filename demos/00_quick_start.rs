/// quick start - minimal example to get started
use emi_prepayment::chrono::NaiveDate;
use emi_prepayment::format::format_inr;
use emi_prepayment::{AmortizationEngine, LoanTerms, Money, PrepaymentEvent, Rate};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).ok_or("bad start date")?;

    // ten lakh over twenty years at 8%
    let loan = LoanTerms::from_years(Money::from_major(1_000_000), Rate::from_percentage(8), 20, start);
    let engine = AmortizationEngine::default();

    let emi = engine.baseline_emi(&loan)?;
    println!("monthly emi: {}", format_inr(emi));

    // one lakh prepaid in the twelfth month
    let prepayment = PrepaymentEvent::at_month(start, 12, Money::from_major(100_000))?;
    let result = engine.evaluate(&loan, &[prepayment])?;

    println!("new emi: {}", format_inr(result.final_emi));
    println!("saved: {}", format_inr(result.total_savings));

    // print the full result
    println!("{}", result.json()?);

    Ok(())
}

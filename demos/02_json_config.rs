/// json config - load engine settings from json and print the result view
use emi_prepayment::chrono::{TimeZone, Utc};
use emi_prepayment::{
    AmortizationEngine, EngineConfig, LoanTerms, Money, PrepaymentEvent, Rate, ResultView, SafeTimeProvider,
    TimeSource,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== json config example ===\n");

    // truncate EMIs instead of rounding; unset fields keep their defaults
    let config = EngineConfig::from_json(r#"{ "emi_rounding": "Down" }"#)?;
    println!("config:\n{}\n", config.to_json_pretty()?);

    // fixed clock so the output is repeatable
    let time = SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()));
    let loan = LoanTerms::starting_today(Money::from_major(1_000_000), Rate::from_percentage(10), 360, &time);

    let engine = AmortizationEngine::new(config);
    println!("emi rounded down: {}", engine.baseline_emi(&loan)?);

    let prepayment = PrepaymentEvent::at_month(loan.start_date, 24, Money::from_major(150_000))?;
    let result = engine.evaluate(&loan, &[prepayment])?;

    // the view a front end renders
    let view = ResultView::from_result(&result);
    println!("payoff month: {:?}", view.summary.payoff_months);
    println!("savings: {}", view.summary.total_savings);
    println!("{}", serde_json::to_string_pretty(&view.summary)?);

    Ok(())
}

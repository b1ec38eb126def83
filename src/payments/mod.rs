pub mod amortization;
pub mod emi;
pub mod prepayment;
pub mod tenure;

pub use amortization::{build_schedule, AmortizationRow, AmortizationSchedule, ScheduleComparison};
pub use emi::{compute_emi, monthly_interest, total_interest};
pub use prepayment::{balance_after_payments, evaluate, EngineResult, PrepaymentOutcome};
pub use tenure::solve_tenure;

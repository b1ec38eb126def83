use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::{
    compute_emi, evaluate, solve_tenure, AmortizationSchedule, EngineResult, ScheduleComparison,
};
use crate::types::{LoanTerms, PrepaymentEvent, Tenure};

/// entry point for a presentation layer; holds configuration only, never
/// loan state, so one engine can serve any number of calculations
#[derive(Debug, Clone, Default)]
pub struct AmortizationEngine {
    config: EngineConfig,
}

impl AmortizationEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// validated EMI for the loan, cheap enough to recompute on every edit
    pub fn baseline_emi(&self, loan: &LoanTerms) -> Result<Money> {
        let loan = loan.normalized();
        loan.validate(&self.config)?;
        compute_emi(loan.principal, loan.annual_rate, loan.tenure_months, self.config.emi_rounding)
    }

    /// full prepayment evaluation
    pub fn evaluate(&self, loan: &LoanTerms, events: &[PrepaymentEvent]) -> Result<EngineResult> {
        evaluate(loan, events, &self.config)
    }

    /// schedule at the baseline EMI with prepayments folded into their months
    pub fn schedule(&self, loan: &LoanTerms, events: &[PrepaymentEvent]) -> Result<AmortizationSchedule> {
        let loan = loan.normalized();
        let emi = self.baseline_emi(&loan)?;
        AmortizationSchedule::generate(
            loan.principal,
            loan.annual_rate,
            loan.tenure_months,
            emi,
            loan.start_date,
            events,
        )
    }

    /// original schedule next to the prepaid one
    pub fn compare(&self, loan: &LoanTerms, events: &[PrepaymentEvent]) -> Result<ScheduleComparison> {
        let original = self.schedule(loan, &[])?;
        let with_prepayments = self.schedule(loan, events)?;
        Ok(ScheduleComparison::new(original, with_prepayments))
    }

    /// months for a given installment to clear a balance
    pub fn tenure_for_emi(&self, principal: Money, emi: Money, annual_rate: Rate) -> Result<Tenure> {
        solve_tenure(principal.abs(), emi.abs(), annual_rate.abs())
    }
}

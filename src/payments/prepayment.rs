use chrono::NaiveDate;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::config::{EmiRounding, EngineConfig};
use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::types::{LoanTerms, PrepaymentEvent, PrepaymentId, SkipReason, SkippedPrepayment, Tenure};

use super::amortization::{plan_cost, AmortizationSchedule, MonthStep};
use super::emi::compute_emi;
use super::tenure::solve_tenure;

/// effect of one prepayment on the running loan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentOutcome {
    pub event_id: PrepaymentId,
    pub amount: Money,
    /// part of the amount that reduced principal
    pub applied_amount: Money,
    pub date: NaiveDate,
    pub months_elapsed: u32,
    pub balance_before: Money,
    pub balance_after: Money,
    /// old plan cost minus new plan cost, each plan's last installment
    /// settling its residue; none when the new plan is unpayable
    pub interest_savings: Option<Money>,
    pub new_emi: Money,
    /// payoff month counted from loan start
    pub new_payoff: Tenure,
}

/// everything one evaluation produces
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    pub loan: LoanTerms,
    pub baseline_emi: Money,
    pub final_emi: Money,
    pub final_tenure: Tenure,
    /// display schedule on the original terms with prepayment markers
    pub schedule: AmortizationSchedule,
    pub outcomes: Vec<PrepaymentOutcome>,
    pub skipped: Vec<SkippedPrepayment>,
    pub total_savings: Money,
}

impl EngineResult {
    pub fn is_unpayable(&self) -> bool {
        self.final_tenure.is_unpayable()
    }

    /// months cut from the original tenure
    pub fn tenure_reduction_months(&self) -> Option<u32> {
        self.final_tenure
            .months()
            .map(|m| self.loan.tenure_months.saturating_sub(m))
    }

    pub fn total_prepaid(&self) -> Money {
        self.outcomes.iter().map(|o| o.applied_amount).sum()
    }
}

/// running loan state between prepayments
#[derive(Debug, Clone, Copy)]
struct LoanState {
    /// month the principal below is measured at
    anchor_month: u32,
    principal: Money,
    emi: Money,
    tenure: Tenure,
    settled: bool,
}

/// apply prepayment events in date order and report the savings of each
///
/// Validation runs once here, before any calculation. Events outside the
/// active loan window are skipped and listed in `skipped`.
pub fn evaluate(loan: &LoanTerms, events: &[PrepaymentEvent], config: &EngineConfig) -> Result<EngineResult> {
    let loan = loan.normalized();
    loan.validate(config)?;

    let rate = loan.annual_rate;
    let baseline_emi = compute_emi(loan.principal, rate, loan.tenure_months, config.emi_rounding)?;

    let events: Vec<PrepaymentEvent> = events.iter().map(PrepaymentEvent::normalized).collect();

    // stable: equal dates keep their input order
    let mut ordered: Vec<&PrepaymentEvent> = events.iter().collect();
    ordered.sort_by_key(|e| e.date);

    let mut state = LoanState {
        anchor_month: 0,
        principal: loan.principal,
        emi: baseline_emi,
        tenure: Tenure::Months(loan.tenure_months),
        settled: false,
    };
    let mut outcomes = Vec::new();
    let mut skipped = Vec::new();

    for event in ordered {
        match apply_event(&loan, event, &mut state, config)? {
            EventDecision::Applied(outcome) => outcomes.push(outcome),
            EventDecision::Skipped(reason) => {
                warn!(
                    "prepayment {} of {} on {} skipped: {:?}",
                    event.id, event.amount, event.date, reason
                );
                skipped.push(SkippedPrepayment {
                    event_id: event.id,
                    amount: event.amount,
                    date: event.date,
                    reason,
                });
            }
        }
    }

    let total_savings = outcomes.iter().filter_map(|o| o.interest_savings).sum();
    let schedule = AmortizationSchedule::generate(
        loan.principal,
        rate,
        loan.tenure_months,
        baseline_emi,
        loan.start_date,
        &events,
    )?;

    Ok(EngineResult {
        loan,
        baseline_emi,
        final_emi: state.emi,
        final_tenure: state.tenure,
        schedule,
        outcomes,
        skipped,
        total_savings,
    })
}

enum EventDecision {
    Applied(PrepaymentOutcome),
    Skipped(SkipReason),
}

fn apply_event(
    loan: &LoanTerms,
    event: &PrepaymentEvent,
    state: &mut LoanState,
    config: &EngineConfig,
) -> Result<EventDecision> {
    let current_tenure = match state.tenure {
        Tenure::Months(m) => m,
        Tenure::Unpayable => return Ok(EventDecision::Skipped(SkipReason::LoanUnpayable)),
    };
    if state.settled {
        return Ok(EventDecision::Skipped(SkipReason::LoanSettled));
    }

    let Ok(elapsed) = u32::try_from(event.elapsed_months(loan.start_date)) else {
        return Ok(EventDecision::Skipped(SkipReason::BeforeStart));
    };
    if elapsed >= current_tenure {
        return Ok(EventDecision::Skipped(SkipReason::AfterPayoff));
    }

    let rate = loan.annual_rate;
    let payments = elapsed.saturating_sub(state.anchor_month);
    let balance_before = balance_after_payments(state.principal, state.emi, rate, payments)?;
    if balance_before < config.settlement_tolerance {
        return Ok(EventDecision::Skipped(SkipReason::LoanSettled));
    }

    let applied_amount = event.amount.min(balance_before);
    let balance_after = (balance_before - applied_amount).max(Money::ZERO);
    let remaining_months = current_tenure - elapsed;
    let settled = balance_after < config.settlement_tolerance;

    let (new_emi, relative_tenure) = if settled {
        (Money::ZERO, Tenure::Months(0))
    } else {
        // only the prepaid share of the installment comes off; the current plan's
        // rounding residue stays with it instead of being re-quoted
        let relief = compute_emi(applied_amount, rate, remaining_months, EmiRounding::Exact)?;
        let new_emi = config
            .emi_rounding
            .apply_at_least((state.emi - relief).max(Money::ZERO));
        // the new emi was sized for the remaining horizon; the last payment absorbs rounding
        let tenure = match solve_tenure(balance_after, new_emi, rate)? {
            Tenure::Months(m) => Tenure::Months(m.min(remaining_months)),
            Tenure::Unpayable => Tenure::Unpayable,
        };
        (new_emi, tenure)
    };

    // installments already paid are common to both plans and cancel out
    let interest_savings = match relative_tenure {
        Tenure::Months(new_months) => {
            let old_cost = plan_cost(balance_before, rate, remaining_months, state.emi)?;
            let new_cost = plan_cost(balance_after, rate, new_months, new_emi)? + applied_amount;
            Some(old_cost - new_cost)
        }
        Tenure::Unpayable => None,
    };
    let new_payoff = match relative_tenure {
        Tenure::Months(m) => Tenure::Months(m + elapsed),
        Tenure::Unpayable => Tenure::Unpayable,
    };

    debug!(
        "prepayment {} at month {}: balance {} -> {}, emi {} -> {}, payoff {}",
        event.id, elapsed, balance_before, balance_after, state.emi, new_emi, new_payoff
    );

    *state = LoanState {
        anchor_month: elapsed,
        principal: balance_after,
        emi: new_emi,
        tenure: new_payoff,
        settled,
    };

    Ok(EventDecision::Applied(PrepaymentOutcome {
        event_id: event.id,
        amount: event.amount,
        applied_amount,
        date: event.date,
        months_elapsed: elapsed,
        balance_before,
        balance_after,
        interest_savings,
        new_emi,
        new_payoff,
    }))
}

/// outstanding balance after a run of regular installments
pub fn balance_after_payments(principal: Money, emi: Money, annual_rate: Rate, payments: u32) -> Result<Money> {
    let mut balance = principal;
    for _ in 0..payments {
        balance = MonthStep::run(balance, annual_rate, emi, Money::ZERO, false)?.balance;
    }
    Ok(balance)
}

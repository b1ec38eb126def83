/// serialization support for engine output
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;
use crate::payments::{AmortizationRow, EngineResult, PrepaymentOutcome};
use crate::types::{PrepaymentId, SkipReason};

/// flat view of an evaluation for a presentation layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultView {
    pub loan: LoanView,
    pub summary: SummaryView,
    pub prepayments: Vec<OutcomeView>,
    pub skipped: Vec<SkippedView>,
    pub schedule: Vec<AmortizationRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanView {
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryView {
    pub baseline_emi: Money,
    pub final_emi: Money,
    pub total_savings: Money,
    pub total_prepaid: Money,
    /// none when the loan cannot be paid off
    pub payoff_months: Option<u32>,
    pub tenure_reduction_months: Option<u32>,
    pub unpayable: bool,
    pub schedule_total_payment: Money,
    pub schedule_total_interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeView {
    pub event_id: PrepaymentId,
    pub date: NaiveDate,
    pub amount: Money,
    pub applied_amount: Money,
    pub interest_savings: Option<Money>,
    pub new_emi: Money,
    pub new_payoff_month: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedView {
    pub event_id: PrepaymentId,
    pub date: NaiveDate,
    pub amount: Money,
    pub reason: SkipReason,
}

impl ResultView {
    pub fn from_result(result: &EngineResult) -> Self {
        ResultView {
            loan: LoanView {
                principal: result.loan.principal,
                annual_rate: result.loan.annual_rate,
                tenure_months: result.loan.tenure_months,
                start_date: result.loan.start_date,
            },
            summary: SummaryView {
                baseline_emi: result.baseline_emi,
                final_emi: result.final_emi,
                total_savings: result.total_savings,
                total_prepaid: result.total_prepaid(),
                payoff_months: result.final_tenure.months(),
                tenure_reduction_months: result.tenure_reduction_months(),
                unpayable: result.is_unpayable(),
                schedule_total_payment: result.schedule.total_payment,
                schedule_total_interest: result.schedule.total_interest,
            },
            prepayments: result.outcomes.iter().map(OutcomeView::from_outcome).collect(),
            skipped: result
                .skipped
                .iter()
                .map(|s| SkippedView {
                    event_id: s.event_id,
                    date: s.date,
                    amount: s.amount,
                    reason: s.reason,
                })
                .collect(),
            schedule: result.schedule.rows.clone(),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl OutcomeView {
    fn from_outcome(outcome: &PrepaymentOutcome) -> Self {
        OutcomeView {
            event_id: outcome.event_id,
            date: outcome.date,
            amount: outcome.amount,
            applied_amount: outcome.applied_amount,
            interest_savings: outcome.interest_savings,
            new_emi: outcome.new_emi,
            new_payoff_month: outcome.new_payoff.months(),
        }
    }
}

impl EngineResult {
    /// json view of this result
    pub fn json(&self) -> Result<String> {
        ResultView::from_result(self).to_json_pretty()
    }
}

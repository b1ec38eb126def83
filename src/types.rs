use chrono::NaiveDate;
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::calendar;
use crate::config::EngineConfig;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};

/// unique identifier for a prepayment event
pub type PrepaymentId = Uuid;

/// fixed-rate, fixed-tenure loan parameters
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanTerms {
    pub principal: Money,
    pub annual_rate: Rate,
    pub tenure_months: u32,
    pub start_date: NaiveDate,
}

impl LoanTerms {
    /// create loan terms, discarding the sign of every input
    pub fn new(principal: Money, annual_rate: Rate, tenure_months: i64, start_date: NaiveDate) -> Self {
        Self {
            principal,
            annual_rate,
            tenure_months: u32::try_from(tenure_months.unsigned_abs()).unwrap_or(u32::MAX),
            start_date,
        }
        .normalized()
    }

    /// create loan terms from a tenure quoted in years
    pub fn from_years(principal: Money, annual_rate: Rate, years: i64, start_date: NaiveDate) -> Self {
        Self::new(principal, annual_rate, years.saturating_mul(12), start_date)
    }

    /// create loan terms starting on the provider's current date
    pub fn starting_today(
        principal: Money,
        annual_rate: Rate,
        tenure_months: i64,
        time_provider: &SafeTimeProvider,
    ) -> Self {
        Self::new(principal, annual_rate, tenure_months, time_provider.now().date_naive())
    }

    /// copy with principal and rate reduced to their magnitudes
    pub fn normalized(&self) -> Self {
        Self {
            principal: self.principal.abs(),
            annual_rate: self.annual_rate.abs(),
            tenure_months: self.tenure_months,
            start_date: self.start_date,
        }
    }

    /// positivity gate run before any calculation
    pub fn validate(&self, config: &EngineConfig) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(EngineError::Validation {
                field: "principal",
                message: format!("must be greater than zero, got {}", self.principal),
            });
        }
        if !self.annual_rate.is_positive() {
            return Err(EngineError::Validation {
                field: "annual_rate",
                message: format!("must be greater than zero, got {}", self.annual_rate),
            });
        }
        if self.annual_rate > config.max_annual_rate {
            return Err(EngineError::Validation {
                field: "annual_rate",
                message: format!("{} exceeds the maximum of {}", self.annual_rate, config.max_annual_rate),
            });
        }
        if self.tenure_months == 0 {
            return Err(EngineError::Validation {
                field: "tenure_months",
                message: "must be at least one month".to_string(),
            });
        }
        if self.tenure_months > config.max_tenure_months {
            return Err(EngineError::Validation {
                field: "tenure_months",
                message: format!(
                    "{} exceeds the maximum of {} months",
                    self.tenure_months, config.max_tenure_months
                ),
            });
        }
        Ok(())
    }
}

/// lump-sum payment applied directly to principal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrepaymentEvent {
    #[serde(default = "Uuid::new_v4")]
    pub id: PrepaymentId,
    pub amount: Money,
    pub date: NaiveDate,
}

impl PrepaymentEvent {
    pub fn new(amount: Money, date: NaiveDate) -> Self {
        Self::with_id(Uuid::new_v4(), amount, date)
    }

    pub fn with_id(id: PrepaymentId, amount: Money, date: NaiveDate) -> Self {
        Self {
            id,
            amount: amount.abs(),
            date,
        }
    }

    /// event dated on a 1-based schedule month of a loan starting at `start`
    pub fn at_month(start: NaiveDate, month: u32, amount: Money) -> Result<Self> {
        let date = calendar::add_months(start, month.saturating_sub(1))?;
        Ok(Self::new(amount, date))
    }

    /// copy with the amount reduced to its magnitude
    pub fn normalized(&self) -> Self {
        Self::with_id(self.id, self.amount, self.date)
    }

    /// whole calendar months between the loan start and this event
    pub fn elapsed_months(&self, start: NaiveDate) -> i32 {
        calendar::months_between(start, self.date)
    }
}

/// months needed to amortize a balance, or the unpayable sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tenure {
    Months(u32),
    /// the installment does not cover the monthly interest
    Unpayable,
}

impl Tenure {
    pub fn months(&self) -> Option<u32> {
        match self {
            Tenure::Months(m) => Some(*m),
            Tenure::Unpayable => None,
        }
    }

    pub fn is_unpayable(&self) -> bool {
        matches!(self, Tenure::Unpayable)
    }
}

impl fmt::Display for Tenure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tenure::Months(m) => write!(f, "{} months", m),
            Tenure::Unpayable => write!(f, "unpayable"),
        }
    }
}

/// why a prepayment event was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// dated before the loan start month
    BeforeStart,
    /// dated on or after the current payoff month
    AfterPayoff,
    /// an earlier prepayment already closed the loan
    LoanSettled,
    /// an earlier prepayment left the loan unpayable
    LoanUnpayable,
}

/// a prepayment event that the evaluator did not apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedPrepayment {
    pub event_id: PrepaymentId,
    pub amount: Money,
    pub date: NaiveDate,
    pub reason: SkipReason,
}

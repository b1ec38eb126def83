use rust_decimal::RoundingStrategy;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::Result;

/// how a computed EMI is quoted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmiRounding {
    /// nearest whole currency unit, halves away from zero
    #[default]
    Nearest,
    /// truncate to the whole currency unit
    Down,
    /// keep the textbook value at money precision
    Exact,
}

impl EmiRounding {
    pub fn apply(&self, amount: Money) -> Money {
        let d = amount.as_decimal();
        match self {
            EmiRounding::Nearest => {
                Money::from_decimal(d.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
            }
            EmiRounding::Down => Money::from_decimal(d.round_dp_with_strategy(0, RoundingStrategy::ToZero)),
            EmiRounding::Exact => amount,
        }
    }

    /// quote without going below `amount`: whole-unit policies take the
    /// next unit up
    pub fn apply_at_least(&self, amount: Money) -> Money {
        match self {
            EmiRounding::Nearest | EmiRounding::Down => Money::from_decimal(amount.as_decimal().ceil()),
            EmiRounding::Exact => amount,
        }
    }
}

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub emi_rounding: EmiRounding,
    /// balances strictly below this count as settled
    pub settlement_tolerance: Money,
    /// longest tenure accepted by validation
    pub max_tenure_months: u32,
    /// highest annual rate accepted by validation
    pub max_annual_rate: Rate,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            emi_rounding: EmiRounding::Nearest,
            settlement_tolerance: Money::ONE,
            max_tenure_months: 1200,
            max_annual_rate: Rate::from_percentage(100),
        }
    }
}

impl EngineConfig {
    /// unrounded EMI, as quoted in textbooks
    pub fn textbook() -> Self {
        Self {
            emi_rounding: EmiRounding::Exact,
            ..Self::default()
        }
    }

    pub fn with_rounding(mut self, rounding: EmiRounding) -> Self {
        self.emi_rounding = rounding;
        self
    }

    /// load from json; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

use log::warn;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, MathematicalOps};

use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::Tenure;

// digits kept before taking the ceiling, so ln noise on an exact
// month count does not add a phantom month
const TENURE_PRECISION_DP: u32 = 6;

/// months needed for `emi` to amortize `principal` at `annual_rate`
///
/// `n = ceil(ln(emi / (emi - P*r)) / ln(1 + r))`. A partial final month still
/// needs a payment, so the count always rounds up. An installment that does
/// not exceed the first month's interest never amortizes and returns
/// `Tenure::Unpayable`.
pub fn solve_tenure(principal: Money, emi: Money, annual_rate: Rate) -> Result<Tenure> {
    let r = annual_rate.monthly_rate().as_decimal();
    if r <= Decimal::ZERO {
        return Err(EngineError::InvalidTerm {
            message: format!("monthly rate must be positive, got {}", r),
        });
    }

    if !principal.is_positive() {
        return Ok(Tenure::Months(0));
    }

    let interest = principal.as_decimal() * r;
    let e = emi.as_decimal();
    if e <= interest {
        warn!(
            "installment {} does not cover monthly interest {} on {}",
            emi,
            interest.round_dp(2),
            principal
        );
        return Ok(Tenure::Unpayable);
    }

    let ratio = e
        .checked_div(e - interest)
        .ok_or_else(|| calculation("payment ratio"))?;
    let numerator = ratio.checked_ln().ok_or_else(|| calculation("ln of payment ratio"))?;
    let denominator = (Decimal::ONE + r)
        .checked_ln()
        .ok_or_else(|| calculation("ln of growth factor"))?;
    if denominator.is_zero() {
        return Err(EngineError::InvalidTerm {
            message: format!("rate {} has no monthly growth", annual_rate),
        });
    }

    let months = (numerator / denominator)
        .round_dp(TENURE_PRECISION_DP)
        .ceil()
        .to_u32()
        .ok_or_else(|| calculation("tenure does not fit in u32"))?;

    Ok(Tenure::Months(months))
}

fn calculation(step: &str) -> EngineError {
    EngineError::Calculation {
        message: format!("tenure solver failed at {}", step),
    }
}

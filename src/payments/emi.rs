use rust_decimal::Decimal;

use crate::config::EmiRounding;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};

/// calculate the equal monthly installment for a fully amortizing loan
///
/// `EMI = P * r * (1 + r)^n / ((1 + r)^n - 1)` with `r` the monthly rate.
/// Zero months or a non-positive rate have no installment and fail with
/// `InvalidTerm` instead of producing a division by zero.
pub fn compute_emi(principal: Money, annual_rate: Rate, months: u32, rounding: EmiRounding) -> Result<Money> {
    if months == 0 {
        return Err(EngineError::InvalidTerm {
            message: "tenure must be at least one month".to_string(),
        });
    }

    let r = annual_rate.monthly_rate().as_decimal();
    if r <= Decimal::ZERO {
        return Err(EngineError::InvalidTerm {
            message: format!("monthly rate must be positive, got {}", r),
        });
    }

    let compound = compound_factor(r, months)?;
    let denominator = compound - Decimal::ONE;
    if denominator.is_zero() {
        return Err(EngineError::InvalidTerm {
            message: format!("rate {} over {} months has no growth", annual_rate, months),
        });
    }

    let numerator = principal
        .as_decimal()
        .checked_mul(r)
        .and_then(|v| v.checked_mul(compound))
        .ok_or_else(|| EngineError::overflow("emi numerator"))?;
    let emi = numerator
        .checked_div(denominator)
        .ok_or_else(|| EngineError::overflow("emi division"))?;

    Ok(rounding.apply(Money::from_decimal(emi)))
}

/// interest accrued on a balance over one month
pub fn monthly_interest(balance: Money, annual_rate: Rate) -> Result<Money> {
    balance
        .checked_mul(annual_rate.monthly_rate().as_decimal())
        .ok_or_else(|| EngineError::overflow("monthly interest"))
}

/// total interest paid when every installment equals the EMI
pub fn total_interest(principal: Money, annual_rate: Rate, months: u32, rounding: EmiRounding) -> Result<Money> {
    let emi = compute_emi(principal, annual_rate, months, rounding)?;
    Ok(emi.times(months) - principal)
}

/// (1 + r)^n
fn compound_factor(r: Decimal, n: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| EngineError::overflow("compound factor"))?;
    }
    Ok(compound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_emi_twenty_year_loans() {
        let principal = Money::from_major(1_000_000);

        let emi = compute_emi(principal, Rate::from_percent(dec!(8.5)), 240, EmiRounding::Nearest).unwrap();
        assert_eq!(emi, Money::from_major(8678));

        let emi = compute_emi(principal, Rate::from_percentage(10), 240, EmiRounding::Nearest).unwrap();
        assert_eq!(emi, Money::from_major(9650));

        let emi = compute_emi(principal, Rate::from_percentage(8), 240, EmiRounding::Nearest).unwrap();
        assert_eq!(emi, Money::from_major(8364));
    }

    #[test]
    fn test_emi_thirty_year_loans() {
        let principal = Money::from_major(1_000_000);

        let emi = compute_emi(principal, Rate::from_percent(dec!(8.5)), 360, EmiRounding::Nearest).unwrap();
        assert_eq!(emi, Money::from_major(7689));

        // 8775.72 before rounding
        let emi = compute_emi(principal, Rate::from_percentage(10), 360, EmiRounding::Nearest).unwrap();
        assert_eq!(emi, Money::from_major(8776));
        let emi = compute_emi(principal, Rate::from_percentage(10), 360, EmiRounding::Down).unwrap();
        assert_eq!(emi, Money::from_major(8775));
    }

    #[test]
    fn test_emi_exact_keeps_fraction() {
        let emi = compute_emi(Money::from_major(100_000), Rate::from_percentage(12), 12, EmiRounding::Exact).unwrap();
        assert!(emi > Money::from_str_exact("8884.87").unwrap());
        assert!(emi < Money::from_str_exact("8884.89").unwrap());
    }

    #[test]
    fn test_emi_zero_rate_is_invalid_term() {
        let err = compute_emi(Money::from_major(12_000), Rate::ZERO, 12, EmiRounding::Nearest).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTerm { .. }));
    }

    #[test]
    fn test_emi_zero_months_is_invalid_term() {
        let err = compute_emi(Money::from_major(12_000), Rate::from_percentage(8), 0, EmiRounding::Nearest).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTerm { .. }));
    }

    #[test]
    fn test_single_month_emi_is_principal_plus_interest() {
        let emi = compute_emi(Money::from_major(10_000), Rate::from_percentage(12), 1, EmiRounding::Exact).unwrap();
        assert_eq!(emi, Money::from_major(10_100));
    }

    #[test]
    fn test_total_interest() {
        let interest = total_interest(Money::from_major(1_000_000), Rate::from_percentage(8), 240, EmiRounding::Nearest).unwrap();
        // 8364 * 240 - 1_000_000
        assert_eq!(interest, Money::from_major(1_007_360));
    }

    #[test]
    fn test_monthly_interest() {
        let interest = monthly_interest(Money::from_major(120_000), Rate::from_percentage(10)).unwrap();
        assert_eq!(interest, Money::from_major(1_000));

        let err = monthly_interest(Money::from_decimal(Decimal::MAX), Rate::from_percentage(2400)).unwrap_err();
        assert!(matches!(err, EngineError::Calculation { .. }));
    }
}

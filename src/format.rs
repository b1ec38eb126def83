//! Display helpers for a presentation layer. Output only: nothing here
//! feeds back into a calculation.

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;

use crate::decimal::Money;

/// en-IN rupee string in whole rupees with lakh/crore grouping,
/// e.g. `₹10,00,000`; zero formats as an empty string
pub fn format_inr(amount: Money) -> String {
    if amount.is_zero() {
        return String::new();
    }

    let whole = amount
        .as_decimal()
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let sign = if whole.is_sign_negative() && !whole.is_zero() { "-" } else { "" };
    let digits = whole.abs().trunc().to_string();

    format!("{}₹{}", sign, group_indian(&digits))
}

/// magnitude in words: `12.0 thousand`, `1.5 lakh`, `2.0 crore`;
/// below a thousand the plain number, zero as an empty string
pub fn describe(amount: Money) -> String {
    let value = amount.as_decimal();
    if value.is_zero() {
        return String::new();
    }
    if value < dec!(1_000) {
        return value.normalize().to_string();
    }

    let (scaled, unit) = if value < dec!(100_000) {
        (value / dec!(1_000), "thousand")
    } else if value < dec!(10_000_000) {
        (value / dec!(100_000), "lakh")
    } else {
        (value / dec!(10_000_000), "crore")
    };
    format!("{} {}", one_decimal(scaled), unit)
}

fn one_decimal(value: Decimal) -> String {
    let mut rounded = value.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(1);
    rounded.to_string()
}

/// last three digits, then pairs: 12345678 -> 1,23,45,678
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

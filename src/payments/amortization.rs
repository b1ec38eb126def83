use chrono::NaiveDate;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::calendar::add_months;
use crate::decimal::{Money, Rate};
use crate::errors::{EngineError, Result};
use crate::types::{PrepaymentEvent, PrepaymentId};

use super::emi::monthly_interest;

/// one month of an amortization schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub month: u32,
    pub date: NaiveDate,
    pub payment: Money,
    pub principal_component: Money,
    pub interest_component: Money,
    /// lump sum folded into this month's principal
    pub prepayment: Money,
    pub remaining_balance: Money,
    pub cumulative_interest: Money,
}

impl AmortizationRow {
    pub fn has_prepayment(&self) -> bool {
        self.prepayment.is_positive()
    }
}

/// month-by-month schedule with totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub emi: Money,
    pub start_date: NaiveDate,
    pub rows: Vec<AmortizationRow>,
    /// prepayment events whose month was reached
    pub applied_prepayments: Vec<PrepaymentId>,
    pub total_payment: Money,
    pub total_interest: Money,
}

impl AmortizationSchedule {
    /// generate payment schedule
    pub fn generate(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        emi: Money,
        start_date: NaiveDate,
        prepayments: &[PrepaymentEvent],
    ) -> Result<Self> {
        let lookup = prepayments_by_month(start_date, prepayments);
        let rows = schedule_rows(principal, annual_rate, term_months, emi, start_date, &lookup)?;

        let last_month = rows.last().map(|r| r.month).unwrap_or(0);
        let applied_prepayments = lookup
            .range(..=last_month)
            .flat_map(|(_, bucket)| bucket.ids.iter().copied())
            .collect();

        let total_payment = rows.iter().map(|r| r.payment).sum();
        let total_interest = rows.last().map(|r| r.cumulative_interest).unwrap_or(Money::ZERO);

        debug!(
            "schedule for {} at {} over {} months paid off in {} months",
            principal,
            annual_rate,
            term_months,
            rows.len()
        );

        Ok(Self {
            principal,
            annual_rate,
            term_months,
            emi,
            start_date,
            rows,
            applied_prepayments,
            total_payment,
            total_interest,
        })
    }

    /// get row for a 1-based month
    pub fn row(&self, month: u32) -> Option<&AmortizationRow> {
        month
            .checked_sub(1)
            .and_then(|i| self.rows.get(i as usize))
    }

    /// month of the final payment
    pub fn payoff_month(&self) -> u32 {
        self.rows.len() as u32
    }

    pub fn final_balance(&self) -> Money {
        self.rows
            .last()
            .map(|r| r.remaining_balance)
            .unwrap_or(self.principal)
    }

    pub fn total_prepaid(&self) -> Money {
        self.rows.iter().map(|r| r.prepayment).sum()
    }

    /// rows carrying a prepayment marker
    pub fn prepayment_rows(&self) -> impl Iterator<Item = &AmortizationRow> {
        self.rows.iter().filter(|r| r.has_prepayment())
    }
}

/// expand a loan into its month-by-month rows, folding each prepayment into
/// the principal of the month its date falls in
pub fn build_schedule(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    emi: Money,
    start_date: NaiveDate,
    prepayments: &[PrepaymentEvent],
) -> Result<Vec<AmortizationRow>> {
    let lookup = prepayments_by_month(start_date, prepayments);
    schedule_rows(principal, annual_rate, months, emi, start_date, &lookup)
}

#[derive(Debug, Default)]
struct MonthBucket {
    amount: Money,
    ids: Vec<PrepaymentId>,
}

/// prepayments keyed by 1-based schedule month; events before the start
/// month have no row and are left out
fn prepayments_by_month(start_date: NaiveDate, prepayments: &[PrepaymentEvent]) -> BTreeMap<u32, MonthBucket> {
    let mut lookup: BTreeMap<u32, MonthBucket> = BTreeMap::new();
    for event in prepayments {
        let Ok(elapsed) = u32::try_from(event.elapsed_months(start_date)) else {
            continue;
        };
        let bucket = lookup.entry(elapsed + 1).or_default();
        bucket.amount += event.amount.abs();
        bucket.ids.push(event.id);
    }
    lookup
}

fn schedule_rows(
    principal: Money,
    annual_rate: Rate,
    months: u32,
    emi: Money,
    start_date: NaiveDate,
    lookup: &BTreeMap<u32, MonthBucket>,
) -> Result<Vec<AmortizationRow>> {
    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;
    let mut cumulative_interest = Money::ZERO;

    for month in 1..=months {
        if !balance.is_positive() {
            break;
        }

        let scheduled_prepayment = lookup.get(&month).map(|b| b.amount).unwrap_or(Money::ZERO);
        let step = MonthStep::run(balance, annual_rate, emi, scheduled_prepayment, month == months)?;

        let prepayment = scheduled_prepayment.min(step.principal_component.max(Money::ZERO));
        let payment = step.payment();
        balance = step.balance;
        cumulative_interest += step.interest;

        trace!(
            "month {}: payment {} principal {} interest {} balance {}",
            month,
            payment,
            step.principal_component,
            step.interest,
            balance
        );

        rows.push(AmortizationRow {
            month,
            date: add_months(start_date, month - 1)?,
            payment,
            principal_component: step.principal_component,
            interest_component: step.interest,
            prepayment,
            remaining_balance: balance,
            cumulative_interest,
        });
    }

    Ok(rows)
}

/// one month of repayment against a running balance
#[derive(Debug, Clone, Copy)]
pub(crate) struct MonthStep {
    pub interest: Money,
    pub principal_component: Money,
    /// balance after this month, never negative
    pub balance: Money,
}

impl MonthStep {
    /// pay `emi` plus `extra` against `balance`; with `settle` set, or when
    /// the payment would overshoot, the whole balance is repaid instead
    pub(crate) fn run(balance: Money, annual_rate: Rate, emi: Money, extra: Money, settle: bool) -> Result<Self> {
        let interest = monthly_interest(balance, annual_rate)?;
        let mut principal_component = emi
            .checked_sub(interest)
            .and_then(|p| p.checked_add(extra))
            .ok_or_else(|| EngineError::overflow("principal component"))?;

        // final payment settles whatever is left, including emi rounding residue
        if principal_component > balance || settle {
            principal_component = balance;
        }

        let balance = balance
            .checked_sub(principal_component)
            .ok_or_else(|| EngineError::overflow("remaining balance"))?
            .max(Money::ZERO);

        Ok(Self {
            interest,
            principal_component,
            balance,
        })
    }

    pub(crate) fn payment(&self) -> Money {
        self.principal_component + self.interest
    }
}

/// total paid to clear `principal` with installments of `emi`, the last of
/// `months` installments settling whatever is left
pub fn plan_cost(principal: Money, annual_rate: Rate, months: u32, emi: Money) -> Result<Money> {
    let mut balance = principal;
    let mut total = Money::ZERO;
    for month in 1..=months {
        if !balance.is_positive() {
            break;
        }
        let step = MonthStep::run(balance, annual_rate, emi, Money::ZERO, month == months)?;
        total += step.payment();
        balance = step.balance;
    }
    Ok(total)
}

/// original schedule against the same loan with prepayments applied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleComparison {
    pub original: AmortizationSchedule,
    pub with_prepayments: AmortizationSchedule,
    pub tenure_reduction_months: u32,
}

impl ScheduleComparison {
    pub fn new(original: AmortizationSchedule, with_prepayments: AmortizationSchedule) -> Self {
        let tenure_reduction_months = original
            .payoff_month()
            .saturating_sub(with_prepayments.payoff_month());
        Self {
            original,
            with_prepayments,
            tenure_reduction_months,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmiRounding;
    use crate::payments::emi::compute_emi;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn home_loan_emi() -> Money {
        compute_emi(Money::from_major(1_000_000), Rate::from_percentage(8), 240, EmiRounding::Nearest).unwrap()
    }

    #[test]
    fn test_schedule_without_prepayments() {
        let principal = Money::from_major(1_000_000);
        let schedule = AmortizationSchedule::generate(
            principal,
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &[],
        )
        .unwrap();

        assert_eq!(schedule.rows.len(), 240);

        let first = schedule.row(1).unwrap();
        assert_eq!(first.month, 1);
        assert_eq!(first.date, start());
        assert_eq!(first.payment, Money::from_major(8_364));
        assert!((first.interest_component - Money::from_str_exact("6666.67").unwrap()).abs() < Money::ONE);
        assert!(first.principal_component > Money::from_major(1_600));
        assert!(first.principal_component < Money::from_major(1_800));

        assert!(schedule.total_payment > Money::from_major(2_007_000));
        assert!(schedule.total_payment < Money::from_major(2_008_000));
        assert_eq!(schedule.final_balance(), Money::ZERO);
    }

    #[test]
    fn test_cumulative_interest_matches_payments() {
        let principal = Money::from_major(1_000_000);
        let schedule = AmortizationSchedule::generate(
            principal,
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &[],
        )
        .unwrap();

        let diff = schedule.total_payment - principal - schedule.total_interest;
        assert!(diff.abs() < Money::ONE);
    }

    #[test]
    fn test_row_dates_follow_calendar_months() {
        let jan_31 = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        let rows = build_schedule(Money::from_major(10_000), Rate::from_percentage(12), 3, Money::from_major(3_400), jan_31, &[]).unwrap();

        assert_eq!(rows[0].date, jan_31);
        assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_single_prepayment_shortens_schedule() {
        let prepayment = PrepaymentEvent::at_month(start(), 12, Money::from_major(100_000)).unwrap();
        let schedule = AmortizationSchedule::generate(
            Money::from_major(1_000_000),
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &[prepayment.clone()],
        )
        .unwrap();

        let month_12 = schedule.row(12).unwrap();
        assert!(month_12.payment > Money::from_major(108_300));
        assert!(month_12.payment < Money::from_major(108_400));
        assert_eq!(month_12.prepayment, Money::from_major(100_000));

        assert!(schedule.rows.len() < 240);
        assert!(schedule.final_balance() < Money::ONE);
        assert_eq!(schedule.applied_prepayments, vec![prepayment.id]);
        assert_eq!(schedule.prepayment_rows().count(), 1);
    }

    #[test]
    fn test_multiple_prepayments() {
        let events = vec![
            PrepaymentEvent::at_month(start(), 24, Money::from_major(50_000)).unwrap(),
            PrepaymentEvent::at_month(start(), 12, Money::from_major(50_000)).unwrap(),
        ];
        let schedule = AmortizationSchedule::generate(
            Money::from_major(1_000_000),
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &events,
        )
        .unwrap();

        for month in [12, 24] {
            let row = schedule.row(month).unwrap();
            assert!(row.payment > Money::from_major(58_300));
            assert!(row.payment < Money::from_major(58_400));
        }
        assert!(schedule.rows.len() < 240);
        assert_eq!(schedule.total_prepaid(), Money::from_major(100_000));
    }

    #[test]
    fn test_same_month_prepayments_are_summed() {
        let day_1 = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let day_28 = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let events = vec![
            PrepaymentEvent::new(Money::from_major(10_000), day_1),
            PrepaymentEvent::new(Money::from_major(5_000), day_28),
        ];
        let rows = build_schedule(
            Money::from_major(1_000_000),
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &events,
        )
        .unwrap();

        assert_eq!(rows[5].prepayment, Money::from_major(15_000));
    }

    #[test]
    fn test_prepayment_larger_than_balance_ends_schedule() {
        let principal = Money::from_major(100_000);
        let rate = Rate::from_percentage(12);
        let emi = compute_emi(principal, rate, 12, EmiRounding::Nearest).unwrap();
        let events = vec![PrepaymentEvent::at_month(start(), 2, Money::from_major(95_000)).unwrap()];

        let schedule = AmortizationSchedule::generate(principal, rate, 12, emi, start(), &events).unwrap();

        assert!(schedule.rows.len() < 12);
        let last = schedule.rows.last().unwrap();
        assert!(last.remaining_balance < Money::ONE);
        // final payment is below emi + prepayment
        assert!(last.payment < emi + Money::from_major(95_000));
    }

    #[test]
    fn test_prepayment_before_start_is_ignored() {
        let before = NaiveDate::from_ymd_opt(2023, 12, 15).unwrap();
        let events = vec![PrepaymentEvent::new(Money::from_major(50_000), before)];
        let schedule = AmortizationSchedule::generate(
            Money::from_major(1_000_000),
            Rate::from_percentage(8),
            240,
            home_loan_emi(),
            start(),
            &events,
        )
        .unwrap();

        assert_eq!(schedule.rows.len(), 240);
        assert!(schedule.applied_prepayments.is_empty());
        assert_eq!(schedule.total_prepaid(), Money::ZERO);
    }

    #[test]
    fn test_comparison_reports_tenure_reduction() {
        let principal = Money::from_major(1_000_000);
        let rate = Rate::from_percentage(8);
        let events = vec![PrepaymentEvent::at_month(start(), 12, Money::from_major(100_000)).unwrap()];

        let original = AmortizationSchedule::generate(principal, rate, 240, home_loan_emi(), start(), &[]).unwrap();
        let prepaid = AmortizationSchedule::generate(principal, rate, 240, home_loan_emi(), start(), &events).unwrap();
        let comparison = ScheduleComparison::new(original, prepaid);

        assert!(comparison.tenure_reduction_months > 0);
        assert_eq!(
            comparison.tenure_reduction_months,
            240 - comparison.with_prepayments.payoff_month()
        );
        assert!(comparison.with_prepayments.total_interest < comparison.original.total_interest);
    }

    #[test]
    fn test_signed_prepayment_amount_counts_as_payment() {
        let positive = PrepaymentEvent::at_month(start(), 12, Money::from_major(100_000)).unwrap();
        let negative = PrepaymentEvent {
            amount: Money::from_major(-100_000),
            ..positive.clone()
        };

        let expected = build_schedule(Money::from_major(1_000_000), Rate::from_percentage(8), 240, home_loan_emi(), start(), &[positive]).unwrap();
        let rows = build_schedule(Money::from_major(1_000_000), Rate::from_percentage(8), 240, home_loan_emi(), start(), &[negative]).unwrap();

        assert_eq!(rows[11].prepayment, Money::from_major(100_000));
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_plan_cost_matches_schedule_total() {
        let principal = Money::from_major(1_000_000);
        let rate = Rate::from_percentage(8);
        let schedule = AmortizationSchedule::generate(principal, rate, 240, home_loan_emi(), start(), &[]).unwrap();

        assert_eq!(plan_cost(principal, rate, 240, home_loan_emi()).unwrap(), schedule.total_payment);
        assert_eq!(plan_cost(Money::ZERO, rate, 240, home_loan_emi()).unwrap(), Money::ZERO);
    }

    #[test]
    fn test_plan_cost_settles_on_last_month() {
        // 1% a month: 1000 interest, 1000 principal, then the rest with its interest
        let cost = plan_cost(Money::from_major(100_000), Rate::from_percentage(12), 2, Money::from_major(2_000)).unwrap();
        assert_eq!(cost, Money::from_major(2_000 + 99_000 + 990));
    }

    #[test]
    fn test_runaway_balance_is_an_error_not_a_panic() {
        // an installment of 1 against 200% a month grows the balance until decimal overflow
        let err = build_schedule(Money::from_major(i64::MAX), Rate::from_percentage(2400), 60, Money::ONE, start(), &[]).unwrap_err();
        assert!(matches!(err, EngineError::Calculation { .. }));
    }
}

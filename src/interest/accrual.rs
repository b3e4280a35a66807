use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::decimal::{round_half_up, Money, Rate, MONEY_SCALE};
use crate::interest::InterestCalculation;

/// fixed actual/365 year basis, leap years are not special-cased
pub const DAYS_IN_YEAR: i64 = 365;

/// actual calendar days from `start` to `end`, negative when reversed
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// simple interest on `principal` over `[start, end)`, half-up to cents
pub fn accrue(rate: Rate, principal: Money, start: NaiveDate, end: NaiveDate) -> Money {
    if start >= end || !principal.is_positive() {
        return Money::ZERO;
    }

    let days = Decimal::from(days_between(start, end));
    let interest =
        principal.as_decimal() * rate.as_decimal() * days / Decimal::from(DAYS_IN_YEAR);
    Money::from_decimal(round_half_up(interest, MONEY_SCALE))
}

/// same as [`accrue`] but keeps the inputs alongside the amount
pub fn calculate_interest(
    rate: Rate,
    principal: Money,
    start: NaiveDate,
    end: NaiveDate,
) -> InterestCalculation {
    let days = if start < end { days_between(start, end) } else { 0 };

    InterestCalculation {
        interest_amount: accrue(rate, principal, start, end),
        annual_rate: rate,
        days,
        principal_base: principal,
        start_date: start,
        end_date: end,
    }
}

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, Mul, Sub, SubAssign};
use std::str::FromStr;

/// number of fractional digits every amount is kept at
pub const MONEY_SCALE: u32 = 2;

/// round half-up (midpoint away from zero) to the given scale
pub fn round_half_up(d: Decimal, dp: u32) -> Decimal {
    d.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
}

/// Money type held at cent precision, rounded half-up on every operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(from = "Decimal")]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);
    pub const CENT: Money = Money(Decimal::from_parts(1, 0, 0, false, MONEY_SCALE));

    /// create from decimal
    pub fn from_decimal(d: Decimal) -> Self {
        Money(round_half_up(d, MONEY_SCALE))
    }

    /// create from string with exact parsing
    pub fn from_str_exact(s: &str) -> Result<Self, rust_decimal::Error> {
        Ok(Money::from_decimal(Decimal::from_str(s)?))
    }

    /// create from integer amount
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// create from cents
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, MONEY_SCALE))
    }

    /// get underlying decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// clamp negative balances to zero
    pub fn floor_zero(self) -> Self {
        if self.is_negative() {
            Money::ZERO
        } else {
            self
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::from_str_exact(s)
    }
}

impl From<Decimal> for Money {
    fn from(d: Decimal) -> Self {
        Money::from_decimal(d)
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, other: Money) -> Money {
        Money::from_decimal(self.0 + other.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Money) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, other: Money) -> Money {
        Money::from_decimal(self.0 - other.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Money) {
        *self = *self - other;
    }
}

impl Mul<Decimal> for Money {
    type Output = Money;

    fn mul(self, other: Decimal) -> Money {
        Money::from_decimal(self.0 * other)
    }
}

impl Div<Decimal> for Money {
    type Output = Money;

    fn div(self, other: Decimal) -> Money {
        Money::from_decimal(self.0 / other)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + x)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, |acc, x| acc + *x)
    }
}

/// annual nominal interest rate as a fraction (0.15 for 15%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);

    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// 15 -> 0.15
    pub fn from_percentage(p: u32) -> Self {
        Rate(Decimal::new(p as i64, 2))
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn as_percentage(&self) -> Decimal {
        (self.0 * Decimal::ONE_HUNDRED).normalize()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_money_rounds_half_up() {
        assert_eq!(Money::from_decimal(dec!(254.795)), Money::from_cents(25480));
        assert_eq!(Money::from_decimal(dec!(0.125)), Money::from_cents(13));
        assert_eq!(Money::from_decimal(dec!(-0.125)), Money::from_cents(-13));
        assert_eq!(Money::from_decimal(dec!(10.004)), Money::from_major(10));
    }

    #[test]
    fn test_deserialized_money_is_rounded_to_cents() {
        let money: Money = serde_json::from_str("\"100.005\"").unwrap();
        assert_eq!(money, Money::from_cents(10_001));
        assert_eq!(money.as_decimal().scale(), MONEY_SCALE);

        let json = serde_json::to_string(&money).unwrap();
        assert_eq!(json, "\"100.01\"");
    }

    #[test]
    fn test_money_display_keeps_cents() {
        assert_eq!(Money::from_major(6250).to_string(), "6250.00");
        assert_eq!(Money::from_str_exact("42.4657").unwrap().to_string(), "42.47");
    }

    #[test]
    fn test_division_into_installments() {
        let monthly = Money::from_major(10_000) / Decimal::from(3);
        assert_eq!(monthly, Money::from_cents(333_333));

        let monthly = Money::from_major(50_000) / Decimal::from(8);
        assert_eq!(monthly.to_string(), "6250.00");
    }

    #[test]
    fn test_floor_zero_and_sum() {
        let balance = Money::from_major(100) - Money::from_major(250);
        assert!(balance.is_negative());
        assert_eq!(balance.floor_zero(), Money::ZERO);

        let total: Money = [Money::from_cents(1), Money::from_cents(2), Money::CENT]
            .iter()
            .sum();
        assert_eq!(total, Money::from_cents(4));
    }

    #[test]
    fn test_rate_constructors() {
        assert_eq!(Rate::from_percentage(15), Rate::from_decimal(dec!(0.15)));
        assert_eq!(Rate::from_decimal(dec!(0.15)).to_string(), "15%");
        assert!(!Rate::ZERO.is_positive());
    }
}

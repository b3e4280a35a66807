use chrono::NaiveDate;

use crate::decimal::Money;
use crate::interest::{accrue, capitalize_interest};
use crate::loan::Loan;

/// one replayed settlement
#[derive(Debug, Clone, PartialEq)]
pub struct ReplayStep {
    pub paid_date: NaiveDate,
    pub amount: Money,
    pub accrued_interest: Money,
    /// principal after applying the payment
    pub principal: Money,
    /// unpaid interest that was added onto principal
    pub capitalized: Money,
}

/// outstanding balance breakdown as of a date
#[derive(Debug, Clone, PartialEq)]
pub struct RemainingDebt {
    pub as_of: NaiveDate,
    pub principal: Money,
    pub accrued_interest: Money,
    pub steps: Vec<ReplayStep>,
}

impl RemainingDebt {
    pub fn total(&self) -> Money {
        self.principal + self.accrued_interest
    }
}

/// replay paid installments in payment order against simple daily accrual
pub fn replay_remaining_debt(loan: &Loan, today: NaiveDate) -> RemainingDebt {
    let mut paid: Vec<(NaiveDate, Money)> = loan
        .payments
        .iter()
        .filter(|p| p.is_paid())
        .filter_map(|p| p.paid_date.map(|d| (d, p.amount)))
        .collect();
    paid.sort_by_key(|(date, _)| *date);

    let mut principal = loan.principal;
    let mut cursor = loan.start_date;
    let mut steps = Vec::with_capacity(paid.len());

    for (paid_date, amount) in paid {
        let interest = accrue(loan.interest_rate, principal, cursor, paid_date);
        let mut capitalized = Money::ZERO;

        if amount >= interest {
            principal -= amount - interest;
        } else {
            let result = capitalize_interest(principal, interest - amount, paid_date);
            capitalized = result.amount_capitalized;
            principal = result.new_principal;
        }
        principal = principal.floor_zero();
        // a payment dated before the cursor accrues nothing and leaves the cursor alone
        cursor = cursor.max(paid_date);

        steps.push(ReplayStep {
            paid_date,
            amount,
            accrued_interest: interest,
            principal,
            capitalized,
        });
    }

    RemainingDebt {
        as_of: today,
        principal,
        accrued_interest: accrue(loan.interest_rate, principal, cursor, today),
        steps,
    }
}

/// principal plus interest accrued since the last settlement
pub fn calculate_remaining_debt(loan: &Loan, today: NaiveDate) -> Money {
    replay_remaining_debt(loan, today).total()
}

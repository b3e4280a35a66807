pub mod accrual;

use chrono::NaiveDate;

use crate::decimal::{Money, Rate};

pub use accrual::{accrue, calculate_interest, days_between, DAYS_IN_YEAR};

/// interest calculation result
#[derive(Debug, Clone, PartialEq)]
pub struct InterestCalculation {
    pub interest_amount: Money,
    pub annual_rate: Rate,
    pub days: i64,
    pub principal_base: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// unpaid interest folded into principal
#[derive(Debug, Clone, PartialEq)]
pub struct CapitalizationResult {
    pub amount_capitalized: Money,
    pub new_principal: Money,
    pub date: NaiveDate,
}

/// capitalize accrued interest into principal
pub fn capitalize_interest(
    principal: Money,
    unpaid_interest: Money,
    date: NaiveDate,
) -> CapitalizationResult {
    CapitalizationResult {
        amount_capitalized: unpaid_interest,
        new_principal: principal + unpaid_interest,
        date,
    }
}

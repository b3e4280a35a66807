use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::config::{LendingConfig, MAX_TERM_MONTHS, MIN_TERM_MONTHS};
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::types::{LoanId, LoanStatus, PartyId, PaymentId, PaymentType};

/// add calendar months, clamping to the end of shorter months
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months))
        .ok_or_else(|| LendingError::InvalidDate {
            message: format!("{} + {} months is out of range", date, months),
        })
}

/// request to open a loan, validated before anything is built from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanApplication {
    pub creditor: PartyId,
    pub debtor: PartyId,
    pub amount: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
}

impl LoanApplication {
    pub fn validate(&self, config: &LendingConfig) -> Result<()> {
        if self.creditor.is_nil() {
            return Err(LendingError::MissingReference { field: "creditor" });
        }
        if self.debtor.is_nil() {
            return Err(LendingError::MissingReference { field: "debtor" });
        }
        if !self.amount.is_positive() {
            return Err(LendingError::InvalidAmount { amount: self.amount });
        }
        if !self.interest_rate.is_positive() {
            return Err(LendingError::InvalidInterestRate {
                rate: self.interest_rate,
            });
        }
        // configured bounds can only narrow the 1..=12 month range
        let min = config.min_term_months.max(MIN_TERM_MONTHS);
        let max = config.max_term_months.min(MAX_TERM_MONTHS);
        if self.term_months < min || self.term_months > max {
            return Err(LendingError::InvalidTerm {
                term: self.term_months,
                min,
                max,
            });
        }
        Ok(())
    }
}

/// one scheduled installment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: Option<PaymentId>,
    pub loan_id: Option<LoanId>,
    pub due_date: NaiveDate,
    pub paid_date: Option<NaiveDate>,
    pub amount: Money,
    pub payment_type: PaymentType,
}

impl Payment {
    /// new unpaid installment
    pub fn pending(loan_id: Option<LoanId>, due_date: NaiveDate, amount: Money) -> Self {
        Self {
            id: None,
            loan_id,
            due_date,
            paid_date: None,
            amount,
            payment_type: PaymentType::Pending,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.payment_type == PaymentType::Paid
    }

    pub fn is_pending(&self) -> bool {
        self.payment_type == PaymentType::Pending
    }

    /// settled after its due date
    pub fn was_paid_late(&self) -> bool {
        self.paid_date.map_or(false, |paid| paid > self.due_date)
    }
}

/// loan snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loan {
    pub id: Option<LoanId>,
    pub creditor: PartyId,
    pub debtor: PartyId,
    pub principal: Money,
    pub interest_rate: Rate,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub term_months: u32,
    pub status: LoanStatus,
    pub payments: Vec<Payment>,
}

impl Loan {
    /// build an active loan starting on `start_date`, without a schedule
    pub fn originate(application: &LoanApplication, start_date: NaiveDate) -> Result<Self> {
        let end_date = add_months(start_date, application.term_months)?;

        Ok(Self {
            id: None,
            creditor: application.creditor,
            debtor: application.debtor,
            principal: application.amount,
            interest_rate: application.interest_rate,
            start_date,
            end_date,
            term_months: application.term_months,
            status: LoanStatus::Active,
            payments: Vec::new(),
        })
    }

    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    pub fn paid_count(&self) -> usize {
        self.payments.iter().filter(|p| p.is_paid()).count()
    }

    pub fn pending_count(&self) -> usize {
        self.payments.iter().filter(|p| p.is_pending()).count()
    }

    /// sum of the amounts still scheduled, ignoring interest drift
    pub fn pending_total(&self) -> Money {
        self.payments
            .iter()
            .filter(|p| p.is_pending())
            .map(|p| p.amount)
            .sum()
    }

    /// latest settlement date, or the start date when nothing is paid yet
    pub fn last_settlement_date(&self) -> NaiveDate {
        self.payments
            .iter()
            .filter_map(|p| p.paid_date)
            .max()
            .unwrap_or(self.start_date)
    }

    /// next unpaid installment by due date
    pub fn next_due(&self) -> Option<&Payment> {
        self.payments
            .iter()
            .filter(|p| p.is_pending())
            .min_by_key(|p| p.due_date)
    }

    pub fn find_payment(&self, id: PaymentId) -> Option<usize> {
        self.payments.iter().position(|p| p.id == Some(id))
    }
}

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::config::{LendingConfig, MAX_TERM_MONTHS, MIN_TERM_MONTHS};
use crate::decimal::{Money, Rate};
use crate::errors::{LendingError, Result};
use crate::interest::accrue;
use crate::loan::{add_months, Loan, Payment};
use crate::types::LoanId;

/// installment in a differentiated schedule
#[derive(Debug, Clone, PartialEq)]
pub struct ScheduledInstallment {
    pub number: u32,
    pub due_date: NaiveDate,
    pub beginning_balance: Money,
    pub principal_portion: Money,
    pub interest_portion: Money,
    pub amount: Money,
    pub ending_balance: Money,
}

/// amortization schedule
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    pub loan_id: Option<LoanId>,
    pub principal: Money,
    pub interest_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
    pub installments: Vec<ScheduledInstallment>,
    pub total_interest: Money,
    pub total_payment: Money,
}

impl AmortizationSchedule {
    /// get installment by 1-based number
    pub fn get_installment(&self, number: u32) -> Option<&ScheduledInstallment> {
        number
            .checked_sub(1)
            .and_then(|i| self.installments.get(i as usize))
    }

    pub fn total_principal(&self) -> Money {
        self.installments.iter().map(|i| i.principal_portion).sum()
    }

    /// pending payments in due date order, ready to be saved
    pub fn payments(&self) -> Vec<Payment> {
        self.installments
            .iter()
            .map(|i| Payment::pending(self.loan_id, i.due_date, i.amount))
            .collect()
    }
}

/// equal principal portion per installment, half-up to cents
pub fn monthly_principal(principal: Money, term_months: u32) -> Result<Money> {
    if term_months == 0 {
        return Err(LendingError::InvalidTerm {
            term: term_months,
            min: MIN_TERM_MONTHS,
            max: MAX_TERM_MONTHS,
        });
    }
    Ok(principal / Decimal::from(term_months))
}

/// builds differentiated (declining balance) schedules
#[derive(Debug, Clone, Default)]
pub struct AmortizationScheduler {
    reconcile_final_installment: bool,
}

impl AmortizationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &LendingConfig) -> Self {
        Self {
            reconcile_final_installment: config.reconcile_final_installment,
        }
    }

    /// absorb principal rounding drift into the last installment
    pub fn with_reconciliation(mut self, enabled: bool) -> Self {
        self.reconcile_final_installment = enabled;
        self
    }

    /// generate the full schedule for a freshly originated loan
    pub fn generate(&self, loan: &Loan) -> Result<AmortizationSchedule> {
        let term = loan.term_months;
        let monthly = monthly_principal(loan.principal, term)?;

        let mut installments = Vec::with_capacity(term as usize);
        let mut remaining = loan.principal;
        let mut previous_date = loan.start_date;

        for number in 1..=term {
            let due_date = add_months(loan.start_date, number)?;
            let principal_portion = if self.reconcile_final_installment && number == term {
                remaining.floor_zero()
            } else {
                monthly
            };

            let interest = accrue(loan.interest_rate, remaining, previous_date, due_date);
            let ending_balance = (remaining - principal_portion).floor_zero();

            installments.push(ScheduledInstallment {
                number,
                due_date,
                beginning_balance: remaining,
                principal_portion,
                interest_portion: interest,
                amount: principal_portion + interest,
                ending_balance,
            });

            remaining = ending_balance;
            previous_date = due_date;
        }

        let total_interest = installments.iter().map(|i| i.interest_portion).sum();
        let total_payment = installments.iter().map(|i| i.amount).sum();

        Ok(AmortizationSchedule {
            loan_id: loan.id,
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            term_months: term,
            start_date: loan.start_date,
            installments,
            total_interest,
            total_payment,
        })
    }

    /// generate and convert straight into pending payments
    pub fn generate_payments(&self, loan: &Loan) -> Result<Vec<Payment>> {
        Ok(self.generate(loan)?.payments())
    }
}

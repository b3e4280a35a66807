use std::collections::HashMap;

use uuid::Uuid;

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::limits;
use crate::loan::{Loan, Payment};
use crate::types::{LoanId, LoanStatus, PartyId};

/// persistence collaborator the loan book reads from and writes to
pub trait LoanRepository {
    /// store a new loan and assign its identity
    fn save_loan(&mut self, loan: Loan) -> Result<Loan>;

    /// store a new payment for an already saved loan and assign its identity
    fn save_payment(&mut self, payment: Payment) -> Result<Payment>;

    fn update_loan(&mut self, loan: &Loan) -> Result<()>;

    fn update_payment(&mut self, payment: &Payment) -> Result<()>;

    fn find_loan(&self, id: LoanId) -> Result<Option<Loan>>;

    fn find_active_loans_by_debtor(&self, debtor: PartyId) -> Result<Vec<Loan>>;

    fn find_loans_by_creditor(&self, creditor: PartyId) -> Result<Vec<Loan>>;

    fn find_loans_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>>;

    fn sum_active_principal_by_debtor(&self, debtor: PartyId) -> Result<Money>;

    fn has_defaulted_loan(&self, debtor: PartyId) -> Result<bool>;
}

/// map-backed repository for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryLoanRepository {
    loans: HashMap<LoanId, Loan>,
    // saved loans in insertion order, keeps query results stable
    order: Vec<LoanId>,
}

impl InMemoryLoanRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.loans.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loans.is_empty()
    }

    fn all(&self) -> impl Iterator<Item = &Loan> {
        self.order.iter().filter_map(|id| self.loans.get(id))
    }

    fn select<F>(&self, predicate: F) -> Vec<Loan>
    where
        F: Fn(&Loan) -> bool,
    {
        self.all().filter(|&l| predicate(l)).cloned().collect()
    }

    fn stored_mut(&mut self, id: Option<LoanId>) -> Result<&mut Loan> {
        let id = id.ok_or(LendingError::MissingReference { field: "loan_id" })?;
        self.loans
            .get_mut(&id)
            .ok_or(LendingError::LoanNotFound { id })
    }
}

impl LoanRepository for InMemoryLoanRepository {
    fn save_loan(&mut self, mut loan: Loan) -> Result<Loan> {
        let id = *loan.id.get_or_insert_with(Uuid::new_v4);
        if self.loans.contains_key(&id) {
            return Err(LendingError::Repository {
                message: format!("loan {} already saved", id),
            });
        }

        for payment in loan.payments.iter_mut() {
            payment.loan_id = Some(id);
            payment.id.get_or_insert_with(Uuid::new_v4);
        }

        self.order.push(id);
        self.loans.insert(id, loan.clone());
        Ok(loan)
    }

    fn save_payment(&mut self, mut payment: Payment) -> Result<Payment> {
        let loan = self.stored_mut(payment.loan_id)?;
        let id = *payment.id.get_or_insert_with(Uuid::new_v4);

        if loan.payments.iter().any(|p| p.id == Some(id)) {
            return Err(LendingError::Repository {
                message: format!("payment {} already saved", id),
            });
        }
        loan.payments.push(payment.clone());
        Ok(payment)
    }

    fn update_loan(&mut self, loan: &Loan) -> Result<()> {
        let stored = self.stored_mut(loan.id)?;
        *stored = loan.clone();
        Ok(())
    }

    fn update_payment(&mut self, payment: &Payment) -> Result<()> {
        let id = payment.id.ok_or(LendingError::MissingReference { field: "payment_id" })?;
        let loan = self.stored_mut(payment.loan_id)?;
        let stored = loan
            .payments
            .iter_mut()
            .find(|p| p.id == Some(id))
            .ok_or(LendingError::PaymentNotFound { id })?;
        *stored = payment.clone();
        Ok(())
    }

    fn find_loan(&self, id: LoanId) -> Result<Option<Loan>> {
        Ok(self.loans.get(&id).cloned())
    }

    fn find_active_loans_by_debtor(&self, debtor: PartyId) -> Result<Vec<Loan>> {
        Ok(self.select(|l| l.debtor == debtor && l.status == LoanStatus::Active))
    }

    fn find_loans_by_creditor(&self, creditor: PartyId) -> Result<Vec<Loan>> {
        Ok(self.select(|l| l.creditor == creditor))
    }

    fn find_loans_by_status(&self, status: LoanStatus) -> Result<Vec<Loan>> {
        Ok(self.select(|l| l.status == status))
    }

    fn sum_active_principal_by_debtor(&self, debtor: PartyId) -> Result<Money> {
        Ok(limits::sum_active_principal(self.all(), debtor))
    }

    fn has_defaulted_loan(&self, debtor: PartyId) -> Result<bool> {
        Ok(limits::has_defaulted_loan(self.all(), debtor))
    }
}

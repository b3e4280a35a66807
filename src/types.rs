use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// unique identifier for a loan, assigned by the repository
pub type LoanId = Uuid;

/// unique identifier for a scheduled payment, assigned by the repository
pub type PaymentId = Uuid;

/// opaque reference to a creditor or debtor
pub type PartyId = Uuid;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    /// performing, installments outstanding
    Active,
    /// fully paid off, terminal
    Repaid,
    /// past its end date without being repaid
    Defaulted,
}

impl LoanStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoanStatus::Repaid)
    }
}

/// installment settlement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentType {
    Pending,
    Paid,
}

/// how the overdue sweep transitions loans
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SweepMode {
    /// stop after the first overdue loan; callers repeat the sweep
    FirstOnly,
    /// default every overdue loan in one pass
    All,
}

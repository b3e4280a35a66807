use chrono::NaiveDate;
use thiserror::Error;
use uuid::Uuid;

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus};

/// broad classification of failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// bad input, raised before any mutation
    Validation,
    /// caller logic error against the loan state machine
    State,
    /// expected business rejection of a new loan
    LimitExceeded,
    /// raised by the persistence collaborator
    Repository,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LendingError {
    #[error("invalid loan amount: {amount}")]
    InvalidAmount {
        amount: Money,
    },

    #[error("invalid interest rate: {rate}")]
    InvalidInterestRate {
        rate: Rate,
    },

    #[error("invalid term: {term} months, expected {min}..={max}")]
    InvalidTerm {
        term: u32,
        min: u32,
        max: u32,
    },

    #[error("missing required reference: {field}")]
    MissingReference {
        field: &'static str,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("no installment at position {index}, loan has {count}")]
    InstallmentNotFound {
        index: usize,
        count: usize,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },

    #[error("loan is repaid, status cannot change to {requested:?}")]
    LoanAlreadyRepaid {
        requested: LoanStatus,
    },

    #[error("cannot close loan with {pending} unpaid installments")]
    PendingInstallments {
        pending: usize,
    },

    #[error("installment due {due_date} was already paid on {paid_date}")]
    PaymentAlreadySettled {
        due_date: NaiveDate,
        paid_date: NaiveDate,
    },

    #[error("debt ceiling reached: outstanding {outstanding}, ceiling {ceiling}")]
    DebtCeilingReached {
        outstanding: Money,
        ceiling: Money,
    },

    #[error("debtor {debtor} has a defaulted loan")]
    ExistingDefault {
        debtor: Uuid,
    },

    #[error("loan not found: {id}")]
    LoanNotFound {
        id: LoanId,
    },

    #[error("payment not found: {id}")]
    PaymentNotFound {
        id: Uuid,
    },

    #[error("repository error: {message}")]
    Repository {
        message: String,
    },
}

impl LendingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LendingError::InvalidAmount { .. }
            | LendingError::InvalidInterestRate { .. }
            | LendingError::InvalidTerm { .. }
            | LendingError::MissingReference { .. }
            | LendingError::InvalidDate { .. }
            | LendingError::InstallmentNotFound { .. }
            | LendingError::InvalidConfiguration { .. } => ErrorKind::Validation,
            LendingError::LoanAlreadyRepaid { .. }
            | LendingError::PendingInstallments { .. }
            | LendingError::PaymentAlreadySettled { .. } => ErrorKind::State,
            LendingError::DebtCeilingReached { .. } | LendingError::ExistingDefault { .. } => {
                ErrorKind::LimitExceeded
            }
            LendingError::LoanNotFound { .. }
            | LendingError::PaymentNotFound { .. }
            | LendingError::Repository { .. } => ErrorKind::Repository,
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_state(&self) -> bool {
        self.kind() == ErrorKind::State
    }

    pub fn is_limit_exceeded(&self) -> bool {
        self.kind() == ErrorKind::LimitExceeded
    }
}

pub type Result<T> = std::result::Result<T, LendingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        let err = LendingError::InvalidTerm { term: 13, min: 1, max: 12 };
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "invalid term: 13 months, expected 1..=12");

        let err = LendingError::PendingInstallments { pending: 3 };
        assert!(err.is_state());

        let err = LendingError::DebtCeilingReached {
            outstanding: Money::from_major(70_000),
            ceiling: Money::from_major(50_000),
        };
        assert!(err.is_limit_exceeded());
        assert_eq!(
            err.to_string(),
            "debt ceiling reached: outstanding 70000.00, ceiling 50000.00"
        );

        let err = LendingError::LoanNotFound { id: Uuid::nil() };
        assert_eq!(err.kind(), ErrorKind::Repository);
    }
}

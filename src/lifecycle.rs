use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::LendingConfig;
use crate::errors::{LendingError, Result};
use crate::loan::Loan;
use crate::types::{LoanId, LoanStatus, SweepMode};

/// record of one status change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusTransition {
    pub loan_id: Option<LoanId>,
    pub old_status: LoanStatus,
    pub new_status: LoanStatus,
    pub date: NaiveDate,
    /// previous end date when the transition rewrote it
    pub previous_end_date: Option<NaiveDate>,
}

/// Active -> Repaid | Defaulted state machine. Repaid is terminal.
#[derive(Debug, Clone)]
pub struct LifecycleManager {
    sweep_mode: SweepMode,
}

impl Default for LifecycleManager {
    fn default() -> Self {
        Self {
            sweep_mode: SweepMode::All,
        }
    }
}

impl LifecycleManager {
    pub fn new(sweep_mode: SweepMode) -> Self {
        Self { sweep_mode }
    }

    pub fn from_config(config: &LendingConfig) -> Self {
        Self::new(config.overdue_sweep)
    }

    pub fn sweep_mode(&self) -> SweepMode {
        self.sweep_mode
    }

    /// move `loan` to `new_status`; repaying also stamps `today` as the end date
    pub fn update_status(
        &self,
        loan: &mut Loan,
        new_status: LoanStatus,
        today: NaiveDate,
    ) -> Result<StatusTransition> {
        if loan.status.is_terminal() {
            warn!(loan_id = ?loan.id, requested = ?new_status, "status change on repaid loan");
            return Err(LendingError::LoanAlreadyRepaid {
                requested: new_status,
            });
        }

        let old_status = loan.status;
        loan.status = new_status;

        let previous_end_date = if new_status == LoanStatus::Repaid {
            let previous = loan.end_date;
            loan.end_date = today;
            Some(previous)
        } else {
            None
        };

        debug!(loan_id = ?loan.id, from = ?old_status, to = ?new_status, "loan status changed");

        Ok(StatusTransition {
            loan_id: loan.id,
            old_status,
            new_status,
            date: today,
            previous_end_date,
        })
    }

    /// repay the loan once every installment is paid
    pub fn close_loan(&self, loan: &mut Loan, today: NaiveDate) -> Result<StatusTransition> {
        let pending = loan.pending_count();
        if pending > 0 {
            warn!(loan_id = ?loan.id, pending, "cannot close loan with unpaid installments");
            return Err(LendingError::PendingInstallments { pending });
        }
        self.update_status(loan, LoanStatus::Repaid, today)
    }

    /// active and past its end date
    pub fn is_overdue(&self, loan: &Loan, today: NaiveDate) -> bool {
        loan.status == LoanStatus::Active && loan.end_date < today
    }

    /// default the loan if it is overdue, reporting whether it was
    pub fn check_overdue(&self, loan: &mut Loan, today: NaiveDate) -> Result<bool> {
        if !self.is_overdue(loan, today) {
            return Ok(false);
        }
        self.update_status(loan, LoanStatus::Defaulted, today)?;
        Ok(true)
    }

    /// default overdue loans; with `SweepMode::FirstOnly` stop after the first one
    pub fn sweep_overdue(
        &self,
        loans: &mut [Loan],
        today: NaiveDate,
    ) -> Result<Vec<StatusTransition>> {
        let mut transitions = Vec::new();

        for loan in loans.iter_mut() {
            if !self.is_overdue(loan, today) {
                continue;
            }
            transitions.push(self.update_status(loan, LoanStatus::Defaulted, today)?);
            if self.sweep_mode == SweepMode::FirstOnly {
                break;
            }
        }

        if !transitions.is_empty() {
            info!(%today, defaulted = transitions.len(), "overdue sweep defaulted loans");
        }
        Ok(transitions)
    }
}

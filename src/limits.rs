use tracing::debug;

use crate::config::LendingConfig;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::loan::Loan;
use crate::types::{LoanStatus, PartyId};

/// borrowing ceiling per debtor
#[derive(Debug, Clone)]
pub struct DebtLimitPolicy {
    ceiling: Money,
}

impl Default for DebtLimitPolicy {
    fn default() -> Self {
        Self::from_config(&LendingConfig::default())
    }
}

impl DebtLimitPolicy {
    pub fn new(ceiling: Money) -> Self {
        Self { ceiling }
    }

    pub fn from_config(config: &LendingConfig) -> Self {
        Self::new(config.debt_ceiling)
    }

    pub fn ceiling(&self) -> Money {
        self.ceiling
    }

    /// false once the active principal reaches the ceiling or any loan defaulted
    pub fn can_debtor_take_new_loan(
        &self,
        debtor: PartyId,
        active_loan_sum: Money,
        has_defaulted_loan: bool,
    ) -> bool {
        self.ensure_eligible(debtor, active_loan_sum, has_defaulted_loan)
            .is_ok()
    }

    /// same rule as [`Self::can_debtor_take_new_loan`], naming the reason on rejection
    pub fn ensure_eligible(
        &self,
        debtor: PartyId,
        active_loan_sum: Money,
        has_defaulted_loan: bool,
    ) -> Result<()> {
        if active_loan_sum >= self.ceiling {
            debug!(%debtor, outstanding = %active_loan_sum, ceiling = %self.ceiling, "debt ceiling reached");
            return Err(LendingError::DebtCeilingReached {
                outstanding: active_loan_sum,
                ceiling: self.ceiling,
            });
        }
        if has_defaulted_loan {
            debug!(%debtor, "debtor has a defaulted loan");
            return Err(LendingError::ExistingDefault { debtor });
        }
        Ok(())
    }
}

/// principal across the debtor's active loans
pub fn sum_active_principal<'a, I>(loans: I, debtor: PartyId) -> Money
where
    I: IntoIterator<Item = &'a Loan>,
{
    loans
        .into_iter()
        .filter(|l| l.debtor == debtor && l.status == LoanStatus::Active)
        .map(|l| l.principal)
        .sum()
}

/// whether any of the debtor's loans defaulted
pub fn has_defaulted_loan<'a, I>(loans: I, debtor: PartyId) -> bool
where
    I: IntoIterator<Item = &'a Loan>,
{
    loans
        .into_iter()
        .any(|l| l.debtor == debtor && l.status == LoanStatus::Defaulted)
}

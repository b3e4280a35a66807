use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::loan::Loan;
use crate::payments::amortization::monthly_principal;
use crate::payments::recalculation::{recalculate, RecalculationOutcome};
use crate::types::PaymentType;

/// what happened when an installment was paid
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub index: usize,
    pub due_date: NaiveDate,
    pub paid_date: NaiveDate,
    pub amount: Money,
    pub days_late: i64,
    /// present when the payment was late and the remaining schedule was re-derived
    pub recalculation: Option<RecalculationOutcome>,
}

impl Settlement {
    pub fn was_late(&self) -> bool {
        self.days_late > 0
    }
}

/// mark the installment at `index` as paid on `paid_date`
pub fn settle_installment(loan: &mut Loan, index: usize, paid_date: NaiveDate) -> Result<Settlement> {
    let count = loan.payments.len();
    let payment = loan
        .payments
        .get(index)
        .ok_or(LendingError::InstallmentNotFound { index, count })?;

    if payment.is_paid() {
        warn!(
            loan_id = ?loan.id,
            due_date = %payment.due_date,
            "rejected second settlement of a paid installment"
        );
        return Err(LendingError::PaymentAlreadySettled {
            due_date: payment.due_date,
            paid_date: payment.paid_date.unwrap_or(paid_date),
        });
    }

    let due_date = payment.due_date;
    let amount = payment.amount;
    let late = paid_date > due_date;
    if late {
        // recalculation must not fail after the installment is marked paid
        monthly_principal(loan.principal, loan.term_months)?;
    }

    let payment = &mut loan.payments[index];
    payment.payment_type = PaymentType::Paid;
    payment.paid_date = Some(paid_date);

    let days_late = (paid_date - due_date).num_days().max(0);

    debug!(loan_id = ?loan.id, %due_date, %paid_date, %amount, "installment settled");

    let recalculation = if late { Some(recalculate(loan)?) } else { None };

    Ok(Settlement {
        index,
        due_date,
        paid_date,
        amount,
        days_late,
        recalculation,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::loan::LoanApplication;
    use crate::payments::AmortizationScheduler;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduled_loan() -> Loan {
        let application = LoanApplication {
            creditor: Uuid::new_v4(),
            debtor: Uuid::new_v4(),
            amount: Money::from_major(20_000),
            interest_rate: Rate::from_decimal(dec!(0.15)),
            term_months: 4,
        };
        let mut loan = Loan::originate(&application, date(2024, 1, 15)).unwrap();
        loan.payments = AmortizationScheduler::new().generate_payments(&loan).unwrap();
        loan
    }

    #[test]
    fn test_on_time_settlement_keeps_schedule() {
        let mut loan = scheduled_loan();
        let before: Vec<Money> = loan.payments.iter().map(|p| p.amount).collect();

        let settlement = settle_installment(&mut loan, 0, date(2024, 2, 10)).unwrap();

        assert!(!settlement.was_late());
        assert!(settlement.recalculation.is_none());
        assert_eq!(loan.payments[0].payment_type, PaymentType::Paid);
        assert_eq!(loan.payments[0].paid_date, Some(date(2024, 2, 10)));

        let after: Vec<Money> = loan.payments.iter().map(|p| p.amount).collect();
        assert_eq!(after, before);
    }

    #[test]
    fn test_late_settlement_recalculates() {
        let mut loan = scheduled_loan();

        let settlement = settle_installment(&mut loan, 0, date(2024, 2, 25)).unwrap();

        assert_eq!(settlement.days_late, 10);
        let outcome = settlement.recalculation.unwrap();
        assert_eq!(outcome.adjusted.len(), 3);
        assert_eq!(loan.payments[1].amount, Money::from_cents(511_712));
    }

    #[test]
    fn test_paying_twice_is_a_state_error() {
        let mut loan = scheduled_loan();
        settle_installment(&mut loan, 1, date(2024, 3, 15)).unwrap();

        let err = settle_installment(&mut loan, 1, date(2024, 3, 20)).unwrap_err();
        assert!(err.is_state());
        assert_eq!(loan.payments[1].paid_date, Some(date(2024, 3, 15)));
    }

    #[test]
    fn test_unknown_index() {
        let mut loan = scheduled_loan();
        let err = settle_installment(&mut loan, 4, date(2024, 3, 20)).unwrap_err();
        assert_eq!(err, LendingError::InstallmentNotFound { index: 4, count: 4 });
    }

    #[test]
    fn test_failed_late_settlement_leaves_installment_pending() {
        let mut loan = scheduled_loan();
        // hand-built snapshot with no term to spread principal over
        loan.term_months = 0;

        let err = settle_installment(&mut loan, 0, date(2024, 2, 25)).unwrap_err();
        assert!(matches!(err, LendingError::InvalidTerm { term: 0, .. }));
        assert!(loan.payments[0].is_pending());
        assert_eq!(loan.payments[0].paid_date, None);
        assert_eq!(loan.payments[1].amount, Money::from_cents(517_877));
    }
}

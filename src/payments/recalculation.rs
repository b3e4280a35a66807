use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::decimal::Money;
use crate::errors::Result;
use crate::interest::accrue;
use crate::loan::Loan;
use crate::payments::amortization::monthly_principal;

/// amount change applied to one pending installment
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedInstallment {
    /// position in `Loan::payments`
    pub index: usize,
    pub due_date: NaiveDate,
    pub old_amount: Money,
    pub new_amount: Money,
}

/// result of a recalculation pass
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecalculationOutcome {
    pub settlement_date: Option<NaiveDate>,
    pub remaining_principal: Money,
    pub adjusted: Vec<AdjustedInstallment>,
}

impl RecalculationOutcome {
    /// pending installments whose amount actually moved
    pub fn changed(&self) -> impl Iterator<Item = &AdjustedInstallment> {
        self.adjusted.iter().filter(|a| a.old_amount != a.new_amount)
    }
}

/// re-derive the amounts of every pending installment from the last settlement onward.
///
/// The walk is a fold over installment order, so running it again on an unchanged
/// payment set reproduces the same amounts.
pub fn recalculate(loan: &mut Loan) -> Result<RecalculationOutcome> {
    let mut pending: Vec<usize> = loan
        .payments
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_pending())
        .map(|(i, _)| i)
        .collect();

    if pending.is_empty() {
        return Ok(RecalculationOutcome::default());
    }
    pending.sort_by_key(|&i| loan.payments[i].due_date);

    let monthly = monthly_principal(loan.principal, loan.term_months)?;
    let settlement_date = loan.last_settlement_date();
    let paid = Decimal::from(loan.paid_count() as u64);
    let mut remaining = (loan.principal - monthly * paid).floor_zero();
    let remaining_at_start = remaining;
    let mut cursor = settlement_date;

    let mut adjusted = Vec::with_capacity(pending.len());
    for index in pending {
        let payment = &mut loan.payments[index];
        let interest = accrue(loan.interest_rate, remaining, cursor, payment.due_date);
        let new_amount = monthly + interest;

        adjusted.push(AdjustedInstallment {
            index,
            due_date: payment.due_date,
            old_amount: payment.amount,
            new_amount,
        });
        payment.amount = new_amount;

        remaining = (remaining - monthly).floor_zero();
        cursor = payment.due_date;
    }

    debug!(
        loan_id = ?loan.id,
        %settlement_date,
        installments = adjusted.len(),
        "recalculated pending installments"
    );

    Ok(RecalculationOutcome {
        settlement_date: Some(settlement_date),
        remaining_principal: remaining_at_start,
        adjusted,
    })
}

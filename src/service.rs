use chrono::{Datelike, Days, NaiveDate};
use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::config::LendingConfig;
use crate::debt::calculate_remaining_debt;
use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::events::{Event, EventStore};
use crate::lifecycle::{LifecycleManager, StatusTransition};
use crate::limits::DebtLimitPolicy;
use crate::loan::{Loan, LoanApplication};
use crate::payments::{settle_installment, AmortizationScheduler, Settlement};
use crate::repository::LoanRepository;
use crate::types::{LoanId, LoanStatus, PartyId, PaymentId};

/// calendar date the provider currently reports
fn today(time: &SafeTimeProvider) -> NaiveDate {
    time.now().date_naive()
}

/// loan operations wired to a repository. "today" always comes from the
/// time provider passed into each call.
pub struct LoanBook<R: LoanRepository> {
    repository: R,
    config: LendingConfig,
    scheduler: AmortizationScheduler,
    lifecycle: LifecycleManager,
    limits: DebtLimitPolicy,
    events: EventStore,
}

impl<R: LoanRepository> LoanBook<R> {
    pub fn new(repository: R, config: LendingConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            scheduler: AmortizationScheduler::from_config(&config),
            lifecycle: LifecycleManager::from_config(&config),
            limits: DebtLimitPolicy::from_config(&config),
            repository,
            config,
            events: EventStore::new(),
        })
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn config(&self) -> &LendingConfig {
        &self.config
    }

    pub fn events(&self) -> &EventStore {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn load(&self, id: LoanId) -> Result<Loan> {
        self.repository
            .find_loan(id)?
            .ok_or(LendingError::LoanNotFound { id })
    }

    /// validate, gate on the debt limit, then persist the loan and its schedule
    pub fn create_loan(
        &mut self,
        application: LoanApplication,
        time: &SafeTimeProvider,
    ) -> Result<Loan> {
        application.validate(&self.config)?;

        let debtor = application.debtor;
        let outstanding = self.repository.sum_active_principal_by_debtor(debtor)?;
        let has_default = self.repository.has_defaulted_loan(debtor)?;
        if let Err(err) = self.limits.ensure_eligible(debtor, outstanding, has_default) {
            warn!(%debtor, requested = %application.amount, reason = %err, "loan application declined");
            self.events.emit(Event::ApplicationDeclined {
                debtor,
                requested: application.amount,
                reason: err.to_string(),
            });
            return Err(err);
        }

        let loan = Loan::originate(&application, today(time))?;
        let mut loan = self.repository.save_loan(loan)?;
        let loan_id = loan.id.ok_or(LendingError::Repository {
            message: "saved loan has no identity".to_string(),
        })?;

        let schedule = self.scheduler.generate(&loan)?;
        for payment in schedule.payments() {
            let saved = self.repository.save_payment(payment)?;
            loan.payments.push(saved);
        }

        info!(
            %loan_id,
            %debtor,
            principal = %loan.principal,
            term = loan.term_months,
            "loan originated"
        );
        self.events.emit(Event::LoanOriginated {
            loan_id,
            creditor: loan.creditor,
            debtor,
            principal: loan.principal,
            interest_rate: loan.interest_rate,
            term_months: loan.term_months,
            start_date: loan.start_date,
        });
        self.events.emit(Event::ScheduleGenerated {
            loan_id,
            installments: loan.term_months,
            total_interest: schedule.total_interest,
            total_payment: schedule.total_payment,
        });

        Ok(loan)
    }

    pub fn can_debtor_take_new_loan(&self, debtor: PartyId) -> Result<bool> {
        let outstanding = self.repository.sum_active_principal_by_debtor(debtor)?;
        let has_default = self.repository.has_defaulted_loan(debtor)?;
        Ok(self
            .limits
            .can_debtor_take_new_loan(debtor, outstanding, has_default))
    }

    /// settle one installment today, re-deriving the rest of the schedule when late
    pub fn pay_payment(
        &mut self,
        loan_id: LoanId,
        payment_id: PaymentId,
        time: &SafeTimeProvider,
    ) -> Result<Settlement> {
        let mut loan = self.load(loan_id)?;
        let index = loan
            .find_payment(payment_id)
            .ok_or(LendingError::PaymentNotFound { id: payment_id })?;

        let settlement = settle_installment(&mut loan, index, today(time))?;
        self.repository.update_payment(&loan.payments[index])?;

        self.events.emit(Event::PaymentSettled {
            loan_id,
            payment_id: Some(payment_id),
            amount: settlement.amount,
            due_date: settlement.due_date,
            paid_date: settlement.paid_date,
            days_late: settlement.days_late,
        });

        if let Some(outcome) = &settlement.recalculation {
            for adjusted in &outcome.adjusted {
                self.repository.update_payment(&loan.payments[adjusted.index])?;
            }
            info!(
                %loan_id,
                days_late = settlement.days_late,
                adjusted = outcome.adjusted.len(),
                "late payment, schedule recalculated"
            );
            if let Some(settlement_date) = outcome.settlement_date {
                self.events.emit(Event::ScheduleRecalculated {
                    loan_id,
                    settlement_date,
                    remaining_principal: outcome.remaining_principal,
                    installments_adjusted: outcome.adjusted.len(),
                });
            }
        }

        Ok(settlement)
    }

    pub fn update_status(
        &mut self,
        loan_id: LoanId,
        status: LoanStatus,
        time: &SafeTimeProvider,
    ) -> Result<StatusTransition> {
        let mut loan = self.load(loan_id)?;
        let transition = self.lifecycle.update_status(&mut loan, status, today(time))?;
        self.repository.update_loan(&loan)?;
        self.emit_transition(loan_id, &transition);
        Ok(transition)
    }

    /// repay a loan whose installments are all paid
    pub fn close_loan(&mut self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<StatusTransition> {
        let mut loan = self.load(loan_id)?;
        let transition = self.lifecycle.close_loan(&mut loan, today(time))?;
        self.repository.update_loan(&loan)?;

        info!(%loan_id, "loan closed");
        self.emit_transition(loan_id, &transition);
        self.events.emit(Event::LoanClosed {
            loan_id,
            date: transition.date,
        });
        Ok(transition)
    }

    /// default overdue active loans per the configured sweep mode
    pub fn sweep_overdue(&mut self, time: &SafeTimeProvider) -> Result<Vec<StatusTransition>> {
        let today = today(time);
        let mut loans = self.repository.find_loans_by_status(LoanStatus::Active)?;
        let transitions = self.lifecycle.sweep_overdue(&mut loans, today)?;

        for loan in loans.iter().filter(|l| l.status == LoanStatus::Defaulted) {
            self.repository.update_loan(loan)?;
            if let Some(loan_id) = loan.id {
                self.events.emit(Event::LoanDefaulted {
                    loan_id,
                    end_date: loan.end_date,
                    detected_on: today,
                });
            }
        }
        for transition in &transitions {
            if let Some(loan_id) = transition.loan_id {
                self.emit_transition(loan_id, transition);
            }
        }

        Ok(transitions)
    }

    pub fn remaining_debt(&self, loan_id: LoanId, time: &SafeTimeProvider) -> Result<Money> {
        let loan = self.load(loan_id)?;
        Ok(calculate_remaining_debt(&loan, today(time)))
    }

    pub fn active_loans_for_debtor(&self, debtor: PartyId) -> Result<Vec<Loan>> {
        self.repository.find_active_loans_by_debtor(debtor)
    }

    /// active loans of the creditor started since 1 january of the current year
    pub fn active_loans_for_creditor_this_year(
        &self,
        creditor: PartyId,
        time: &SafeTimeProvider,
    ) -> Result<Vec<Loan>> {
        let today = today(time);
        let year_start = NaiveDate::from_ymd_opt(today.year(), 1, 1).ok_or_else(|| {
            LendingError::InvalidDate {
                message: format!("no january 1st in year {}", today.year()),
            }
        })?;

        Ok(self
            .repository
            .find_loans_by_creditor(creditor)?
            .into_iter()
            .filter(|l| l.status == LoanStatus::Active && l.start_date >= year_start)
            .collect())
    }

    /// active loans ending within the configured window, soonest first
    pub fn upcoming_expirations(&self, time: &SafeTimeProvider) -> Result<Vec<Loan>> {
        let today = today(time);
        let horizon = today
            .checked_add_days(Days::new(self.config.expiration_window_days as u64))
            .ok_or_else(|| LendingError::InvalidDate {
                message: format!("expiration window overflows from {}", today),
            })?;

        let mut loans: Vec<Loan> = self
            .repository
            .find_loans_by_status(LoanStatus::Active)?
            .into_iter()
            .filter(|l| l.end_date >= today && l.end_date <= horizon)
            .collect();
        loans.sort_by_key(|l| l.end_date);
        Ok(loans)
    }

    fn emit_transition(&mut self, loan_id: LoanId, transition: &StatusTransition) {
        self.events.emit(Event::StatusChanged {
            loan_id,
            old_status: transition.old_status,
            new_status: transition.new_status,
            date: transition.date,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decimal::Rate;
    use crate::repository::InMemoryLoanRepository;
    use crate::types::SweepMode;
    use chrono::{Duration, TimeZone, Utc};
    use hourglass_rs::TimeSource;
    use rust_decimal_macros::dec;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap(),
        ))
    }

    fn book() -> LoanBook<InMemoryLoanRepository> {
        LoanBook::new(InMemoryLoanRepository::new(), LendingConfig::default()).unwrap()
    }

    fn application(debtor: PartyId, amount: i64, rate: Rate, term: u32) -> LoanApplication {
        LoanApplication {
            creditor: Uuid::new_v4(),
            debtor,
            amount: Money::from_major(amount),
            interest_rate: rate,
            term_months: term,
        }
    }

    #[test]
    fn test_create_loan_persists_schedule() {
        let time = clock();
        let mut book = book();
        let debtor = Uuid::new_v4();

        let loan = book
            .create_loan(application(debtor, 20_000, Rate::from_decimal(dec!(0.15)), 4), &time)
            .unwrap();

        assert_eq!(loan.start_date, date(2024, 1, 15));
        assert_eq!(loan.end_date, date(2024, 5, 15));
        assert_eq!(loan.payments.len(), 4);
        assert_eq!(loan.payments[0].amount, Money::from_cents(525_479));

        let stored = book.repository().find_loan(loan.id.unwrap()).unwrap().unwrap();
        assert_eq!(stored, loan);

        let events = book.take_events();
        assert!(matches!(events[0], Event::LoanOriginated { .. }));
        assert!(matches!(events[1], Event::ScheduleGenerated { installments: 4, .. }));
    }

    #[test]
    fn test_late_payment_recalculates_stored_schedule() {
        let time = clock();
        let control = time.test_control().unwrap();
        let mut book = book();

        let loan = book
            .create_loan(application(Uuid::new_v4(), 20_000, Rate::from_decimal(dec!(0.15)), 4), &time)
            .unwrap();
        let loan_id = loan.id.unwrap();
        let first = loan.payments[0].id.unwrap();
        book.take_events();

        // ten days past the first due date
        control.advance(Duration::days(41));
        let settlement = book.pay_payment(loan_id, first, &time).unwrap();
        assert_eq!(settlement.days_late, 10);

        let stored = book.repository().find_loan(loan_id).unwrap().unwrap();
        assert_eq!(stored.payments[0].paid_date, Some(date(2024, 2, 25)));
        assert_eq!(stored.payments[1].amount, Money::from_cents(511_712));
        assert_eq!(stored.payments[2].amount, Money::from_cents(512_740));

        let events = book.take_events();
        assert!(matches!(events[0], Event::PaymentSettled { days_late: 10, .. }));
        assert!(matches!(events[1], Event::ScheduleRecalculated { .. }));

        let err = book.pay_payment(loan_id, first, &time).unwrap_err();
        assert!(matches!(err, LendingError::PaymentAlreadySettled { .. }));
        assert!(matches!(
            book.pay_payment(loan_id, Uuid::new_v4(), &time),
            Err(LendingError::PaymentNotFound { .. })
        ));
    }

    #[test]
    fn test_ceiling_declines_application() {
        let time = clock();
        let mut book = book();
        let debtor = Uuid::new_v4();
        let rate = Rate::from_decimal(dec!(0.01));

        book.create_loan(application(debtor, 50_000, rate, 8), &time).unwrap();
        assert!(!book.can_debtor_take_new_loan(debtor).unwrap());

        let err = book
            .create_loan(application(debtor, 20_000, rate, 8), &time)
            .unwrap_err();
        assert!(err.is_limit_exceeded());
        assert_eq!(book.repository().len(), 1);
        assert!(book
            .events()
            .events()
            .iter()
            .any(|e| matches!(e, Event::ApplicationDeclined { .. })));
    }

    #[test]
    fn test_close_requires_paid_installments() {
        let time = clock();
        let control = time.test_control().unwrap();
        let mut book = book();

        let loan = book
            .create_loan(application(Uuid::new_v4(), 3_000, Rate::from_decimal(dec!(0.12)), 2), &time)
            .unwrap();
        let loan_id = loan.id.unwrap();

        assert!(matches!(
            book.close_loan(loan_id, &time),
            Err(LendingError::PendingInstallments { pending: 2 })
        ));

        control.advance(Duration::days(20));
        for payment in &loan.payments {
            book.pay_payment(loan_id, payment.id.unwrap(), &time).unwrap();
        }
        let transition = book.close_loan(loan_id, &time).unwrap();
        assert_eq!(transition.new_status, LoanStatus::Repaid);

        let stored = book.repository().find_loan(loan_id).unwrap().unwrap();
        assert_eq!(stored.status, LoanStatus::Repaid);
        assert_eq!(stored.end_date, date(2024, 2, 4));

        let err = book
            .update_status(loan_id, LoanStatus::Active, &time)
            .unwrap_err();
        assert!(err.is_state());
    }

    #[test]
    fn test_sweep_defaults_overdue_loans() {
        let time = clock();
        let control = time.test_control().unwrap();
        let config = LendingConfig {
            overdue_sweep: SweepMode::All,
            ..LendingConfig::default()
        };
        let mut book = LoanBook::new(InMemoryLoanRepository::new(), config).unwrap();
        let debtor = Uuid::new_v4();
        let rate = Rate::from_decimal(dec!(0.05));

        let short = book.create_loan(application(debtor, 1_000, rate, 1), &time).unwrap();
        book.create_loan(application(Uuid::new_v4(), 1_000, rate, 1), &time).unwrap();
        let long = book.create_loan(application(Uuid::new_v4(), 1_000, rate, 6), &time).unwrap();

        control.advance(Duration::days(40));
        let transitions = book.sweep_overdue(&time).unwrap();
        assert_eq!(transitions.len(), 2);

        let short = book.repository().find_loan(short.id.unwrap()).unwrap().unwrap();
        let long = book.repository().find_loan(long.id.unwrap()).unwrap().unwrap();
        assert_eq!(short.status, LoanStatus::Defaulted);
        assert_eq!(long.status, LoanStatus::Active);

        assert!(!book.can_debtor_take_new_loan(debtor).unwrap());
        assert!(book.sweep_overdue(&time).unwrap().is_empty());
    }

    #[test]
    fn test_lookups() {
        let time = clock();
        let control = time.test_control().unwrap();
        let mut book = book();
        let debtor = Uuid::new_v4();
        let rate = Rate::from_decimal(dec!(0.05));

        let mut app = application(debtor, 1_000, rate, 1);
        let creditor = app.creditor;
        let one_month = book.create_loan(app.clone(), &time).unwrap();
        app.term_months = 3;
        book.create_loan(app, &time).unwrap();

        assert_eq!(book.active_loans_for_debtor(debtor).unwrap().len(), 2);
        assert_eq!(
            book.active_loans_for_creditor_this_year(creditor, &time).unwrap().len(),
            2
        );

        // 2024-02-10, five days before the one month loan ends
        control.advance(Duration::days(26));
        let expiring = book.upcoming_expirations(&time).unwrap();
        assert_eq!(expiring.len(), 1);
        assert_eq!(expiring[0].id, one_month.id);

        assert_eq!(
            book.remaining_debt(one_month.id.unwrap(), &time).unwrap(),
            // 1000 * 0.05 * 26 / 365 = 3.56
            Money::from_cents(100_356)
        );
        assert!(matches!(
            book.remaining_debt(Uuid::new_v4(), &time),
            Err(LendingError::LoanNotFound { .. })
        ));
    }
}

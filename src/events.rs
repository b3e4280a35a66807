use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::types::{LoanId, LoanStatus, PartyId, PaymentId};

/// all events that can be emitted by the loan book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    // origination events
    LoanOriginated {
        loan_id: LoanId,
        creditor: PartyId,
        debtor: PartyId,
        principal: Money,
        interest_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    },
    ScheduleGenerated {
        loan_id: LoanId,
        installments: u32,
        total_interest: Money,
        total_payment: Money,
    },
    ApplicationDeclined {
        debtor: PartyId,
        requested: Money,
        reason: String,
    },

    // payment events
    PaymentSettled {
        loan_id: LoanId,
        payment_id: Option<PaymentId>,
        amount: Money,
        due_date: NaiveDate,
        paid_date: NaiveDate,
        days_late: i64,
    },
    ScheduleRecalculated {
        loan_id: LoanId,
        settlement_date: NaiveDate,
        remaining_principal: Money,
        installments_adjusted: usize,
    },

    // status change events
    StatusChanged {
        loan_id: LoanId,
        old_status: LoanStatus,
        new_status: LoanStatus,
        date: NaiveDate,
    },
    LoanClosed {
        loan_id: LoanId,
        date: NaiveDate,
    },
    LoanDefaulted {
        loan_id: LoanId,
        end_date: NaiveDate,
        detected_on: NaiveDate,
    },
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.events)
    }
}

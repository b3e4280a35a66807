pub mod config;
pub mod debt;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod interest;
pub mod lifecycle;
pub mod limits;
pub mod loan;
pub mod payments;
pub mod repository;
pub mod service;
pub mod types;

// re-export key types
pub use config::LendingConfig;
pub use debt::{calculate_remaining_debt, replay_remaining_debt, RemainingDebt};
pub use decimal::{Money, Rate};
pub use errors::{ErrorKind, LendingError, Result};
pub use events::{Event, EventStore};
pub use interest::{accrue, calculate_interest, InterestCalculation};
pub use lifecycle::{LifecycleManager, StatusTransition};
pub use limits::DebtLimitPolicy;
pub use loan::{Loan, LoanApplication, Payment};
pub use payments::{
    recalculate, settle_installment, AmortizationSchedule, AmortizationScheduler,
    RecalculationOutcome, Settlement,
};
pub use repository::{InMemoryLoanRepository, LoanRepository};
pub use service::LoanBook;
pub use types::{LoanId, LoanStatus, PartyId, PaymentId, PaymentType, SweepMode};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
pub use uuid::Uuid;

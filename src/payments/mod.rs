pub mod amortization;
pub mod recalculation;
pub mod settlement;

pub use amortization::{
    monthly_principal, AmortizationSchedule, AmortizationScheduler, ScheduledInstallment,
};
pub use recalculation::{recalculate, AdjustedInstallment, RecalculationOutcome};
pub use settlement::{settle_installment, Settlement};

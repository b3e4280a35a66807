use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LendingError, Result};
use crate::types::SweepMode;

/// default aggregate active principal a debtor may hold
pub const DEFAULT_DEBT_CEILING: i64 = 50_000;

pub const MIN_TERM_MONTHS: u32 = 1;
pub const MAX_TERM_MONTHS: u32 = 12;

/// engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingConfig {
    /// active principal at or above which new loans are refused
    pub debt_ceiling: Money,
    pub min_term_months: u32,
    pub max_term_months: u32,
    pub overdue_sweep: SweepMode,
    /// push accumulated principal rounding error onto the last installment
    pub reconcile_final_installment: bool,
    /// look-ahead used by upcoming expiration queries
    pub expiration_window_days: u32,
}

impl Default for LendingConfig {
    fn default() -> Self {
        Self {
            debt_ceiling: Money::from_major(DEFAULT_DEBT_CEILING),
            min_term_months: MIN_TERM_MONTHS,
            max_term_months: MAX_TERM_MONTHS,
            overdue_sweep: SweepMode::All,
            reconcile_final_installment: false,
            expiration_window_days: 7,
        }
    }
}

impl LendingConfig {
    /// one overdue loan per sweep, drift left on the final installment
    pub fn strict() -> Self {
        Self {
            overdue_sweep: SweepMode::FirstOnly,
            ..Self::default()
        }
    }

    /// parse from json, missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: LendingConfig =
            serde_json::from_str(json).map_err(|e| LendingError::InvalidConfiguration {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.debt_ceiling.is_positive() {
            return Err(LendingError::InvalidConfiguration {
                message: format!("debt ceiling must be positive, got {}", self.debt_ceiling),
            });
        }
        if self.min_term_months < MIN_TERM_MONTHS
            || self.max_term_months > MAX_TERM_MONTHS
            || self.min_term_months > self.max_term_months
        {
            return Err(LendingError::InvalidConfiguration {
                message: format!(
                    "term bounds {}..={} must be a non-empty range within {}..={}",
                    self.min_term_months, self.max_term_months, MIN_TERM_MONTHS, MAX_TERM_MONTHS
                ),
            });
        }
        Ok(())
    }
}

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::CategoryKey;

/// A per-category interest accrual rule.
///
/// `next_apply` is the exclusive cursor: the next date at which one month of
/// interest falls due. It starts at `start_date` (so a fresh rule accrues
/// its first month on the start date itself) and only ever moves forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterestRule {
    pub category: CategoryKey,
    /// Stored as a percentage, e.g. 0.5 means 0.5%.
    pub rate_pct: f64,
    /// True when `rate_pct` is a monthly rate; false means annual, applied
    /// at one twelfth per month.
    pub monthly: bool,
    pub start_date: NaiveDate,
    pub next_apply: NaiveDate,
}

impl InterestRule {
    pub fn new(category: CategoryKey, rate_pct: f64, monthly: bool, start_date: NaiveDate) -> Self {
        Self {
            category,
            rate_pct,
            monthly,
            start_date,
            next_apply: start_date,
        }
    }

    /// The rate applied per monthly period, as a fraction.
    pub fn monthly_rate(&self) -> f64 {
        if self.monthly {
            self.rate_pct / 100.0
        } else {
            self.rate_pct / 100.0 / 12.0
        }
    }

    pub fn label(&self) -> String {
        if self.monthly {
            format!("{}% monthly", self.rate_pct)
        } else {
            format!("{}% annual (converted monthly)", self.rate_pct)
        }
    }
}

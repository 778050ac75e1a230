use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::category::CategoryKey;

/// A single committed ledger entry. Transactions are append-only facts:
/// once recorded they are never edited or removed, and every balance in the
/// account can be re-derived from them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    /// Positive amounts are credits, negative amounts are debits.
    pub amount: f64,
    pub category: CategoryKey,
    /// Free text carrying provenance, e.g. "Scheduled: rent" or
    /// "Interest (monthly)".
    #[serde(default)]
    pub note: String,
}

impl Transaction {
    pub fn new(
        date: NaiveDate,
        amount: f64,
        category: CategoryKey,
        note: impl Into<String>,
    ) -> Self {
        Self {
            date,
            amount,
            category,
            note: note.into(),
        }
    }
}

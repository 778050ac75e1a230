//! Ledger domain models and the account composition root.

pub mod account;
pub mod calendar;
pub mod category;
pub mod interest;
pub mod schedule;
pub mod transaction;

pub use account::{Account, InterestRunSummary, ScheduleRunSummary, SCHEDULE_GUARD_LIMIT};
pub use category::{sanitize_display_name, CategoryKey};
pub use interest::InterestRule;
pub use schedule::{Schedule, ScheduleRule};
pub use transaction::Transaction;

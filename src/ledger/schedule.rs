use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar;
use super::category::CategoryKey;

/// How a schedule advances its cursor after firing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScheduleRule {
    /// Fires every `n` calendar days.
    EveryDays(u32),
    /// Fires on a fixed day-of-month, clamped in shorter months.
    DayOfMonth(u32),
}

impl ScheduleRule {
    /// Rejects parameters that cannot make forward progress.
    pub fn validate(&self) -> Result<(), String> {
        match *self {
            ScheduleRule::EveryDays(0) => Err("interval must be at least one day".into()),
            ScheduleRule::DayOfMonth(d) if !(1..=31).contains(&d) => {
                Err(format!("day-of-month {d} outside 1-31"))
            }
            _ => Ok(()),
        }
    }

    pub fn advance(&self, from: NaiveDate) -> NaiveDate {
        match *self {
            ScheduleRule::EveryDays(n) => calendar::add_days(from, n as i64),
            ScheduleRule::DayOfMonth(d) => calendar::next_day_of_month_on_or_after(from, d),
        }
    }

    pub fn label(&self) -> String {
        match *self {
            ScheduleRule::EveryDays(1) => "Daily".into(),
            ScheduleRule::EveryDays(n) => format!("Every {n} days"),
            ScheduleRule::DayOfMonth(d) => format!("Monthly on day {d}"),
        }
    }
}

/// A recurring transaction definition.
///
/// `next_date` is the cursor marking when the schedule is next due; the
/// advancer only ever moves it forward, which is what makes processing
/// idempotent for a fixed target date.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub id: Uuid,
    pub rule: ScheduleRule,
    pub amount: f64,
    #[serde(default)]
    pub note: String,
    /// `None` posts to the catch-all category, unless `auto_allocate` is
    /// set and the amount is positive, in which case the amount is spread
    /// across the allocation table instead.
    #[serde(default)]
    pub category: Option<CategoryKey>,
    #[serde(default)]
    pub auto_allocate: bool,
    pub next_date: NaiveDate,
}

impl Schedule {
    pub fn new(
        rule: ScheduleRule,
        amount: f64,
        note: impl Into<String>,
        first_due: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            rule,
            amount,
            note: note.into(),
            category: None,
            auto_allocate: false,
            next_date: first_due,
        }
    }

    pub fn with_category(mut self, category: CategoryKey) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_auto_allocate(mut self) -> Self {
        self.auto_allocate = true;
        self
    }
}

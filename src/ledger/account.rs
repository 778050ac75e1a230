use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::calendar;
use super::category::{sanitize_display_name, CategoryKey, FALLBACK_DISPLAY_NAME};
use super::interest::InterestRule;
use super::schedule::Schedule;
use super::transaction::Transaction;

/// Iteration cap per schedule when advancing cursors, guarding against
/// schedules left so far in the past that catching up would degenerate.
pub const SCHEDULE_GUARD_LIMIT: usize = 10_000;

/// Allocation tables whose percentages sum to no more than this are treated
/// as empty and fall back to the catch-all category.
const ALLOCATION_EPSILON: f64 = 1e-6;

/// Tolerance when comparing persisted balances against ledger sums.
const BALANCE_DRIFT_TOLERANCE: f64 = 0.01;

/// Outcome of one `process_schedules_up_to` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScheduleRunSummary {
    /// Occurrences fired (an allocation fan-out counts as one occurrence).
    pub occurrences: usize,
    pub skipped_invalid: usize,
    pub guard_tripped: usize,
}

/// Outcome of one `apply_interest_up_to` run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterestRunSummary {
    pub postings: usize,
    /// Monthly periods the cursors moved past, including zero-balance ones.
    pub months_advanced: usize,
}

/// Aggregate account state: the append-only transaction ledger plus derived
/// balances, recurrence schedules, allocation percentages, interest rules,
/// and the category display-name registry.
///
/// All maps are `BTreeMap` so iteration and serialization order stay
/// deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub balance: f64,
    pub transactions: Vec<Transaction>,
    pub schedules: Vec<Schedule>,
    #[serde(default)]
    pub allocation_pct: BTreeMap<CategoryKey, f64>,
    #[serde(default)]
    pub category_balances: BTreeMap<CategoryKey, f64>,
    #[serde(default)]
    pub display_names: BTreeMap<CategoryKey, String>,
    #[serde(default)]
    pub interest: BTreeMap<CategoryKey, InterestRule>,
}

impl Default for Account {
    fn default() -> Self {
        Self::new()
    }
}

impl Account {
    /// Creates an account seeded with the default categories and allocation
    /// split.
    pub fn new() -> Self {
        let mut account = Self {
            balance: 0.0,
            transactions: Vec::new(),
            schedules: Vec::new(),
            allocation_pct: BTreeMap::new(),
            category_balances: BTreeMap::new(),
            display_names: BTreeMap::new(),
            interest: BTreeMap::new(),
        };
        let defaults = [
            ("Emergency", 20.0),
            ("Entertainment", 10.0),
            ("Saving", 20.0),
            (FALLBACK_DISPLAY_NAME, 50.0),
        ];
        for (name, pct) in defaults {
            let key = account.ensure_category(name);
            account.allocation_pct.insert(key, pct);
        }
        account
    }

    // ---- category registry ----

    /// Interns a display name, registering the category with a zero balance
    /// if it is new, and returns the canonical key.
    pub fn ensure_category(&mut self, display_raw: &str) -> CategoryKey {
        let display = sanitize_display_name(display_raw);
        let key = CategoryKey::new(&display);
        self.display_names.entry(key.clone()).or_insert(display);
        self.category_balances.entry(key.clone()).or_insert(0.0);
        key
    }

    pub fn display_name<'a>(&'a self, key: &'a CategoryKey) -> &'a str {
        self.display_names
            .get(key)
            .map(String::as_str)
            .unwrap_or_else(|| key.as_str())
    }

    // ---- ledger primitives ----

    /// Appends a transaction and updates the overall and per-category
    /// balances. Unknown categories are registered on the fly; posting
    /// never fails.
    pub fn post_transaction(
        &mut self,
        date: NaiveDate,
        amount: f64,
        category: CategoryKey,
        note: impl Into<String>,
    ) {
        self.display_names
            .entry(category.clone())
            .or_insert_with(|| sanitize_display_name(category.as_str()));
        *self.category_balances.entry(category.clone()).or_insert(0.0) += amount;
        self.balance += amount;
        self.transactions
            .push(Transaction::new(date, amount, category, note));
    }

    /// Posts a manual transaction addressed by display name; empty names go
    /// to the catch-all category.
    pub fn post_manual(
        &mut self,
        date: NaiveDate,
        amount: f64,
        category_raw: &str,
        note: impl Into<String>,
    ) {
        let display = if category_raw.trim().is_empty() {
            FALLBACK_DISPLAY_NAME
        } else {
            category_raw
        };
        let key = self.ensure_category(display);
        self.post_transaction(date, amount, key, note);
    }

    /// Splits `amount` across the allocation table proportionally to each
    /// category's share of the summed percentages, posting one transaction
    /// per entry. A table summing to roughly zero routes the whole amount
    /// to the catch-all category instead of dividing by zero.
    ///
    /// The posted shares sum to `amount` up to f64 rounding; no remainder
    /// correction is applied.
    pub fn allocate(&mut self, date: NaiveDate, amount: f64, note: &str) {
        let total_pct: f64 = self.allocation_pct.values().sum();
        if total_pct <= ALLOCATION_EPSILON {
            let key = self.ensure_category(FALLBACK_DISPLAY_NAME);
            self.post_transaction(date, amount, key, format!("{note} (auto alloc fallback)"));
            return;
        }
        let shares: Vec<(CategoryKey, f64)> = self
            .allocation_pct
            .iter()
            .map(|(key, pct)| (key.clone(), amount * (pct / total_pct)))
            .collect();
        for (key, share) in shares {
            self.post_transaction(date, share, key, format!("{note} (auto alloc)"));
        }
    }

    /// Replaces the allocation table. Categories are created as needed; the
    /// percentages are stored as given and normalized at allocation time.
    pub fn set_allocations(&mut self, entries: &[(String, f64)]) {
        self.allocation_pct.clear();
        for (display, pct) in entries {
            let key = self.ensure_category(display);
            self.allocation_pct.insert(key, *pct);
        }
    }

    /// Sum of ledger amounts for `category` dated on or before `as_of`.
    pub fn balance_as_of(&self, category: &CategoryKey, as_of: NaiveDate) -> f64 {
        self.transactions
            .iter()
            .filter(|tx| &tx.category == category && tx.date <= as_of)
            .map(|tx| tx.amount)
            .sum()
    }

    // ---- schedules ----

    pub fn add_schedule(&mut self, schedule: Schedule) -> Uuid {
        let id = schedule.id;
        self.schedules.push(schedule);
        id
    }

    pub fn remove_schedule(&mut self, id: Uuid) -> Option<Schedule> {
        let idx = self.schedules.iter().position(|s| s.id == id)?;
        Some(self.schedules.remove(idx))
    }

    /// Advances every schedule's cursor up to and including `target`,
    /// posting one transaction (or one allocation fan-out) per occurrence.
    ///
    /// Invalid schedules are skipped without being advanced. Each schedule
    /// is bounded by [`SCHEDULE_GUARD_LIMIT`] iterations; tripping the
    /// guard leaves the cursor wherever it stopped and moves on to the next
    /// schedule. Since every processed cursor ends up past `target`,
    /// calling this again with the same target is a no-op, and a later
    /// target resumes exactly where the cursor left off.
    pub fn process_schedules_up_to(&mut self, target: NaiveDate) -> ScheduleRunSummary {
        let mut summary = ScheduleRunSummary::default();
        for idx in 0..self.schedules.len() {
            let schedule = &self.schedules[idx];
            if let Err(reason) = schedule.rule.validate() {
                tracing::warn!(schedule = %schedule.id, %reason, "skipping invalid schedule");
                summary.skipped_invalid += 1;
                continue;
            }
            let id = schedule.id;
            let rule = schedule.rule;
            let amount = schedule.amount;
            let auto_allocate = schedule.auto_allocate;
            let category = schedule.category.clone();
            let note = format!("Scheduled: {}", schedule.note);
            let mut next_date = schedule.next_date;

            let mut iterations = 0usize;
            while next_date <= target && iterations < SCHEDULE_GUARD_LIMIT {
                if auto_allocate && amount > 0.0 {
                    self.allocate(next_date, amount, &note);
                } else {
                    let key = match category.clone() {
                        Some(key) => key,
                        None => self.ensure_category(FALLBACK_DISPLAY_NAME),
                    };
                    self.post_transaction(next_date, amount, key, note.clone());
                }
                summary.occurrences += 1;
                next_date = rule.advance(next_date);
                iterations += 1;
            }
            if next_date <= target {
                tracing::warn!(
                    schedule = %id,
                    cursor = %next_date,
                    "schedule hit the iteration guard before reaching the target"
                );
                summary.guard_tripped += 1;
            }
            self.schedules[idx].next_date = next_date;
        }
        summary
    }

    // ---- interest ----

    /// Registers (or replaces) the interest rule for its category.
    pub fn set_interest_rule(&mut self, rule: InterestRule) {
        self.ensure_category(rule.category.as_str());
        self.interest.insert(rule.category.clone(), rule);
    }

    pub fn remove_interest_rule(&mut self, category: &CategoryKey) -> Option<InterestRule> {
        self.interest.remove(category)
    }

    /// Applies monthly interest for every rule with elapsed periods up to
    /// and including `target`.
    ///
    /// Periods are simulated month by month against the live ledger, so a
    /// posting made for one month raises the balance the next month sees:
    /// interest compounds across months within a single call, and scheduled
    /// transactions posted beforehand are part of every period's balance.
    /// Months with a non-positive balance post nothing but are still passed
    /// over by the cursor.
    ///
    /// The cursor stores the next date interest falls due. After a run it
    /// sits strictly beyond `target`, which is what makes repeated calls
    /// no-ops; clamping it back to `target` would re-arm the rule and
    /// double-post on the next call.
    pub fn apply_interest_up_to(&mut self, target: NaiveDate) -> InterestRunSummary {
        let mut summary = InterestRunSummary::default();
        // Collected up front: the loop body posts to the ledger and then
        // rewrites the rule cursor, so we cannot hold a map iterator open.
        let categories: Vec<CategoryKey> = self.interest.keys().cloned().collect();
        for category in categories {
            let Some(rule) = self.interest.get(&category) else {
                continue;
            };
            if rule.start_date > target {
                continue;
            }
            let from = rule.next_apply.max(rule.start_date);
            let months = calendar::months_between_inclusive(from, target);
            if months == 0 {
                continue;
            }
            let monthly_rate = rule.monthly_rate();
            let note = format!(
                "Interest ({})",
                if rule.monthly {
                    "monthly"
                } else {
                    "annual/converted monthly"
                }
            );

            for m in 0..months {
                let apply_date = calendar::add_months(from, m as i32);
                let balance = self.balance_as_of(&category, apply_date);
                if balance <= 0.0 {
                    tracing::debug!(
                        category = %category,
                        %apply_date,
                        balance,
                        "no positive balance, skipping interest for this period"
                    );
                    continue;
                }
                let amount = balance * monthly_rate;
                if amount != 0.0 {
                    self.post_transaction(apply_date, amount, category.clone(), note.clone());
                    summary.postings += 1;
                }
            }

            summary.months_advanced += months as usize;
            if let Some(rule) = self.interest.get_mut(&category) {
                rule.next_apply = calendar::add_months(from, months as i32);
            }
        }
        summary
    }

    // ---- derived state ----

    /// Recomputes the overall balance and per-category balances from the
    /// transaction ledger; the ledger is authoritative. Returns one warning
    /// per persisted value that disagreed beyond a small tolerance, and
    /// back-fills the registry for categories referenced only by schedules,
    /// allocations, or interest rules.
    pub fn rebuild_derived_state(&mut self) -> Vec<String> {
        let mut warnings = Vec::new();

        let mut recomputed: BTreeMap<CategoryKey, f64> = BTreeMap::new();
        for tx in &self.transactions {
            *recomputed.entry(tx.category.clone()).or_insert(0.0) += tx.amount;
        }
        for key in self.category_balances.keys() {
            recomputed.entry(key.clone()).or_insert(0.0);
        }
        for (key, ledger_sum) in &recomputed {
            let persisted = self.category_balances.get(key).copied().unwrap_or(0.0);
            if (persisted - ledger_sum).abs() > BALANCE_DRIFT_TOLERANCE {
                warnings.push(format!(
                    "category '{}' balance {persisted:.2} differs from ledger sum {ledger_sum:.2}; using the ledger",
                    self.display_name(key)
                ));
            }
        }
        self.category_balances = recomputed;

        let ledger_total: f64 = self.transactions.iter().map(|tx| tx.amount).sum();
        if (self.balance - ledger_total).abs() > BALANCE_DRIFT_TOLERANCE {
            warnings.push(format!(
                "stored balance {:.2} differs from ledger sum {ledger_total:.2}; using the ledger",
                self.balance
            ));
        }
        self.balance = ledger_total;

        let referenced: Vec<CategoryKey> = self
            .allocation_pct
            .keys()
            .cloned()
            .chain(self.interest.keys().cloned())
            .chain(self.schedules.iter().filter_map(|s| s.category.clone()))
            .chain(self.transactions.iter().map(|tx| tx.category.clone()))
            .collect();
        for key in referenced {
            self.display_names
                .entry(key.clone())
                .or_insert_with(|| sanitize_display_name(key.as_str()));
            self.category_balances.entry(key).or_insert(0.0);
        }

        warnings
    }
}

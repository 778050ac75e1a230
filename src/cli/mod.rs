//! Menu-driven interactive session over a single account. The CLI owns all
//! parsing and formatting; the ledger engines only ever see validated
//! dates, amounts, and category names.

mod io;
pub mod output;

use chrono::{Local, NaiveDate};
use dialoguer::theme::ColorfulTheme;

use crate::{
    config::{Config, ConfigManager},
    errors::AccountError,
    ledger::{Account, InterestRule, Schedule, ScheduleRule},
    storage::JsonStorage,
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
    #[error(transparent)]
    Account(#[from] AccountError),
}

const MAIN_MENU: &[&str] = &[
    "Account summary",
    "Add transaction",
    "Allocate an amount",
    "Edit allocation percentages",
    "Add schedule",
    "Manage schedules",
    "Add interest rule",
    "Manage interest rules",
    "Process schedules & interest to today",
    "Save",
    "Settings",
    "Quit",
];

struct Session {
    account: Account,
    storage: JsonStorage,
    config: Config,
    config_manager: ConfigManager,
    theme: ColorfulTheme,
}

/// Runs the interactive loop until the user quits.
pub fn run_cli() -> Result<(), CliError> {
    crate::init();
    let storage = JsonStorage::new_default()?;
    let config_manager = ConfigManager::new(storage.base_dir())?;
    let config = config_manager.load()?;
    let account = match storage.load()? {
        Some((account, warnings)) => {
            for warning in warnings {
                output::warning(warning);
            }
            output::info(format!(
                "Loaded account from {}",
                storage.account_path().display()
            ));
            account
        }
        None => {
            output::info("No saved account found, starting fresh.");
            Account::new()
        }
    };

    let mut session = Session {
        account,
        storage,
        config,
        config_manager,
        theme: ColorfulTheme::default(),
    };

    if session.config.auto_process_on_startup {
        session.process_to(today());
        session.maybe_auto_save()?;
    }

    loop {
        match io::select(&session.theme, "Finance Manager", MAIN_MENU)? {
            0 => session.print_summary(),
            1 => session.add_transaction()?,
            2 => session.allocate_amount()?,
            3 => session.edit_allocations()?,
            4 => session.add_schedule()?,
            5 => session.manage_schedules()?,
            6 => session.add_interest_rule()?,
            7 => session.manage_interest_rules()?,
            8 => {
                session.process_to(today());
                session.maybe_auto_save()?;
            }
            9 => session.save()?,
            10 => session.settings()?,
            _ => {
                session.quit()?;
                break;
            }
        }
    }
    Ok(())
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

impl Session {
    fn maybe_auto_save(&mut self) -> Result<(), CliError> {
        if self.config.auto_save {
            self.save()?;
        }
        Ok(())
    }

    fn save(&mut self) -> Result<(), CliError> {
        self.storage.save(&self.account)?;
        output::success(format!(
            "Saved to {}",
            self.storage.account_path().display()
        ));
        Ok(())
    }

    fn print_summary(&self) {
        output::section("Account summary");
        output::info(format!("Total balance: {:.2}", self.account.balance));
        output::info("Category balances:");
        for (key, balance) in &self.account.category_balances {
            output::info(format!(
                "  - {}: {:.2}",
                self.account.display_name(key),
                balance
            ));
        }
        output::info("Allocations (%):");
        for (key, pct) in &self.account.allocation_pct {
            output::info(format!(
                "  - {}: {}%",
                self.account.display_name(key),
                pct
            ));
        }
        let transactions = &self.account.transactions;
        output::info(format!("Recent transactions ({} total):", transactions.len()));
        for tx in transactions.iter().rev().take(10) {
            output::info(format!(
                "  {} | {:>10.2} | {} | {}",
                tx.date,
                tx.amount,
                self.account.display_name(&tx.category),
                tx.note
            ));
        }
    }

    fn add_transaction(&mut self) -> Result<(), CliError> {
        let date = io::date(&self.theme, "Date", today())?;
        let amount = io::amount(&self.theme, "Amount (positive = income, negative = expense)")?;
        let category = io::text(&self.theme, "Category (empty = Other)")?;
        let note = io::text(&self.theme, "Note")?;
        self.account.post_manual(date, amount, &category, note);
        output::success("Transaction recorded.");
        self.maybe_auto_save()
    }

    fn allocate_amount(&mut self) -> Result<(), CliError> {
        let date = io::date(&self.theme, "Date", today())?;
        let amount = io::amount(&self.theme, "Amount to allocate")?;
        let note = io::text(&self.theme, "Note")?;
        self.account.allocate(date, amount, &note);
        output::success("Amount allocated across categories.");
        self.maybe_auto_save()
    }

    fn edit_allocations(&mut self) -> Result<(), CliError> {
        output::section("Allocation percentages");
        let mut entries = Vec::new();
        for (key, pct) in self.account.allocation_pct.clone() {
            let display = self.account.display_name(&key).to_string();
            let raw = io::text(
                &self.theme,
                &format!("{display} (current {pct}%, empty keeps)"),
            )?;
            let value = if raw.trim().is_empty() {
                pct
            } else {
                match raw.trim().parse::<f64>() {
                    Ok(v) if (0.0..=100.0).contains(&v) => v,
                    _ => {
                        output::warning(
                            "Expected a percentage between 0 and 100, keeping the current value.",
                        );
                        pct
                    }
                }
            };
            entries.push((display, value));
        }
        loop {
            let name = io::text(&self.theme, "New category (empty to finish)")?;
            if name.trim().is_empty() {
                break;
            }
            let pct = io::amount(&self.theme, "Percent")?;
            entries.push((name, pct));
        }
        self.account.set_allocations(&entries);
        output::success("Allocations updated.");
        self.maybe_auto_save()
    }

    fn add_schedule(&mut self) -> Result<(), CliError> {
        let kind = io::select(
            &self.theme,
            "Schedule type",
            &["Every N days", "Monthly on a day"],
        )?;
        let rule = if kind == 0 {
            ScheduleRule::EveryDays(io::integer(&self.theme, "Interval in days")?)
        } else {
            ScheduleRule::DayOfMonth(io::integer(&self.theme, "Day of month (1-31)")?)
        };
        if let Err(reason) = rule.validate() {
            output::error(format!("Invalid schedule: {reason}"));
            return Ok(());
        }
        let amount = io::amount(&self.theme, "Amount")?;
        let note = io::text(&self.theme, "Note")?;
        let first_due = io::date(&self.theme, "First due date", today())?;
        let mut schedule = Schedule::new(rule, amount, note, first_due);
        if amount > 0.0
            && io::confirm(&self.theme, "Auto-allocate across categories?", false)?
        {
            schedule.auto_allocate = true;
        } else {
            let category = io::text(&self.theme, "Category (empty = Other)")?;
            if !category.trim().is_empty() {
                schedule.category = Some(self.account.ensure_category(&category));
            }
        }
        self.account.add_schedule(schedule);
        output::success("Schedule added.");
        self.maybe_auto_save()
    }

    fn manage_schedules(&mut self) -> Result<(), CliError> {
        output::section("Schedules");
        if self.account.schedules.is_empty() {
            output::info("No schedules configured.");
            return Ok(());
        }
        let mut lines: Vec<String> = self
            .account
            .schedules
            .iter()
            .map(|schedule| {
                let category = schedule
                    .category
                    .as_ref()
                    .map(|key| self.account.display_name(key).to_string())
                    .unwrap_or_else(|| {
                        if schedule.auto_allocate {
                            "<auto-allocate>".into()
                        } else {
                            "Other".into()
                        }
                    });
                format!(
                    "{} | amount {:.2} | next {} | {} | {}",
                    schedule.rule.label(),
                    schedule.amount,
                    schedule.next_date,
                    category,
                    schedule.note
                )
            })
            .collect();
        lines.push("Back".into());
        let items: Vec<&str> = lines.iter().map(String::as_str).collect();
        let choice = io::select(&self.theme, "Select a schedule to remove", &items)?;
        if choice < self.account.schedules.len()
            && io::confirm(&self.theme, "Remove this schedule?", false)?
        {
            let id = self.account.schedules[choice].id;
            self.account.remove_schedule(id);
            output::success("Schedule removed.");
            self.maybe_auto_save()?;
        }
        Ok(())
    }

    fn add_interest_rule(&mut self) -> Result<(), CliError> {
        let category = io::text(&self.theme, "Category")?;
        let key = self.account.ensure_category(&category);
        let rate_pct = io::amount(&self.theme, "Rate in percent (e.g. 0.5)")?;
        let monthly = io::select(
            &self.theme,
            "Rate frequency",
            &["Monthly", "Annual (applied monthly at 1/12)"],
        )? == 0;
        let start_date = io::date(&self.theme, "Start date", today())?;
        self.account
            .set_interest_rule(InterestRule::new(key, rate_pct, monthly, start_date));
        output::success("Interest rule saved.");
        self.maybe_auto_save()
    }

    fn manage_interest_rules(&mut self) -> Result<(), CliError> {
        output::section("Interest rules");
        if self.account.interest.is_empty() {
            output::info("No interest rules configured.");
            return Ok(());
        }
        let keys: Vec<_> = self.account.interest.keys().cloned().collect();
        let mut lines: Vec<String> = keys
            .iter()
            .map(|key| {
                let rule = &self.account.interest[key];
                format!(
                    "{}: {} | start {} | next due {}",
                    self.account.display_name(key),
                    rule.label(),
                    rule.start_date,
                    rule.next_apply
                )
            })
            .collect();
        lines.push("Back".into());
        let items: Vec<&str> = lines.iter().map(String::as_str).collect();
        let choice = io::select(&self.theme, "Select a rule to remove", &items)?;
        if choice < keys.len() && io::confirm(&self.theme, "Remove this rule?", false)? {
            self.account.remove_interest_rule(&keys[choice]);
            output::success("Interest rule removed.");
            self.maybe_auto_save()?;
        }
        Ok(())
    }

    fn process_to(&mut self, target: NaiveDate) {
        let schedules = self.account.process_schedules_up_to(target);
        let interest = self.account.apply_interest_up_to(target);
        output::success(format!(
            "Processed {} scheduled occurrence(s) and {} interest posting(s) up to {target}.",
            schedules.occurrences, interest.postings
        ));
        if schedules.skipped_invalid > 0 {
            output::warning(format!(
                "{} schedule(s) were invalid and skipped.",
                schedules.skipped_invalid
            ));
        }
        if schedules.guard_tripped > 0 {
            output::warning(format!(
                "{} schedule(s) hit the iteration guard before reaching the target.",
                schedules.guard_tripped
            ));
        }
    }

    fn settings(&mut self) -> Result<(), CliError> {
        loop {
            let auto_save = format!("Auto-save: {}", on_off(self.config.auto_save));
            let auto_process = format!(
                "Process schedules & interest at startup: {}",
                on_off(self.config.auto_process_on_startup)
            );
            let items = [auto_save.as_str(), auto_process.as_str(), "Back"];
            match io::select(&self.theme, "Settings", &items)? {
                0 => self.config.auto_save = !self.config.auto_save,
                1 => {
                    self.config.auto_process_on_startup = !self.config.auto_process_on_startup;
                }
                _ => break,
            }
            self.config_manager.save(&self.config)?;
        }
        Ok(())
    }

    fn quit(&mut self) -> Result<(), CliError> {
        if io::confirm(&self.theme, "Save before quitting?", true)? {
            self.save()?;
        }
        Ok(())
    }
}

use chrono::NaiveDate;
use finance_core::ledger::{Account, CategoryKey, InterestRule, Schedule, ScheduleRule};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn saving_account_with_rule(rate_pct: f64, monthly: bool, start: NaiveDate) -> Account {
    let mut account = Account::new();
    let key = account.ensure_category("Saving");
    account.post_transaction(date(2024, 1, 1), 1000.0, key.clone(), "seed");
    account.set_interest_rule(InterestRule::new(key, rate_pct, monthly, start));
    account
}

#[test]
fn interest_compounds_month_over_month_in_a_single_call() {
    let mut account = saving_account_with_rule(1.0, true, date(2024, 1, 1));

    let summary = account.apply_interest_up_to(date(2024, 3, 1));

    // Apply points Jan 1, Feb 1, Mar 1: each posting is computed on a
    // balance that already contains the previous ones.
    assert_eq!(summary.postings, 3);
    assert_eq!(summary.months_advanced, 3);
    let interest: Vec<&finance_core::ledger::Transaction> = account
        .transactions
        .iter()
        .filter(|tx| tx.note.starts_with("Interest"))
        .collect();
    assert_eq!(interest.len(), 3);
    assert_eq!(interest[0].date, date(2024, 1, 1));
    assert!((interest[0].amount - 10.0).abs() < 1e-9);
    assert_eq!(interest[1].date, date(2024, 2, 1));
    assert!((interest[1].amount - 10.1).abs() < 1e-9);
    assert_eq!(interest[2].date, date(2024, 3, 1));
    assert!((interest[2].amount - 10.201).abs() < 1e-9);
    assert!(
        interest[2].amount > interest[1].amount && interest[1].amount > interest[0].amount,
        "postings must grow month over month"
    );
    let key = CategoryKey::new("Saving");
    assert_eq!(account.interest[&key].next_apply, date(2024, 4, 1));
}

#[test]
fn applying_twice_with_the_same_target_posts_nothing_new() {
    let mut account = saving_account_with_rule(1.0, true, date(2024, 1, 1));
    account.apply_interest_up_to(date(2024, 3, 1));
    let count = account.transactions.len();
    let cursor = account.interest[&CategoryKey::new("Saving")].next_apply;

    let summary = account.apply_interest_up_to(date(2024, 3, 1));

    assert_eq!(summary.postings, 0);
    assert_eq!(summary.months_advanced, 0);
    assert_eq!(account.transactions.len(), count);
    assert_eq!(
        account.interest[&CategoryKey::new("Saving")].next_apply,
        cursor
    );
}

#[test]
fn an_earlier_target_is_also_a_noop() {
    let mut account = saving_account_with_rule(1.0, true, date(2024, 1, 1));
    account.apply_interest_up_to(date(2024, 3, 1));
    let count = account.transactions.len();

    let summary = account.apply_interest_up_to(date(2024, 2, 1));

    assert_eq!(summary.postings, 0);
    assert_eq!(account.transactions.len(), count);
}

#[test]
fn split_calls_accrue_exactly_what_one_call_would() {
    let mut split = saving_account_with_rule(1.0, true, date(2024, 1, 1));
    split.apply_interest_up_to(date(2024, 2, 1));
    split.apply_interest_up_to(date(2024, 4, 1));

    let mut single = saving_account_with_rule(1.0, true, date(2024, 1, 1));
    single.apply_interest_up_to(date(2024, 4, 1));

    assert_eq!(split.transactions.len(), single.transactions.len());
    for (a, b) in split.transactions.iter().zip(single.transactions.iter()) {
        assert_eq!(a.date, b.date);
        assert!(
            (a.amount - b.amount).abs() < 1e-9,
            "split {} vs single {} on {}",
            a.amount,
            b.amount,
            a.date
        );
    }
    let key = CategoryKey::new("Saving");
    assert_eq!(
        split.interest[&key].next_apply,
        single.interest[&key].next_apply
    );
}

#[test]
fn non_positive_balances_skip_the_posting_but_advance_the_cursor() {
    let mut account = Account::new();
    let key = account.ensure_category("Overdrawn");
    account.post_transaction(date(2024, 1, 1), -500.0, key.clone(), "debt");
    account.set_interest_rule(InterestRule::new(key.clone(), 1.0, true, date(2024, 1, 1)));

    let summary = account.apply_interest_up_to(date(2024, 2, 15));

    assert_eq!(summary.postings, 0);
    assert_eq!(summary.months_advanced, 2);
    assert_eq!(account.transactions.len(), 1);
    assert_eq!(account.interest[&key].next_apply, date(2024, 3, 1));
}

#[test]
fn rules_starting_in_the_future_contribute_nothing_yet() {
    let mut account = saving_account_with_rule(1.0, true, date(2024, 6, 1));

    let summary = account.apply_interest_up_to(date(2024, 3, 1));

    assert_eq!(summary.postings, 0);
    assert_eq!(summary.months_advanced, 0);
    assert_eq!(
        account.interest[&CategoryKey::new("Saving")].next_apply,
        date(2024, 6, 1)
    );
}

#[test]
fn annual_rates_accrue_at_a_twelfth_per_month() {
    let mut account = saving_account_with_rule(12.0, false, date(2024, 1, 1));

    account.apply_interest_up_to(date(2024, 1, 1));

    let interest: Vec<_> = account
        .transactions
        .iter()
        .filter(|tx| tx.note.starts_with("Interest"))
        .collect();
    assert_eq!(interest.len(), 1);
    assert!((interest[0].amount - 10.0).abs() < 1e-9);
    assert!(interest[0].note.contains("annual"));
}

#[test]
fn scheduled_deposits_inside_the_window_raise_the_accrued_balance() {
    let mut account = Account::new();
    let key = account.ensure_category("Saving");
    account.post_transaction(date(2024, 1, 1), 1000.0, key.clone(), "seed");
    account.add_schedule(
        Schedule::new(
            ScheduleRule::DayOfMonth(1),
            100.0,
            "top-up",
            date(2024, 2, 1),
        )
        .with_category(key.clone()),
    );
    account.set_interest_rule(InterestRule::new(key.clone(), 1.0, true, date(2024, 1, 1)));

    account.process_schedules_up_to(date(2024, 2, 1));
    account.apply_interest_up_to(date(2024, 2, 1));

    let interest: Vec<_> = account
        .transactions
        .iter()
        .filter(|tx| tx.note.starts_with("Interest"))
        .collect();
    assert_eq!(interest.len(), 2);
    // Jan 1: 1% of the 1000 seed.
    assert!((interest[0].amount - 10.0).abs() < 1e-9);
    // Feb 1: the scheduled 100 deposit dated Feb 1 is part of the balance.
    assert!((interest[1].amount - (1000.0 + 10.0 + 100.0) * 0.01).abs() < 1e-9);
}

#[test]
fn each_category_accrues_against_its_own_ledger_slice() {
    let mut account = Account::new();
    let saving = account.ensure_category("Saving");
    let emergency = account.ensure_category("Emergency");
    account.post_transaction(date(2024, 1, 1), 1000.0, saving.clone(), "seed");
    account.post_transaction(date(2024, 1, 1), 500.0, emergency.clone(), "seed");
    account.set_interest_rule(InterestRule::new(saving.clone(), 1.0, true, date(2024, 1, 1)));
    account.set_interest_rule(InterestRule::new(
        emergency.clone(),
        2.0,
        true,
        date(2024, 1, 1),
    ));

    let summary = account.apply_interest_up_to(date(2024, 1, 1));

    assert_eq!(summary.postings, 2);
    let saving_interest = account.balance_as_of(&saving, date(2024, 1, 1)) - 1000.0;
    let emergency_interest = account.balance_as_of(&emergency, date(2024, 1, 1)) - 500.0;
    assert!((saving_interest - 10.0).abs() < 1e-9);
    assert!((emergency_interest - 10.0).abs() < 1e-9);
}

#[test]
fn mid_month_start_dates_accrue_on_their_own_day() {
    let mut account = Account::new();
    let key = account.ensure_category("Saving");
    account.post_transaction(date(2024, 1, 1), 1000.0, key.clone(), "seed");
    account.set_interest_rule(InterestRule::new(key.clone(), 1.0, true, date(2024, 1, 15)));

    account.apply_interest_up_to(date(2024, 3, 20));

    let dates: Vec<_> = account
        .transactions
        .iter()
        .filter(|tx| tx.note.starts_with("Interest"))
        .map(|tx| tx.date)
        .collect();
    assert_eq!(
        dates,
        vec![date(2024, 1, 15), date(2024, 2, 15), date(2024, 3, 15)]
    );
    assert_eq!(account.interest[&key].next_apply, date(2024, 4, 15));
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{add_budget, add_expense, date, service, today};
use rust_decimal::Decimal;
use tallybook::models::{AlertThresholds, Budget, BudgetDraft};
use tallybook::period::{BudgetPeriod, DateRange};
use tallybook::service::BudgetHealth;

#[test]
fn period_windows_anchor_to_today() {
    let wed = today();
    assert_eq!(BudgetPeriod::Daily.window(wed), DateRange::new(wed, wed));
    assert_eq!(
        BudgetPeriod::Weekly.window(wed),
        DateRange::new(date(2025, 8, 11), date(2025, 8, 17))
    );
    assert_eq!(
        BudgetPeriod::Monthly.window(wed),
        DateRange::new(date(2025, 8, 1), date(2025, 8, 31))
    );
    assert_eq!(
        BudgetPeriod::Yearly.window(wed),
        DateRange::new(date(2025, 1, 1), date(2025, 12, 31))
    );
}

#[test]
fn weekly_window_on_sunday_and_monday() {
    let sunday = date(2025, 8, 17);
    assert_eq!(
        BudgetPeriod::Weekly.window(sunday),
        DateRange::new(date(2025, 8, 11), sunday)
    );
    let monday = date(2025, 8, 18);
    assert_eq!(BudgetPeriod::Weekly.window(monday).start, monday);
}

#[test]
fn february_window_handles_leap_years() {
    assert_eq!(
        BudgetPeriod::Monthly.window(date(2024, 2, 10)).end,
        date(2024, 2, 29)
    );
    assert_eq!(
        BudgetPeriod::Monthly.window(date(2025, 2, 10)).end,
        date(2025, 2, 28)
    );
}

#[test]
fn spent_equal_to_cap_reports_danger() {
    let mut svc = service();
    let b = add_budget(&mut svc, "food", 500, BudgetPeriod::Monthly);
    add_expense(&mut svc, 300, "food", date(2025, 8, 2));
    add_expense(&mut svc, 200, "food", date(2025, 8, 12));

    let s = svc.budget_status(&b.id).unwrap();
    assert_eq!(s.spent, Decimal::from(500));
    assert_eq!(s.remaining, Decimal::ZERO);
    assert_eq!(s.percent_spent, Decimal::ONE_HUNDRED);
    assert_eq!(s.status, BudgetHealth::Danger);
}

#[test]
fn warning_and_good_bands() {
    let mut svc = service();
    let b = add_budget(&mut svc, "food", 500, BudgetPeriod::Monthly);
    add_expense(&mut svc, 100, "food", date(2025, 8, 2));
    assert_eq!(svc.budget_status(&b.id).unwrap().status, BudgetHealth::Good);

    add_expense(&mut svc, 300, "food", date(2025, 8, 3));
    let s = svc.budget_status(&b.id).unwrap();
    assert_eq!(s.percent_spent, Decimal::from(80));
    assert_eq!(s.status, BudgetHealth::Warning);
    assert_eq!(s.remaining, Decimal::from(100));
}

#[test]
fn zero_cap_reads_as_fully_spent() {
    let mut svc = service();
    let b = add_budget(&mut svc, "gifts", 0, BudgetPeriod::Monthly);
    let s = svc.budget_status(&b.id).unwrap();
    assert_eq!(s.spent, Decimal::ZERO);
    assert_eq!(s.percent_spent, Decimal::ONE_HUNDRED);
    assert_eq!(s.status, BudgetHealth::Danger);

    add_expense(&mut svc, 75, "gifts", today());
    assert_eq!(
        svc.budget_status(&b.id).unwrap().percent_spent,
        Decimal::ONE_HUNDRED
    );
}

#[test]
fn only_expenses_inside_the_window_count() {
    let mut svc = service();
    let b = add_budget(&mut svc, "transport", 100, BudgetPeriod::Weekly);
    add_expense(&mut svc, 10, "transport", date(2025, 8, 10)); // previous Sunday
    add_expense(&mut svc, 20, "transport", date(2025, 8, 11));
    add_expense(&mut svc, 30, "transport", date(2025, 8, 17));
    add_expense(&mut svc, 40, "food", date(2025, 8, 12));

    let s = svc.budget_status(&b.id).unwrap();
    assert_eq!(s.spent, Decimal::from(50));
    assert_eq!(s.window, DateRange::new(date(2025, 8, 11), date(2025, 8, 17)));
}

#[test]
fn category_match_ignores_case() {
    let mut svc = service();
    let b = add_budget(&mut svc, "Food", 100, BudgetPeriod::Monthly);
    add_expense(&mut svc, 25, "food", today());
    assert_eq!(svc.budget_status(&b.id).unwrap().spent, Decimal::from(25));
}

#[test]
fn custom_thresholds_drive_status() {
    let mut svc = service();
    let b = svc
        .add::<Budget>(BudgetDraft {
            category: "fun".into(),
            amount: Decimal::from(200),
            alerts: Some(AlertThresholds::new(Decimal::from(50), Decimal::from(75)).unwrap()),
            ..Default::default()
        })
        .unwrap();
    add_expense(&mut svc, 150, "fun", today());
    assert_eq!(svc.budget_status(&b.id).unwrap().status, BudgetHealth::Danger);
}

#[test]
fn statuses_cover_every_budget_and_unknown_id_is_none() {
    let mut svc = service();
    add_budget(&mut svc, "food", 100, BudgetPeriod::Monthly);
    add_budget(&mut svc, "fun", 100, BudgetPeriod::Yearly);
    assert_eq!(svc.budget_statuses().len(), 2);
    assert!(svc.budget_status("missing").is_none());
}

#[test]
fn thresholds_reject_inverted_order() {
    assert!(AlertThresholds::new(Decimal::from(100), Decimal::from(80)).is_err());
    assert!(AlertThresholds::new(Decimal::from(80), Decimal::from(80)).is_err());
    assert!(AlertThresholds::new(Decimal::from(70), Decimal::from(90)).is_ok());
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{add_budget, add_expense, add_income, date, service, today};
use rust_decimal::Decimal;
use serde_json::json;
use tallybook::error::ServiceError;
use tallybook::insights::{
    analyze_financial_health, calculate_allocations, optimize_budget, over_budget_categories,
};
use tallybook::models::{
    Budget, BudgetDraft, BudgetPatch, Expense, ExpenseDraft, ExpensePatch, Income, IncomeDraft,
    IncomePatch, PaymentMethod, RecordKind,
};
use tallybook::period::{BudgetPeriod, DateRange, FixedClock};
use tallybook::service::{BudgetHealth, DataService};
use tallybook::settings::Settings;
use tallybook::store::{INCOME_KEY, MemoryBackend, Store};

fn recorder(svc: &mut DataService<MemoryBackend>) -> Rc<RefCell<Vec<RecordKind>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    svc.subscribe(move |kind| sink.borrow_mut().push(kind));
    seen
}

#[test]
fn add_applies_defaults_and_persists() {
    let mut svc = service();
    let rec = svc
        .add::<Expense>(ExpenseDraft {
            title: "  Coffee ".into(),
            amount: Decimal::new(450, 2),
            category: "food".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(rec.title, "Coffee");
    assert_eq!(rec.date, today());
    assert_eq!(rec.payment_method, PaymentMethod::Card);
    assert!(!rec.recurring);
    assert!(!rec.id.is_empty());

    let store = svc.close();
    let stored: Vec<Expense> = store.load(RecordKind::Expense.storage_key(), vec![]);
    assert_eq!(stored, vec![rec]);
}

#[test]
fn ids_are_unique_within_a_collection() {
    let mut svc = service();
    for i in 0..50 {
        add_income(&mut svc, i, "salary", today());
    }
    let mut ids: Vec<String> = svc.income().into_iter().map(|i| i.id).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
}

#[test]
fn list_returns_a_detached_copy() {
    let mut svc = service();
    add_income(&mut svc, 100, "salary", today());
    let mut copy = svc.income();
    copy[0].amount = Decimal::from(999);
    copy.clear();
    assert_eq!(svc.income().len(), 1);
    assert_eq!(svc.income()[0].amount, Decimal::from(100));
}

#[test]
fn update_touches_only_given_fields() {
    let mut svc = service();
    let rec = svc
        .add::<Income>(IncomeDraft {
            title: "Salary".into(),
            amount: Decimal::from(3000),
            category: "salary".into(),
            notes: Some("august".into()),
            tags: vec!["job".into()],
            ..Default::default()
        })
        .unwrap();

    let updated = svc
        .update::<Income>(
            &rec.id,
            IncomePatch {
                amount: Some(Decimal::from(3100)),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.amount, Decimal::from(3100));
    assert_eq!(updated.title, "Salary");
    assert_eq!(updated.notes, "august");
    assert!(updated.tags.contains("job"));
    assert_eq!(svc.find::<Income>(&rec.id), Some(updated));
}

#[test]
fn update_can_clear_optional_expense_fields() {
    let mut svc = service();
    let rec = svc
        .add::<Expense>(ExpenseDraft {
            title: "Dinner".into(),
            amount: Decimal::from(40),
            category: "food".into(),
            location: Some("Lisbon".into()),
            ..Default::default()
        })
        .unwrap();
    let updated = svc
        .update::<Expense>(
            &rec.id,
            ExpensePatch {
                location: Some(None),
                ..Default::default()
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(updated.location, None);
}

#[test]
fn update_unknown_id_is_none() {
    let mut svc = service();
    let seen = recorder(&mut svc);
    let r = svc
        .update::<Income>("missing", IncomePatch::default())
        .unwrap();
    assert!(r.is_none());
    assert!(seen.borrow().is_empty());
}

#[test]
fn delete_removes_first_match() {
    let mut svc = service();
    let a = add_expense(&mut svc, 10, "food", today());
    let b = add_expense(&mut svc, 20, "food", today());
    assert!(svc.delete::<Expense>(&a.id).unwrap());
    let left = svc.expenses();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].id, b.id);
}

#[test]
fn delete_missing_id_is_a_silent_no_op() {
    let mut svc = service();
    add_expense(&mut svc, 10, "food", today());
    let seen = recorder(&mut svc);
    assert!(!svc.delete::<Expense>("nope").unwrap());
    assert_eq!(svc.expenses().len(), 1);
    assert!(seen.borrow().is_empty());
}

#[test]
fn listeners_fire_once_per_mutation_with_kind() {
    let mut svc = service();
    let seen = recorder(&mut svc);
    let inc = add_income(&mut svc, 5, "gift", today());
    add_expense(&mut svc, 5, "food", today());
    add_budget(&mut svc, "food", 100, BudgetPeriod::Monthly);
    svc.delete::<Income>(&inc.id).unwrap();
    assert_eq!(
        *seen.borrow(),
        vec![
            RecordKind::Income,
            RecordKind::Expense,
            RecordKind::Budget,
            RecordKind::Income
        ]
    );
}

#[test]
fn unsubscribed_listener_is_silent() {
    let mut svc = service();
    let count = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&count);
    let id = svc.subscribe(move |_| *sink.borrow_mut() += 1);
    add_income(&mut svc, 1, "gift", today());
    assert!(svc.unsubscribe(id));
    assert!(!svc.unsubscribe(id));
    add_income(&mut svc, 1, "gift", today());
    assert_eq!(*count.borrow(), 1);
}

#[test]
fn validation_failures_leave_state_untouched() {
    let mut svc = service();
    let seen = recorder(&mut svc);
    let err = svc
        .add::<Income>(IncomeDraft {
            title: "".into(),
            amount: Decimal::from(10),
            category: "salary".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = svc
        .add::<Expense>(ExpenseDraft {
            title: "Refund?".into(),
            amount: Decimal::from(-5),
            category: "food".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    assert!(svc.income().is_empty());
    assert!(svc.expenses().is_empty());
    assert!(seen.borrow().is_empty());
}

#[test]
fn budget_thresholds_must_be_ordered() {
    let mut svc = service();
    let b = add_budget(&mut svc, "food", 300, BudgetPeriod::Monthly);
    let bad = tallybook::models::AlertThresholds {
        warning: Decimal::from(90),
        danger: Decimal::from(90),
    };
    let err = svc
        .update::<Budget>(
            &b.id,
            BudgetPatch {
                alerts: Some(bad),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(svc.find::<Budget>(&b.id).unwrap().alerts, b.alerts);
}

#[test]
fn one_budget_per_category() {
    let mut svc = service();
    let food = add_budget(&mut svc, "food", 300, BudgetPeriod::Monthly);
    let err = svc
        .add::<Budget>(BudgetDraft {
            category: "Food".into(),
            amount: Decimal::from(50),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateBudget(_)));

    let fun = add_budget(&mut svc, "fun", 80, BudgetPeriod::Weekly);
    let err = svc
        .update::<Budget>(
            &fun.id,
            BudgetPatch {
                category: Some("food".into()),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateBudget(_)));

    // Updating a budget without changing its category is fine.
    let same = svc
        .update::<Budget>(
            &food.id,
            BudgetPatch {
                amount: Some(Decimal::from(350)),
                ..Default::default()
            },
        )
        .unwrap();
    assert!(same.is_some());
}

#[test]
fn storage_failure_rolls_back_and_stays_silent() {
    let mut svc = DataService::open_with_clock(
        Store::new(MemoryBackend::with_quota(64)),
        FixedClock::new(today()),
    );
    let seen = recorder(&mut svc);
    let err = add_income_result(&mut svc);
    assert!(matches!(err, Err(ServiceError::Storage(RecordKind::Income))));
    assert!(svc.income().is_empty());
    assert!(seen.borrow().is_empty());
    assert!(!svc.store().exists(INCOME_KEY));
}

fn add_income_result(svc: &mut DataService<MemoryBackend>) -> Result<Income, ServiceError> {
    svc.add::<Income>(IncomeDraft {
        title: "A fairly long title that will not fit in the tiny quota".into(),
        amount: Decimal::from(1),
        category: "salary".into(),
        ..Default::default()
    })
}

#[test]
fn collections_reload_on_open() {
    let mut svc = service();
    add_income(&mut svc, 100, "salary", today());
    add_expense(&mut svc, 40, "food", today());
    add_budget(&mut svc, "food", 200, BudgetPeriod::Monthly);
    let before = svc.export_data();

    let reopened = DataService::open_with_clock(svc.close(), FixedClock::new(today()));
    assert_eq!(reopened.export_data(), before);
}

#[test]
fn total_without_range_sums_everything() {
    let mut svc = service();
    for (amt, d) in [(10, 1), (25, 5), (65, 20)] {
        add_expense(&mut svc, amt, "food", date(2025, 7, d));
    }
    assert_eq!(svc.total_of(RecordKind::Expense, None), Decimal::from(100));
    assert_eq!(svc.total_of(RecordKind::Income, None), Decimal::ZERO);
}

#[test]
fn total_range_is_inclusive() {
    let mut svc = service();
    add_expense(&mut svc, 1, "food", date(2025, 7, 31));
    add_expense(&mut svc, 2, "food", date(2025, 8, 1));
    add_expense(&mut svc, 4, "food", date(2025, 8, 31));
    add_expense(&mut svc, 8, "food", date(2025, 9, 1));
    let aug = DateRange::new(date(2025, 8, 1), date(2025, 8, 31));
    assert_eq!(svc.total_of(RecordKind::Expense, Some(aug)), Decimal::from(6));
}

#[test]
fn by_category_partitions_the_total() {
    let mut svc = service();
    add_expense(&mut svc, 30, "food", date(2025, 8, 2));
    add_expense(&mut svc, 12, "food", date(2025, 8, 9));
    add_expense(&mut svc, 50, "transport", date(2025, 8, 3));
    add_expense(&mut svc, 70, "housing", date(2025, 6, 3));
    let aug = DateRange::month(2025, 8);

    let groups = svc.by_category(RecordKind::Expense, aug);
    assert_eq!(groups.len(), 2);
    assert_eq!(groups["food"], Decimal::from(42));
    let sum: Decimal = groups.values().copied().sum();
    assert_eq!(sum, svc.total_of(RecordKind::Expense, aug));
}

#[test]
fn monthly_summary_computes_savings_rate() {
    let mut svc = service();
    add_income(&mut svc, 2000, "salary", date(2025, 8, 1));
    add_expense(&mut svc, 500, "housing", date(2025, 8, 2));
    add_expense(&mut svc, 300, "food", date(2025, 8, 3));
    add_expense(&mut svc, 999, "food", date(2025, 7, 3));

    let s = svc.current_month_summary();
    assert_eq!(s.total_income, Decimal::from(2000));
    assert_eq!(s.total_expenses, Decimal::from(800));
    assert_eq!(s.balance, Decimal::from(1200));
    assert_eq!(s.savings_rate, Decimal::from(60));
    assert_eq!(s.expenses_by_category["food"], Decimal::from(300));

    let empty = svc.monthly_summary(2024, 1).unwrap();
    assert_eq!(empty.savings_rate, Decimal::ZERO);
    assert!(svc.monthly_summary(2025, 13).is_none());
}

#[test]
fn monthly_trend_is_oldest_first() {
    let mut svc = service();
    add_income(&mut svc, 100, "salary", date(2025, 6, 10));
    add_expense(&mut svc, 40, "food", date(2025, 8, 1));
    let trend = svc.monthly_trend(3);
    let months: Vec<(i32, u32)> = trend.iter().map(|t| (t.year, t.month)).collect();
    assert_eq!(months, vec![(2025, 6), (2025, 7), (2025, 8)]);
    assert_eq!(trend[0].income, Decimal::from(100));
    assert_eq!(trend[2].expenses, Decimal::from(40));
}

#[test]
fn recent_sorts_newest_first() {
    let mut svc = service();
    add_expense(&mut svc, 1, "food", date(2025, 8, 1));
    add_expense(&mut svc, 2, "food", date(2025, 8, 10));
    add_expense(&mut svc, 3, "food", date(2025, 8, 5));
    let recent = svc.recent::<Expense>(2);
    let amounts: Vec<Decimal> = recent.iter().map(|e| e.amount).collect();
    assert_eq!(amounts, vec![Decimal::from(2), Decimal::from(3)]);
}

#[test]
fn clear_all_empties_every_collection() {
    let mut svc = service();
    add_income(&mut svc, 1, "gift", today());
    add_expense(&mut svc, 1, "food", today());
    add_budget(&mut svc, "food", 1, BudgetPeriod::Daily);
    let seen = recorder(&mut svc);
    svc.clear_all().unwrap();
    assert_eq!(svc.export_data(), Default::default());
    assert_eq!(seen.borrow().len(), 3);
}

#[test]
fn mixed_case_categories_share_one_identity() {
    let mut svc = service();
    let b = add_budget(&mut svc, "food", 500, BudgetPeriod::Monthly);
    add_expense(&mut svc, 300, "Food", date(2025, 8, 3));
    add_expense(&mut svc, 300, " food ", date(2025, 8, 4));
    assert!(svc.expenses().iter().all(|e| e.category == "food"));

    assert_eq!(svc.budget_status(&b.id).unwrap().spent, Decimal::from(600));
    let summary = svc.monthly_summary(2025, 8).unwrap();
    assert_eq!(summary.expenses_by_category.len(), 1);
    assert_eq!(summary.expenses_by_category["food"], Decimal::from(600));

    let over = over_budget_categories(&summary, &svc.budgets_by_category());
    assert_eq!(over.len(), 1);
    assert_eq!(over[0].percent_spent, Decimal::from(120));
}

#[test]
fn imported_mixed_case_categories_group_together() {
    let mut src = service();
    add_budget(&mut src, "food", 500, BudgetPeriod::Monthly);
    add_expense(&mut src, 300, "food", date(2025, 8, 3));
    add_expense(&mut src, 300, "food", date(2025, 8, 4));
    let mut doc = serde_json::to_value(src.export_data()).unwrap();
    doc["expenses"][0]["category"] = json!("Food");
    doc["budgets"][0]["category"] = json!("FOOD");

    let mut svc = service();
    assert!(svc.import_data(&doc));
    let groups = svc.by_category(RecordKind::Expense, None);
    assert_eq!(groups.len(), 1);
    assert_eq!(groups["food"], Decimal::from(600));

    let budget_id = svc.budgets()[0].id.clone();
    let status = svc.budget_status(&budget_id).unwrap();
    assert_eq!(status.spent, Decimal::from(600));
    assert_eq!(status.status, BudgetHealth::Danger);

    let summary = svc.monthly_summary(2025, 8).unwrap();
    let over = over_budget_categories(&summary, &svc.budgets_by_category());
    assert_eq!(over.len(), 1);
    assert_eq!(over[0].category, "food");
}

#[test]
fn budget_uniqueness_folds_non_ascii_case() {
    let mut svc = service();
    add_budget(&mut svc, "Épicerie", 200, BudgetPeriod::Monthly);
    assert_eq!(svc.budgets()[0].category, "épicerie");

    let err = svc
        .add::<Budget>(BudgetDraft {
            category: "ÉPICERIE".into(),
            amount: Decimal::from(5),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, ServiceError::DuplicateBudget(_)));
    assert_eq!(svc.budgets().len(), 1);
}

#[test]
fn extreme_amounts_saturate_instead_of_panicking() {
    let mut svc = service();
    let b = svc
        .add::<Budget>(BudgetDraft {
            category: "food".into(),
            amount: Decimal::new(1, 20),
            ..Default::default()
        })
        .unwrap();
    add_expense(&mut svc, 10_000_000_000, "food", today());
    let status = svc.budget_status(&b.id).unwrap();
    assert_eq!(status.status, BudgetHealth::Danger);
    assert_eq!(status.remaining, Decimal::ZERO);

    for _ in 0..2 {
        svc.add::<Income>(IncomeDraft {
            title: "windfall".into(),
            amount: Decimal::MAX,
            category: "gift".into(),
            ..Default::default()
        })
        .unwrap();
    }
    assert_eq!(svc.total_of(RecordKind::Income, None), Decimal::MAX);

    let summary = svc.current_month_summary();
    assert_eq!(summary.total_income, Decimal::MAX);
    assert!(analyze_financial_health(&summary).score <= 100);
    let a = calculate_allocations(Decimal::MAX, &Settings::default());
    assert!(a.savings > Decimal::ZERO);
    assert!(optimize_budget(&summary, Decimal::new(2, 1)).is_some());
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tallybook::models::{
    Budget, BudgetDraft, Expense, ExpenseDraft, Income, IncomeDraft,
};
use tallybook::period::{BudgetPeriod, FixedClock};
use tallybook::service::DataService;
use tallybook::store::{MemoryBackend, Store};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Wednesday 2025-08-13.
pub fn today() -> NaiveDate {
    date(2025, 8, 13)
}

pub fn service() -> DataService<MemoryBackend> {
    DataService::open_with_clock(Store::new(MemoryBackend::new()), FixedClock::new(today()))
}

pub fn add_income(svc: &mut DataService<MemoryBackend>, amount: i64, category: &str, on: NaiveDate) -> Income {
    svc.add::<Income>(IncomeDraft {
        title: format!("{} income", category),
        amount: Decimal::from(amount),
        category: category.into(),
        date: Some(on),
        ..Default::default()
    })
    .unwrap()
}

pub fn add_expense(svc: &mut DataService<MemoryBackend>, amount: i64, category: &str, on: NaiveDate) -> Expense {
    svc.add::<Expense>(ExpenseDraft {
        title: format!("{} spend", category),
        amount: Decimal::from(amount),
        category: category.into(),
        date: Some(on),
        ..Default::default()
    })
    .unwrap()
}

pub fn add_budget(
    svc: &mut DataService<MemoryBackend>,
    category: &str,
    amount: i64,
    period: BudgetPeriod,
) -> Budget {
    svc.add::<Budget>(BudgetDraft {
        category: category.into(),
        amount: Decimal::from(amount),
        period: Some(period),
        ..Default::default()
    })
    .unwrap()
}

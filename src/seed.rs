// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::ServiceError;
use crate::models::{
    Budget, BudgetDraft, Expense, ExpenseDraft, Income, IncomeDraft, PaymentMethod, Recurrence,
};
use crate::period::BudgetPeriod;
use crate::service::DataService;
use crate::store::Backend;

fn day(anchor: NaiveDate, d: u32) -> NaiveDate {
    anchor.with_day(d).unwrap_or(anchor)
}

/// Populates an empty service with a month of sample records dated in the
/// current month. Does nothing if any collection already has data.
/// Returns the number of records added.
pub fn seed_demo<B: Backend>(service: &mut DataService<B>) -> Result<usize, ServiceError> {
    if !service.income().is_empty()
        || !service.expenses().is_empty()
        || !service.budgets().is_empty()
    {
        return Ok(0);
    }
    let today = service.clock().today();
    let mut added = 0;

    let income = [
        ("Monthly salary", 4200, "salary", 1, Recurrence::Monthly),
        ("Logo design", 650, "freelance", 12, Recurrence::None),
        ("Dividends", 85, "investment", 20, Recurrence::None),
    ];
    for (title, amount, category, d, recurrence) in income {
        service.add::<Income>(IncomeDraft {
            title: title.into(),
            amount: Decimal::from(amount),
            category: category.into(),
            date: Some(day(today, d)),
            recurrence: Some(recurrence),
            ..Default::default()
        })?;
        added += 1;
    }

    let expenses = [
        ("Rent", 1400, "housing", 1, PaymentMethod::BankTransfer),
        ("Groceries", 320, "food", 3, PaymentMethod::Card),
        ("Electricity", 95, "utilities", 5, PaymentMethod::BankTransfer),
        ("Bus pass", 60, "transport", 6, PaymentMethod::Mobile),
        ("Cinema", 28, "entertainment", 9, PaymentMethod::Cash),
        ("Restaurant", 74, "food", 14, PaymentMethod::Card),
        ("Pharmacy", 23, "healthcare", 17, PaymentMethod::Card),
    ];
    for (title, amount, category, d, method) in expenses {
        service.add::<Expense>(ExpenseDraft {
            title: title.into(),
            amount: Decimal::from(amount),
            category: category.into(),
            date: Some(day(today, d)),
            payment_method: Some(method),
            ..Default::default()
        })?;
        added += 1;
    }

    let budgets = [
        ("housing", 1400, BudgetPeriod::Monthly),
        ("food", 450, BudgetPeriod::Monthly),
        ("entertainment", 100, BudgetPeriod::Monthly),
        ("transport", 20, BudgetPeriod::Weekly),
    ];
    for (category, amount, period) in budgets {
        service.add::<Budget>(BudgetDraft {
            category: category.into(),
            amount: Decimal::from(amount),
            period: Some(period),
            start_date: Some(day(today, 1)),
            ..Default::default()
        })?;
        added += 1;
    }

    info!(added, "demo data seeded");
    Ok(added)
}

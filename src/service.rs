// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! In-memory owner of the income, expense and budget collections.
//!
//! Every mutation is written through to the [`Store`] before it becomes
//! visible, and listeners hear about it only after the write succeeded.

use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::ServiceError;
use crate::insights::MonthlySummary;
use crate::models::{
    Budget, Expense, Income, Record, RecordKind, category_key, generate_id, percent_of,
    same_category, sum_amounts,
};
use crate::period::{BudgetPeriod, Clock, DateRange, SystemClock};
use crate::store::{Backend, Store};

/// Plain snapshot of all three collections; also the export format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub income: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
}

impl Dataset {
    fn has_duplicate_budgets(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.budgets
            .iter()
            .find(|b| !seen.insert(category_key(&b.category)))
            .map(|b| b.category.as_str())
    }
}

/// A record kind that lives in a [`Dataset`] slot.
pub trait Collection: Record {
    fn slot(data: &Dataset) -> &Vec<Self>;
    fn slot_mut(data: &mut Dataset) -> &mut Vec<Self>;

    /// Rejects `candidate` if it clashes with the other records of its kind.
    fn check_conflicts(_others: &[Self], _candidate: &Self) -> Result<(), ServiceError> {
        Ok(())
    }
}

impl Collection for Income {
    fn slot(data: &Dataset) -> &Vec<Self> {
        &data.income
    }
    fn slot_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.income
    }
}

impl Collection for Expense {
    fn slot(data: &Dataset) -> &Vec<Self> {
        &data.expenses
    }
    fn slot_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.expenses
    }
}

impl Collection for Budget {
    fn slot(data: &Dataset) -> &Vec<Self> {
        &data.budgets
    }
    fn slot_mut(data: &mut Dataset) -> &mut Vec<Self> {
        &mut data.budgets
    }

    // One budget per category key.
    fn check_conflicts(others: &[Self], candidate: &Self) -> Result<(), ServiceError> {
        let clash = others
            .iter()
            .any(|b| b.id != candidate.id && same_category(&b.category, &candidate.category));
        if clash {
            return Err(ServiceError::DuplicateBudget(candidate.category.clone()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(RecordKind)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetHealth {
    Good,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    pub budget_id: String,
    pub category: String,
    pub period: BudgetPeriod,
    pub window: DateRange,
    pub amount: Decimal,
    pub spent: Decimal,
    pub remaining: Decimal,
    pub percent_spent: Decimal,
    pub status: BudgetHealth,
}

impl BudgetStatus {
    /// Spend of `budget.category` inside the period window containing `today`.
    pub fn compute(budget: &Budget, expenses: &[Expense], today: NaiveDate) -> Self {
        let window = budget.period.window(today);
        let spent = sum_amounts(
            expenses
                .iter()
                .filter(|e| same_category(&e.category, &budget.category))
                .filter(|e| window.contains(e.date))
                .map(|e| e.amount),
        );
        let remaining = budget.amount.saturating_sub(spent).max(Decimal::ZERO);
        // An unset cap reads as fully spent.
        let percent_spent = if budget.amount.is_zero() {
            Decimal::ONE_HUNDRED
        } else {
            percent_of(spent, budget.amount)
        };
        let status = if percent_spent >= budget.alerts.danger {
            BudgetHealth::Danger
        } else if percent_spent >= budget.alerts.warning {
            BudgetHealth::Warning
        } else {
            BudgetHealth::Good
        };
        Self {
            budget_id: budget.id.clone(),
            category: budget.category.clone(),
            period: budget.period,
            window,
            amount: budget.amount,
            spent,
            remaining,
            percent_spent,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthTotals {
    pub year: i32,
    pub month: u32,
    pub income: Decimal,
    pub expenses: Decimal,
}

pub struct DataService<B: Backend> {
    store: Store<B>,
    data: Dataset,
    clock: Box<dyn Clock>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl<B: Backend> DataService<B> {
    pub fn open(store: Store<B>) -> Self {
        Self::open_with_clock(store, SystemClock)
    }

    /// Loads all three collections eagerly. Absent or corrupt keys load as empty.
    pub fn open_with_clock(store: Store<B>, clock: impl Clock + 'static) -> Self {
        let data = Dataset {
            income: store.load(RecordKind::Income.storage_key(), Vec::new()),
            expenses: store.load(RecordKind::Expense.storage_key(), Vec::new()),
            budgets: store.load(RecordKind::Budget.storage_key(), Vec::new()),
        };
        debug!(
            income = data.income.len(),
            expenses = data.expenses.len(),
            budgets = data.budgets.len(),
            "data service opened"
        );
        Self {
            store,
            data,
            clock: Box::new(clock),
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    /// Drops listeners and hands the store back.
    pub fn close(self) -> Store<B> {
        self.store
    }

    pub fn store(&self) -> &Store<B> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut Store<B> {
        &mut self.store
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(RecordKind) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self, kind: RecordKind) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(kind);
        }
    }

    /// Persists `next` as the whole collection, then swaps it in and notifies.
    fn commit<T: Collection>(&mut self, next: Vec<T>) -> Result<(), ServiceError> {
        if !self.store.save(T::KIND.storage_key(), &next) {
            return Err(ServiceError::Storage(T::KIND));
        }
        *T::slot_mut(&mut self.data) = next;
        self.notify(T::KIND);
        Ok(())
    }

    pub fn list<T: Collection>(&self) -> Vec<T> {
        T::slot(&self.data).clone()
    }

    pub fn income(&self) -> Vec<Income> {
        self.list()
    }

    pub fn expenses(&self) -> Vec<Expense> {
        self.list()
    }

    pub fn budgets(&self) -> Vec<Budget> {
        self.list()
    }

    pub fn find<T: Collection>(&self, id: &str) -> Option<T> {
        T::slot(&self.data).iter().find(|r| r.id() == id).cloned()
    }

    /// Newest `n` records by date.
    pub fn recent<T: Collection>(&self, n: usize) -> Vec<T> {
        let mut records = self.list::<T>();
        records.sort_by(|a, b| b.date().cmp(&a.date()));
        records.truncate(n);
        records
    }

    pub fn add<T: Collection>(&mut self, draft: T::Draft) -> Result<T, ServiceError> {
        let record = T::from_draft(generate_id(), draft, self.clock.as_ref());
        record.validate()?;
        let current = T::slot(&self.data);
        T::check_conflicts(current, &record)?;
        let mut next = current.clone();
        next.push(record.clone());
        self.commit(next)?;
        debug!(kind = %T::KIND, id = record.id(), "record added");
        Ok(record)
    }

    /// Applies only the fields set in `patch`. `Ok(None)` if `id` is unknown.
    pub fn update<T: Collection>(
        &mut self,
        id: &str,
        patch: T::Patch,
    ) -> Result<Option<T>, ServiceError> {
        let current = T::slot(&self.data);
        let Some(pos) = current.iter().position(|r| r.id() == id) else {
            return Ok(None);
        };
        let mut record = current[pos].clone();
        record.apply(patch, self.clock.as_ref());
        record.validate()?;
        T::check_conflicts(current, &record)?;
        let mut next = current.clone();
        next[pos] = record.clone();
        self.commit(next)?;
        debug!(kind = %T::KIND, id, "record updated");
        Ok(Some(record))
    }

    /// Removes the first record with `id`. `Ok(false)` without side effects if absent.
    pub fn delete<T: Collection>(&mut self, id: &str) -> Result<bool, ServiceError> {
        let current = T::slot(&self.data);
        let Some(pos) = current.iter().position(|r| r.id() == id) else {
            return Ok(false);
        };
        let mut next = current.clone();
        next.remove(pos);
        self.commit(next)?;
        debug!(kind = %T::KIND, id, "record deleted");
        Ok(true)
    }

    fn total<T: Collection>(&self, range: Option<DateRange>) -> Decimal {
        sum_amounts(
            T::slot(&self.data)
                .iter()
                .filter(|r| range.is_none_or(|w| w.contains(r.date())))
                .map(|r| r.amount()),
        )
    }

    fn grouped<T: Collection>(&self, range: Option<DateRange>) -> BTreeMap<String, Decimal> {
        let mut out = BTreeMap::new();
        for r in T::slot(&self.data)
            .iter()
            .filter(|r| range.is_none_or(|w| w.contains(r.date())))
        {
            let total = out.entry(category_key(r.category())).or_insert(Decimal::ZERO);
            *total = total.saturating_add(r.amount());
        }
        out
    }

    /// Sum of `amount` over records dated inside `range` (inclusive), or all records.
    pub fn total_of(&self, kind: RecordKind, range: Option<DateRange>) -> Decimal {
        match kind {
            RecordKind::Income => self.total::<Income>(range),
            RecordKind::Expense => self.total::<Expense>(range),
            RecordKind::Budget => self.total::<Budget>(range),
        }
    }

    pub fn by_category(
        &self,
        kind: RecordKind,
        range: Option<DateRange>,
    ) -> BTreeMap<String, Decimal> {
        match kind {
            RecordKind::Income => self.grouped::<Income>(range),
            RecordKind::Expense => self.grouped::<Expense>(range),
            RecordKind::Budget => self.grouped::<Budget>(range),
        }
    }

    pub fn budgets_by_category(&self) -> BTreeMap<String, Decimal> {
        let mut out = BTreeMap::new();
        for b in &self.data.budgets {
            out.entry(category_key(&b.category)).or_insert(b.amount);
        }
        out
    }

    pub fn budget_status(&self, id: &str) -> Option<BudgetStatus> {
        let today = self.clock.today();
        self.data
            .budgets
            .iter()
            .find(|b| b.id == id)
            .map(|b| BudgetStatus::compute(b, &self.data.expenses, today))
    }

    pub fn budget_statuses(&self) -> Vec<BudgetStatus> {
        let today = self.clock.today();
        self.data
            .budgets
            .iter()
            .map(|b| BudgetStatus::compute(b, &self.data.expenses, today))
            .collect()
    }

    pub fn monthly_summary(&self, year: i32, month: u32) -> Option<MonthlySummary> {
        let range = DateRange::month(year, month)?;
        let total_income = self.total::<Income>(Some(range));
        let total_expenses = self.total::<Expense>(Some(range));
        Some(MonthlySummary::new(
            total_income,
            total_expenses,
            self.grouped::<Expense>(Some(range)),
        ))
    }

    pub fn current_month_summary(&self) -> MonthlySummary {
        let today = self.clock.today();
        self.monthly_summary(today.year(), today.month())
            .unwrap_or_default()
    }

    /// Income and expense totals for the last `months` calendar months, oldest first.
    pub fn monthly_trend(&self, months: usize) -> Vec<MonthTotals> {
        let today = self.clock.today();
        let Some(anchor) = today.with_day(1) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(months);
        for back in (0..months).rev() {
            let Some(first) = anchor.checked_sub_months(Months::new(back as u32)) else {
                continue;
            };
            let Some(range) = DateRange::month(first.year(), first.month()) else {
                continue;
            };
            out.push(MonthTotals {
                year: first.year(),
                month: first.month(),
                income: self.total::<Income>(Some(range)),
                expenses: self.total::<Expense>(Some(range)),
            });
        }
        out
    }

    pub fn export_data(&self) -> Dataset {
        self.data.clone()
    }

    /// Replaces all three collections. Rejected without changes if any of
    /// `income`, `expenses`, `budgets` is missing or malformed, or if the
    /// budgets repeat a category.
    ///
    /// Kinds are persisted one after another; a storage failure midway
    /// leaves the earlier kinds replaced.
    pub fn import_data(&mut self, payload: &Value) -> bool {
        let missing: Vec<&str> = ["income", "expenses", "budgets"]
            .into_iter()
            .filter(|k| !payload.get(*k).is_some_and(Value::is_array))
            .collect();
        if !missing.is_empty() {
            warn!(?missing, "import rejected: missing collections");
            return false;
        }
        let data: Dataset = match serde_json::from_value(payload.clone()) {
            Ok(d) => d,
            Err(e) => {
                warn!(error = %e, "import rejected: malformed records");
                return false;
            }
        };
        if let Some(category) = data.has_duplicate_budgets() {
            warn!(category, "import rejected: duplicate budget category");
            return false;
        }
        let Dataset {
            income,
            expenses,
            budgets,
        } = data;
        let ok = self.commit(income).is_ok()
            && self.commit(expenses).is_ok()
            && self.commit(budgets).is_ok();
        if ok {
            let d = &self.data;
            info!(
                income = d.income.len(),
                expenses = d.expenses.len(),
                budgets = d.budgets.len(),
                "import complete"
            );
        } else {
            warn!("import stopped: storage failure");
        }
        ok
    }

    pub fn import_json(&mut self, text: &str) -> bool {
        match serde_json::from_str::<Value>(text) {
            Ok(v) => self.import_data(&v),
            Err(e) => {
                warn!(error = %e, "import rejected: invalid JSON");
                false
            }
        }
    }

    pub fn clear_all(&mut self) -> Result<(), ServiceError> {
        self.commit(Vec::<Income>::new())?;
        self.commit(Vec::<Expense>::new())?;
        self.commit(Vec::<Budget>::new())?;
        Ok(())
    }
}

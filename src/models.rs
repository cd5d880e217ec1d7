// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::period::{BudgetPeriod, Clock};

pub const INCOME_CATEGORIES: &[&str] = &[
    "salary",
    "freelance",
    "investment",
    "business",
    "rental",
    "gift",
    "other",
];

pub const EXPENSE_CATEGORIES: &[&str] = &[
    "food",
    "transport",
    "housing",
    "utilities",
    "healthcare",
    "entertainment",
    "shopping",
    "education",
    "insurance",
    "personal",
    "travel",
    "other",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Income,
    Expense,
    Budget,
}

impl RecordKind {
    pub fn storage_key(self) -> &'static str {
        match self {
            RecordKind::Income => crate::store::INCOME_KEY,
            RecordKind::Expense => crate::store::EXPENSES_KEY,
            RecordKind::Budget => crate::store::BUDGETS_KEY,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Income => "income",
            RecordKind::Expense => "expense",
            RecordKind::Budget => "budget",
        })
    }
}

/// Canonical category spelling: trimmed and lowercased. Records store it,
/// and grouping, budget matching and uniqueness all compare through it.
pub fn category_key(category: &str) -> String {
    category.trim().to_lowercase()
}

pub fn same_category(a: &str, b: &str) -> bool {
    category_key(a) == category_key(b)
}

/// Sum that saturates at the `Decimal` bounds instead of panicking.
pub fn sum_amounts<I: IntoIterator<Item = Decimal>>(amounts: I) -> Decimal {
    amounts
        .into_iter()
        .fold(Decimal::ZERO, |acc, a| acc.saturating_add(a))
}

/// `part / whole * 100`, saturating when the quotient is not representable.
pub fn percent_of(part: Decimal, whole: Decimal) -> Decimal {
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if part.is_sign_negative() == whole.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// Client-side id: hex millisecond timestamp plus a random lowercase suffix.
pub fn generate_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("{:x}{}", Utc::now().timestamp_millis(), suffix)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recurrence {
    #[default]
    None,
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Recurrence {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "" => Some(Recurrence::None),
            "daily" => Some(Recurrence::Daily),
            "weekly" => Some(Recurrence::Weekly),
            "monthly" => Some(Recurrence::Monthly),
            "yearly" => Some(Recurrence::Yearly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    #[default]
    Card,
    BankTransfer,
    Mobile,
    Other,
}

impl PaymentMethod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" | "bank" => Some(PaymentMethod::BankTransfer),
            "mobile" => Some(PaymentMethod::Mobile),
            "other" => Some(PaymentMethod::Other),
            _ => None,
        }
    }
}

/// Percent-of-cap levels at which a budget turns `warning` and then `danger`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertThresholds {
    pub warning: Decimal,
    pub danger: Decimal,
}

impl AlertThresholds {
    pub fn new(warning: Decimal, danger: Decimal) -> Result<Self, ServiceError> {
        let t = Self { warning, danger };
        t.validate()?;
        Ok(t)
    }

    fn validate(&self) -> Result<(), ServiceError> {
        if self.warning < Decimal::ZERO || self.warning >= self.danger {
            return Err(ServiceError::Validation(format!(
                "warning threshold {} must be below danger threshold {}",
                self.warning, self.danger
            )));
        }
        Ok(())
    }
}

impl Default for AlertThresholds {
    fn default() -> Self {
        Self {
            warning: Decimal::from(80),
            danger: Decimal::ONE_HUNDRED,
        }
    }
}

/// Shared behaviour of the three persisted record kinds.
pub trait Record: Clone + fmt::Debug + Serialize + DeserializeOwned {
    const KIND: RecordKind;
    type Draft;
    type Patch;

    fn from_draft(id: String, draft: Self::Draft, clock: &dyn Clock) -> Self;
    fn apply(&mut self, patch: Self::Patch, clock: &dyn Clock);
    fn validate(&self) -> Result<(), ServiceError>;

    fn id(&self) -> &str;
    /// Human-readable name: the title, or the category for budgets.
    fn label(&self) -> &str;
    fn category(&self) -> &str;
    fn amount(&self) -> Decimal;
    fn date(&self) -> NaiveDate;
}

fn require_text(field: &str, value: &str) -> Result<(), ServiceError> {
    if value.trim().is_empty() {
        return Err(ServiceError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

fn require_non_negative(amount: Decimal) -> Result<(), ServiceError> {
    if amount < Decimal::ZERO {
        return Err(ServiceError::Validation(format!(
            "amount must not be negative (got {})",
            amount
        )));
    }
    Ok(())
}

fn clean_tags<I: IntoIterator<Item = String>>(tags: I) -> BTreeSet<String> {
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Income {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_interval: Recurrence,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomeDraft {
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct IncomePatch {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl Record for Income {
    const KIND: RecordKind = RecordKind::Income;
    type Draft = IncomeDraft;
    type Patch = IncomePatch;

    fn from_draft(id: String, d: IncomeDraft, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let recurrence = d.recurrence.unwrap_or_default();
        Self {
            id,
            title: d.title.trim().to_string(),
            amount: d.amount,
            category: category_key(&d.category),
            date: d.date.unwrap_or_else(|| clock.today()),
            recurring: recurrence != Recurrence::None,
            recurrence_interval: recurrence,
            notes: d.notes.unwrap_or_default(),
            source: d.source.unwrap_or_default(),
            tags: clean_tags(d.tags),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, p: IncomePatch, clock: &dyn Clock) {
        if let Some(v) = p.title {
            self.title = v.trim().to_string();
        }
        if let Some(v) = p.amount {
            self.amount = v;
        }
        if let Some(v) = p.category {
            self.category = category_key(&v);
        }
        if let Some(v) = p.date {
            self.date = v;
        }
        if let Some(v) = p.recurrence {
            self.recurring = v != Recurrence::None;
            self.recurrence_interval = v;
        }
        if let Some(v) = p.notes {
            self.notes = v;
        }
        if let Some(v) = p.source {
            self.source = v;
        }
        if let Some(v) = p.tags {
            self.tags = clean_tags(v);
        }
        self.updated_at = clock.now();
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        require_non_negative(self.amount)
    }

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub recurring: bool,
    #[serde(default)]
    pub recurrence_interval: Recurrence,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    /// Opaque reference to a stored receipt (file name or data URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub title: String,
    pub amount: Decimal,
    pub category: String,
    pub date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub tags: Vec<String>,
    pub payment_method: Option<PaymentMethod>,
    pub receipt: Option<String>,
    pub location: Option<String>,
}

/// `receipt` and `location` take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct ExpensePatch {
    pub title: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
    pub recurrence: Option<Recurrence>,
    pub notes: Option<String>,
    pub source: Option<String>,
    pub tags: Option<Vec<String>>,
    pub payment_method: Option<PaymentMethod>,
    pub receipt: Option<Option<String>>,
    pub location: Option<Option<String>>,
}

impl Record for Expense {
    const KIND: RecordKind = RecordKind::Expense;
    type Draft = ExpenseDraft;
    type Patch = ExpensePatch;

    fn from_draft(id: String, d: ExpenseDraft, clock: &dyn Clock) -> Self {
        let now = clock.now();
        let recurrence = d.recurrence.unwrap_or_default();
        Self {
            id,
            title: d.title.trim().to_string(),
            amount: d.amount,
            category: category_key(&d.category),
            date: d.date.unwrap_or_else(|| clock.today()),
            recurring: recurrence != Recurrence::None,
            recurrence_interval: recurrence,
            notes: d.notes.unwrap_or_default(),
            source: d.source.unwrap_or_default(),
            tags: clean_tags(d.tags),
            payment_method: d.payment_method.unwrap_or_default(),
            receipt: d.receipt,
            location: d.location,
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, p: ExpensePatch, clock: &dyn Clock) {
        if let Some(v) = p.title {
            self.title = v.trim().to_string();
        }
        if let Some(v) = p.amount {
            self.amount = v;
        }
        if let Some(v) = p.category {
            self.category = category_key(&v);
        }
        if let Some(v) = p.date {
            self.date = v;
        }
        if let Some(v) = p.recurrence {
            self.recurring = v != Recurrence::None;
            self.recurrence_interval = v;
        }
        if let Some(v) = p.notes {
            self.notes = v;
        }
        if let Some(v) = p.source {
            self.source = v;
        }
        if let Some(v) = p.tags {
            self.tags = clean_tags(v);
        }
        if let Some(v) = p.payment_method {
            self.payment_method = v;
        }
        if let Some(v) = p.receipt {
            self.receipt = v;
        }
        if let Some(v) = p.location {
            self.location = v;
        }
        self.updated_at = clock.now();
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require_text("title", &self.title)?;
        require_text("category", &self.category)?;
        require_non_negative(self.amount)
    }

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.title
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: String,
    pub category: String,
    pub amount: Decimal,
    #[serde(default)]
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
    /// Stored for the UI; unspent amounts are not carried between windows.
    #[serde(default)]
    pub rollover: bool,
    #[serde(default)]
    pub alerts: AlertThresholds,
    #[serde(default)]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetDraft {
    pub category: String,
    pub amount: Decimal,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub rollover: bool,
    pub alerts: Option<AlertThresholds>,
}

#[derive(Debug, Clone, Default)]
pub struct BudgetPatch {
    pub category: Option<String>,
    pub amount: Option<Decimal>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
    pub rollover: Option<bool>,
    pub alerts: Option<AlertThresholds>,
}

impl Record for Budget {
    const KIND: RecordKind = RecordKind::Budget;
    type Draft = BudgetDraft;
    type Patch = BudgetPatch;

    fn from_draft(id: String, d: BudgetDraft, clock: &dyn Clock) -> Self {
        let now = clock.now();
        Self {
            id,
            category: category_key(&d.category),
            amount: d.amount,
            period: d.period.unwrap_or_default(),
            start_date: d.start_date.unwrap_or_else(|| clock.today()),
            rollover: d.rollover,
            alerts: d.alerts.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn apply(&mut self, p: BudgetPatch, clock: &dyn Clock) {
        if let Some(v) = p.category {
            self.category = category_key(&v);
        }
        if let Some(v) = p.amount {
            self.amount = v;
        }
        if let Some(v) = p.period {
            self.period = v;
        }
        if let Some(v) = p.start_date {
            self.start_date = v;
        }
        if let Some(v) = p.rollover {
            self.rollover = v;
        }
        if let Some(v) = p.alerts {
            self.alerts = v;
        }
        self.updated_at = clock.now();
    }

    fn validate(&self) -> Result<(), ServiceError> {
        require_text("category", &self.category)?;
        require_non_negative(self.amount)?;
        self.alerts.validate()
    }

    fn id(&self) -> &str {
        &self.id
    }
    fn label(&self) -> &str {
        &self.category
    }
    fn category(&self) -> &str {
        &self.category
    }
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn date(&self) -> NaiveDate {
        self.start_date
    }
}

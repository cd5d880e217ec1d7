// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Rule-based health scoring, allocation and budget advice over a monthly summary.

use std::collections::BTreeMap;
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::models::{percent_of, same_category};
use crate::settings::Settings;

pub const INVESTMENT_PERCENT: u32 = 10;
pub const EMERGENCY_PERCENT: u32 = 5;
pub const LEISURE_PERCENT: u32 = 5;

pub const NO_INCOME_TIP: &str =
    "Start by recording your income sources to get a complete picture of your finances.";
pub const NO_EXPENSES_TIP: &str =
    "Track your daily expenses to understand where your money is going.";
pub const OVERSPENDING_TIPS: [&str; 2] = [
    "Your expenses exceed your income. Review non-essential spending and cut back where you can.",
    "Set strict budgets for your largest spending categories until spending drops below income.",
];
pub const EXCELLENT_TIPS: [&str; 2] = [
    "Excellent work! You are saving a healthy share of your income.",
    "Consider investing part of your savings to grow your wealth over time.",
];
pub const GOOD_SAVINGS_TIP: &str =
    "Good job keeping expenses under control. Try to push your savings rate a little higher.";
pub const LOW_SAVINGS_TIPS: [&str; 2] = [
    "Your savings rate is low. Aim to set aside at least 20% of your income.",
    "Look for recurring subscriptions or bills you can reduce or cancel.",
];

/// Headroom applied to every category by [`optimize_budget`].
fn slack() -> Decimal {
    Decimal::new(11, 1)
}

fn round_half_up(v: Decimal) -> Decimal {
    v.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub balance: Decimal,
    /// Balance as a percent of income; zero without income.
    pub savings_rate: Decimal,
    pub expenses_by_category: BTreeMap<String, Decimal>,
}

impl MonthlySummary {
    pub fn new(
        total_income: Decimal,
        total_expenses: Decimal,
        expenses_by_category: BTreeMap<String, Decimal>,
    ) -> Self {
        let balance = total_income.saturating_sub(total_expenses);
        let savings_rate = if total_income > Decimal::ZERO {
            percent_of(balance, total_income)
        } else {
            Decimal::ZERO
        };
        Self {
            total_income,
            total_expenses,
            balance,
            savings_rate,
            expenses_by_category,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Danger,
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Warning => "warning",
            HealthStatus::Danger => "danger",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    /// 0 to 100.
    pub score: u8,
    pub recommendations: Vec<String>,
}

impl HealthReport {
    fn new(status: HealthStatus, score: u8, tips: &[&str]) -> Self {
        Self {
            status,
            score,
            recommendations: tips.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Cases are checked in order; the first match wins.
pub fn analyze_financial_health(summary: &MonthlySummary) -> HealthReport {
    let income = summary.total_income;
    let expenses = summary.total_expenses;

    if income <= Decimal::ZERO {
        return HealthReport::new(HealthStatus::Warning, 50, &[NO_INCOME_TIP]);
    }
    if expenses <= Decimal::ZERO {
        return HealthReport::new(HealthStatus::Warning, 60, &[NO_EXPENSES_TIP]);
    }
    if expenses > income {
        return HealthReport::new(HealthStatus::Danger, 30, &OVERSPENDING_TIPS);
    }

    let fifty = Decimal::from(50);
    // expenses <= income here, so the ratio stays within 0..=1.
    let expense_ratio = expenses.checked_div(income).unwrap_or(Decimal::ONE);
    let savings_score = summary.savings_rate.saturating_mul(Decimal::TWO).min(fifty);
    let expense_score = (fifty - expense_ratio * fifty).max(Decimal::ZERO);
    let score = round_half_up(savings_score + expense_score)
        .to_u8()
        .unwrap_or(0)
        .min(100);

    match score {
        80.. => HealthReport::new(HealthStatus::Healthy, score, &EXCELLENT_TIPS),
        60..=79 => HealthReport::new(HealthStatus::Healthy, score, &[GOOD_SAVINGS_TIP]),
        40..=59 => HealthReport::new(HealthStatus::Warning, score, &LOW_SAVINGS_TIPS),
        _ => HealthReport::new(HealthStatus::Danger, score, &OVERSPENDING_TIPS),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TipKind {
    Success,
    Warning,
    Danger,
}

impl fmt::Display for TipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TipKind::Success => "success",
            TipKind::Warning => "warning",
            TipKind::Danger => "danger",
        })
    }
}

impl From<HealthStatus> for TipKind {
    fn from(status: HealthStatus) -> Self {
        match status {
            HealthStatus::Healthy => TipKind::Success,
            HealthStatus::Warning => TipKind::Warning,
            HealthStatus::Danger => TipKind::Danger,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialTip {
    pub message: String,
    #[serde(rename = "type")]
    pub kind: TipKind,
}

/// Picks one recommendation uniformly at random.
pub fn financial_tip<R: Rng + ?Sized>(health: &HealthReport, rng: &mut R) -> Option<FinancialTip> {
    health
        .recommendations
        .choose(rng)
        .map(|message| FinancialTip {
            message: message.clone(),
            kind: health.status.into(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocations {
    pub savings: Decimal,
    pub investment: Decimal,
    pub emergency: Decimal,
    pub leisure: Decimal,
}

/// Splits `income` by the configured savings target (clamped to 0..=100%)
/// and the fixed investment, emergency and leisure shares.
pub fn calculate_allocations(income: Decimal, settings: &Settings) -> Allocations {
    let share = |percent: Decimal| income.saturating_mul(percent / Decimal::ONE_HUNDRED);
    Allocations {
        savings: income.saturating_mul(settings.savings_rate()),
        investment: share(Decimal::from(INVESTMENT_PERCENT)),
        emergency: share(Decimal::from(EMERGENCY_PERCENT)),
        leisure: share(Decimal::from(LEISURE_PERCENT)),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverBudget {
    pub category: String,
    pub spent: Decimal,
    pub budget: Decimal,
    pub percent_spent: Decimal,
}

/// Categories spending at least their full budget, worst first. Categories
/// without a budget, or with a zero budget, are never reported.
pub fn over_budget_categories(
    summary: &MonthlySummary,
    budgets_by_category: &BTreeMap<String, Decimal>,
) -> Vec<OverBudget> {
    let mut out: Vec<OverBudget> = summary
        .expenses_by_category
        .iter()
        .filter_map(|(category, &spent)| {
            let (_, &budget) = budgets_by_category
                .iter()
                .find(|(c, _)| same_category(c, category))?;
            if budget <= Decimal::ZERO {
                return None;
            }
            let percent_spent = percent_of(spent, budget);
            (percent_spent >= Decimal::ONE_HUNDRED).then(|| OverBudget {
                category: category.clone(),
                spent,
                budget,
                percent_spent,
            })
        })
        .collect();
    out.sort_by(|a, b| b.percent_spent.cmp(&a.percent_spent));
    out
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetPlan {
    pub current_budgets: BTreeMap<String, Decimal>,
    pub optimized_budget: BTreeMap<String, Decimal>,
    pub recommended_savings: Decimal,
}

/// Scales every category so total spending leaves `savings_rate` (a
/// fraction) of income unspent, plus 10% headroom per category.
pub fn optimize_budget(summary: &MonthlySummary, savings_rate: Decimal) -> Option<BudgetPlan> {
    let income = summary.total_income;
    let actual = summary.total_expenses;
    if income.is_zero() || actual.is_zero() {
        return None;
    }

    let target_savings = income.saturating_mul(savings_rate);
    let target_expenses = income.saturating_sub(target_savings);
    let factor = if actual > target_expenses {
        target_expenses.checked_div(actual).unwrap_or(Decimal::ZERO)
    } else {
        Decimal::ONE
    };

    let optimized_budget = summary
        .expenses_by_category
        .iter()
        .map(|(category, &spent)| {
            let planned = spent.saturating_mul(factor).saturating_mul(slack());
            (category.clone(), round_half_up(planned))
        })
        .collect();

    Some(BudgetPlan {
        current_budgets: summary.expenses_by_category.clone(),
        optimized_budget,
        recommended_savings: target_savings,
    })
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Source of "now" for ids, timestamps and period windows.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// Calendar date used for period windows and default record dates.
    fn today(&self) -> NaiveDate;
}

/// Wall clock; `today` follows the local calendar.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Clock pinned to a single date, used by tests and demo seeding.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.date
            .and_hms_opt(12, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_default()
    }

    fn today(&self) -> NaiveDate {
        self.date
    }
}

/// Inclusive date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn month(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let next = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self::new(start, next - Duration::days(1)))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetPeriod {
    Daily,
    Weekly,
    #[default]
    Monthly,
    Yearly,
}

impl BudgetPeriod {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Some(BudgetPeriod::Daily),
            "weekly" => Some(BudgetPeriod::Weekly),
            "monthly" => Some(BudgetPeriod::Monthly),
            "yearly" => Some(BudgetPeriod::Yearly),
            _ => None,
        }
    }

    /// Resolves the period into the concrete window containing `today`.
    /// Weeks run Monday to Sunday.
    pub fn window(self, today: NaiveDate) -> DateRange {
        match self {
            BudgetPeriod::Daily => DateRange::new(today, today),
            BudgetPeriod::Weekly => {
                let offset = i64::from(today.weekday().num_days_from_monday());
                let start = today - Duration::days(offset);
                DateRange::new(start, start + Duration::days(6))
            }
            BudgetPeriod::Monthly => DateRange::month(today.year(), today.month())
                .unwrap_or_else(|| DateRange::new(today, today)),
            BudgetPeriod::Yearly => {
                let start = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap_or(today);
                let end = NaiveDate::from_ymd_opt(today.year(), 12, 31).unwrap_or(today);
                DateRange::new(start, end)
            }
        }
    }
}

impl fmt::Display for BudgetPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BudgetPeriod::Daily => "daily",
            BudgetPeriod::Weekly => "weekly",
            BudgetPeriod::Monthly => "monthly",
            BudgetPeriod::Yearly => "yearly",
        })
    }
}

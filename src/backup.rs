// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::models::{Budget, Expense, Income};
use crate::service::DataService;
use crate::settings::Settings;
use crate::store::Backend;

/// Whole-app export: the three collections plus settings and a timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    pub income: Vec<Income>,
    pub expenses: Vec<Expense>,
    pub budgets: Vec<Budget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_date: Option<DateTime<Utc>>,
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("tallybook_backup_{}.json", date.format("%Y-%m-%d"))
}

pub fn create_backup<B: Backend>(service: &DataService<B>) -> Backup {
    let data = service.export_data();
    Backup {
        income: data.income,
        expenses: data.expenses,
        budgets: data.budgets,
        settings: Some(Settings::load(service.store())),
        export_date: Some(service.clock().now()),
    }
}

pub fn backup_to_json<B: Backend>(service: &DataService<B>) -> Result<String> {
    serde_json::to_string_pretty(&create_backup(service)).context("Serialize backup")
}

/// Restores the collections from `text` and, if the document carries
/// settings, merges their readable fields over the current settings and
/// saves the result. Returns false when the collections were rejected;
/// settings are left alone in that case.
pub fn restore_backup<B: Backend>(service: &mut DataService<B>, text: &str) -> bool {
    let doc: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(e) => {
            warn!(error = %e, "backup is not valid JSON");
            return false;
        }
    };
    if !service.import_data(&doc) {
        return false;
    }
    if let Some(raw) = doc.get("settings") {
        let mut settings = Settings::load(service.store());
        if settings.merge(raw) == 0 {
            warn!("backup settings unreadable, keeping current settings");
        } else if !settings.save(service.store_mut()) {
            warn!("backup restored without settings");
        }
    }
    info!("backup restored");
    true
}

/// Writes `date,title,category,amount,notes` rows for income or expenses.
pub fn write_csv<W: Write>(out: W, rows: &[CsvRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(["date", "title", "category", "amount", "notes"])?;
    for r in rows {
        wtr.write_record([
            r.date.to_string(),
            r.title.clone(),
            r.category.clone(),
            format!("{:.2}", r.amount),
            r.notes.clone(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Debug, Clone)]
pub struct CsvRow {
    pub date: NaiveDate,
    pub title: String,
    pub category: String,
    pub amount: rust_decimal::Decimal,
    pub notes: String,
}

impl From<&Income> for CsvRow {
    fn from(i: &Income) -> Self {
        Self {
            date: i.date,
            title: i.title.clone(),
            category: i.category.clone(),
            amount: i.amount,
            notes: i.notes.clone(),
        }
    }
}

impl From<&Expense> for CsvRow {
    fn from(e: &Expense) -> Self {
        Self {
            date: e.date,
            title: e.title.clone(),
            category: e.category.clone(),
            amount: e.amount,
            notes: e.notes.clone(),
        }
    }
}

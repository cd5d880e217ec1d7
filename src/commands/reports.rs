// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use rust_decimal::Decimal;

use crate::insights::MonthlySummary;
use crate::models::RecordKind;
use crate::period::DateRange;
use crate::service::DataService;
use crate::settings::Settings;
use crate::store::Backend;
use crate::utils::{maybe_print_json, parse_month, pretty_table};

pub fn handle<B: Backend>(svc: &DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(svc, sub)?,
        Some(("categories", sub)) => categories(svc, sub)?,
        Some(("trend", sub)) => trend(svc, sub)?,
        _ => {}
    }
    Ok(())
}

/// Summary for `--month`, or the current month when omitted.
pub fn summary_for<B: Backend>(
    svc: &DataService<B>,
    sub: &clap::ArgMatches,
) -> Result<MonthlySummary> {
    match sub.get_one::<String>("month") {
        Some(m) => {
            let (y, mo) = parse_month(m)?;
            svc.monthly_summary(y, mo)
                .ok_or_else(|| anyhow!("Invalid month '{}'", m))
        }
        None => Ok(svc.current_month_summary()),
    }
}

fn summary<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let s = summary_for(svc, sub)?;
    if maybe_print_json(sub.get_flag("json"), &s)? {
        return Ok(());
    }
    let settings = Settings::load(svc.store());
    let rows = vec![
        vec!["Income".into(), settings.format_money(s.total_income)],
        vec!["Expenses".into(), settings.format_money(s.total_expenses)],
        vec!["Balance".into(), settings.format_money(s.balance)],
        vec!["Savings rate".into(), format!("{:.1}%", s.savings_rate)],
    ];
    println!("{}", pretty_table(&["Metric", "Value"], rows));
    Ok(())
}

fn categories<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let kind = match sub.get_one::<String>("kind").map(|s| s.as_str()) {
        Some("income") => RecordKind::Income,
        Some("expense") | None => RecordKind::Expense,
        Some(other) => return Err(anyhow!("Unknown kind '{}' (use income|expense)", other)),
    };
    let range = match sub.get_one::<String>("month") {
        Some(m) => {
            let (y, mo) = parse_month(m)?;
            DateRange::month(y, mo)
        }
        None => None,
    };
    let totals = svc.by_category(kind, range);
    if maybe_print_json(sub.get_flag("json"), &totals)? {
        return Ok(());
    }
    let grand: Decimal = totals.values().copied().sum();
    let settings = Settings::load(svc.store());
    let mut items: Vec<_> = totals.into_iter().collect();
    items.sort_by(|a, b| b.1.cmp(&a.1));
    let rows = items
        .into_iter()
        .map(|(cat, amt)| {
            let share = if grand.is_zero() {
                Decimal::ZERO
            } else {
                amt / grand * Decimal::ONE_HUNDRED
            };
            vec![cat, settings.format_money(amt), format!("{:.1}%", share)]
        })
        .collect();
    println!("{}", pretty_table(&["Category", "Total", "Share"], rows));
    Ok(())
}

fn trend<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let months = *sub.get_one::<usize>("months").unwrap_or(&6);
    let data = svc.monthly_trend(months);
    if maybe_print_json(sub.get_flag("json"), &data)? {
        return Ok(());
    }
    let settings = Settings::load(svc.store());
    let rows = data
        .iter()
        .map(|t| {
            vec![
                format!("{}-{:02}", t.year, t.month),
                settings.format_money(t.income),
                settings.format_money(t.expenses),
                settings.format_money(t.income - t.expenses),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Month", "Income", "Expenses", "Net"], rows)
    );
    Ok(())
}

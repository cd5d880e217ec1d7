// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};

use crate::models::{AlertThresholds, Budget, BudgetDraft, BudgetPatch, same_category};
use crate::period::BudgetPeriod;
use crate::service::{BudgetHealth, BudgetStatus, DataService};
use crate::settings::Settings;
use crate::store::Backend;
use crate::utils::{maybe_print_json, parse_date, parse_decimal, pretty_table};

pub fn handle<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("set", sub)) => set(svc, sub)?,
        Some(("list", sub)) => list(svc, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").context("id missing")?;
            if !svc.delete::<Budget>(id)? {
                return Err(anyhow!("Budget '{}' not found", id));
            }
            println!("Removed budget '{}'", id);
        }
        Some(("status", sub)) => status(svc, sub)?,
        _ => {}
    }
    Ok(())
}

/// Creates the category's budget, or updates it in place if one exists.
fn set<B: Backend>(svc: &mut DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let category = sub
        .get_one::<String>("category")
        .context("category missing")?
        .trim()
        .to_string();
    let amount = parse_decimal(sub.get_one::<String>("amount").context("amount missing")?)?;
    let period = match sub.get_one::<String>("period") {
        Some(p) => Some(BudgetPeriod::parse(p).ok_or_else(|| anyhow!("Unknown period '{}'", p))?),
        None => None,
    };
    let start_date = sub
        .get_one::<String>("start")
        .map(|s| parse_date(s))
        .transpose()?;
    let warning = sub
        .get_one::<String>("warning")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let danger = sub
        .get_one::<String>("danger")
        .map(|s| parse_decimal(s))
        .transpose()?;
    let rollover = sub.get_flag("rollover");

    let existing = svc
        .budgets()
        .into_iter()
        .find(|b| same_category(&b.category, &category));
    let base = existing.as_ref().map(|b| b.alerts).unwrap_or_default();
    let alerts = match (warning, danger) {
        (None, None) => None,
        (w, d) => Some(AlertThresholds::new(
            w.unwrap_or(base.warning),
            d.unwrap_or(base.danger),
        )?),
    };

    let budget = match existing {
        Some(b) => svc
            .update::<Budget>(
                &b.id,
                BudgetPatch {
                    category: None,
                    amount: Some(amount),
                    period,
                    start_date,
                    rollover: Some(rollover),
                    alerts,
                },
            )?
            .context("budget vanished during update")?,
        None => svc.add::<Budget>(BudgetDraft {
            category,
            amount,
            period,
            start_date,
            rollover,
            alerts,
        })?,
    };
    println!(
        "Budget set for {} = {} ({})",
        budget.category, budget.amount, budget.period
    );
    Ok(())
}

fn list<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let budgets = svc.budgets();
    if maybe_print_json(sub.get_flag("json"), &budgets)? {
        return Ok(());
    }
    let settings = Settings::load(svc.store());
    let rows = budgets
        .iter()
        .map(|b| {
            vec![
                b.id.clone(),
                b.category.clone(),
                settings.format_money(b.amount),
                b.period.to_string(),
                format!("{}% / {}%", b.alerts.warning, b.alerts.danger),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Category", "Budget", "Period", "Alerts"], rows)
    );
    Ok(())
}

fn status<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let statuses: Vec<BudgetStatus> = match sub.get_one::<String>("id") {
        Some(id) => vec![
            svc.budget_status(id)
                .ok_or_else(|| anyhow!("Budget '{}' not found", id))?,
        ],
        None => svc.budget_statuses(),
    };
    if maybe_print_json(sub.get_flag("json"), &statuses)? {
        return Ok(());
    }
    let settings = Settings::load(svc.store());
    let rows = statuses
        .iter()
        .map(|s| {
            let label = match s.status {
                BudgetHealth::Good => "good",
                BudgetHealth::Warning => "warning",
                BudgetHealth::Danger => "danger",
            };
            vec![
                s.category.clone(),
                format!("{} .. {}", s.window.start, s.window.end),
                settings.format_money(s.amount),
                settings.format_money(s.spent),
                settings.format_money(s.remaining),
                format!("{:.1}%", s.percent_spent),
                label.to_string(),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(
            &["Category", "Window", "Budget", "Spent", "Remaining", "Used", "Status"],
            rows
        )
    );
    Ok(())
}

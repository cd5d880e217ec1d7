// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde_json::json;

use crate::commands::reports::summary_for;
use crate::insights::{
    analyze_financial_health, calculate_allocations, financial_tip, optimize_budget,
    over_budget_categories,
};
use crate::service::DataService;
use crate::settings::Settings;
use crate::store::Backend;
use crate::utils::{maybe_print_json, parse_decimal, pretty_table};

pub fn health<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let summary = summary_for(svc, sub)?;
    let report = analyze_financial_health(&summary);
    let over = over_budget_categories(&summary, &svc.budgets_by_category());
    if maybe_print_json(
        sub.get_flag("json"),
        &json!({ "health": report, "overBudget": over }),
    )? {
        return Ok(());
    }
    println!("Status: {} (score {}/100)", report.status, report.score);
    for r in &report.recommendations {
        println!("  - {}", r);
    }
    if !over.is_empty() {
        let rows = over
            .iter()
            .map(|o| {
                vec![
                    o.category.clone(),
                    format!("{:.2}", o.spent),
                    format!("{:.2}", o.budget),
                    format!("{:.1}%", o.percent_spent),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Over budget", "Spent", "Budget", "Used"], rows)
        );
    }
    Ok(())
}

pub fn tip<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let summary = summary_for(svc, sub)?;
    let report = analyze_financial_health(&summary);
    if let Some(t) = financial_tip(&report, &mut rand::thread_rng()) {
        println!("[{}] {}", t.kind, t.message);
    }
    Ok(())
}

pub fn allocate<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let income = match sub.get_one::<String>("income") {
        Some(s) => parse_decimal(s)?,
        None => summary_for(svc, sub)?.total_income,
    };
    let settings = Settings::load(svc.store());
    let a = calculate_allocations(income, &settings);
    if maybe_print_json(sub.get_flag("json"), &a)? {
        return Ok(());
    }
    let rows = vec![
        vec!["Savings".into(), settings.format_money(a.savings)],
        vec!["Investment".into(), settings.format_money(a.investment)],
        vec!["Emergency fund".into(), settings.format_money(a.emergency)],
        vec!["Leisure".into(), settings.format_money(a.leisure)],
    ];
    println!("{}", pretty_table(&["Bucket", "Amount"], rows));
    Ok(())
}

pub fn optimize<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let summary = summary_for(svc, sub)?;
    let settings = Settings::load(svc.store());
    let Some(plan) = optimize_budget(&summary, settings.savings_rate()) else {
        println!("Not enough data: record both income and expenses for the month first.");
        return Ok(());
    };
    if maybe_print_json(sub.get_flag("json"), &plan)? {
        return Ok(());
    }
    let rows = plan
        .current_budgets
        .iter()
        .map(|(cat, current)| {
            let suggested = plan.optimized_budget.get(cat).copied().unwrap_or_default();
            vec![
                cat.clone(),
                settings.format_money(*current),
                settings.format_money(suggested),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Spent", "Suggested budget"], rows)
    );
    println!(
        "Recommended savings: {}",
        settings.format_money(plan.recommended_savings)
    );
    Ok(())
}

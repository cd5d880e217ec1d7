// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::models::{
    Expense, ExpenseDraft, ExpensePatch, Income, IncomeDraft, IncomePatch, PaymentMethod,
    Recurrence, same_category,
};
use crate::period::DateRange;
use crate::service::{Collection, DataService};
use crate::settings::Settings;
use crate::store::Backend;
use crate::utils::{
    format_date, maybe_print_json, parse_date, parse_decimal, parse_month, parse_tags,
    pretty_table,
};

/// Fields shared by income and expense forms; all optional so `edit` can reuse them.
struct RecordArgs {
    title: Option<String>,
    amount: Option<Decimal>,
    category: Option<String>,
    date: Option<NaiveDate>,
    recurrence: Option<Recurrence>,
    notes: Option<String>,
    source: Option<String>,
    tags: Option<Vec<String>>,
}

impl RecordArgs {
    fn parse(sub: &clap::ArgMatches) -> Result<Self> {
        let recurrence = match sub.get_one::<String>("recurrence") {
            Some(s) => Some(
                Recurrence::parse(s).ok_or_else(|| anyhow!("Unknown recurrence '{}'", s))?,
            ),
            None => None,
        };
        Ok(Self {
            title: sub.get_one::<String>("title").cloned(),
            amount: sub
                .get_one::<String>("amount")
                .map(|s| parse_decimal(s))
                .transpose()?,
            category: sub.get_one::<String>("category").cloned(),
            date: sub
                .get_one::<String>("date")
                .map(|s| parse_date(s))
                .transpose()?,
            recurrence,
            notes: sub.get_one::<String>("notes").cloned(),
            source: sub.get_one::<String>("source").cloned(),
            tags: sub.get_one::<String>("tags").map(|s| parse_tags(s)),
        })
    }
}

fn payment_method(sub: &clap::ArgMatches) -> Result<Option<PaymentMethod>> {
    match sub.get_one::<String>("method") {
        Some(s) => Ok(Some(
            PaymentMethod::parse(s).ok_or_else(|| anyhow!("Unknown payment method '{}'", s))?,
        )),
        None => Ok(None),
    }
}

pub fn handle_income<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let a = RecordArgs::parse(sub)?;
            let draft = IncomeDraft {
                title: a.title.unwrap_or_default(),
                amount: a.amount.unwrap_or_default(),
                category: a.category.unwrap_or_default(),
                date: a.date,
                recurrence: a.recurrence,
                notes: a.notes,
                source: a.source,
                tags: a.tags.unwrap_or_default(),
            };
            let rec = svc.add::<Income>(draft)?;
            println!("Recorded income {} '{}' ({})", rec.amount, rec.title, rec.id);
        }
        Some(("list", sub)) => list::<Income, B>(svc, sub, "Income")?,
        Some(("rm", sub)) => remove::<Income, B>(svc, sub)?,
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").context("id missing")?;
            let a = RecordArgs::parse(sub)?;
            let patch = IncomePatch {
                title: a.title,
                amount: a.amount,
                category: a.category,
                date: a.date,
                recurrence: a.recurrence,
                notes: a.notes,
                source: a.source,
                tags: a.tags,
            };
            match svc.update::<Income>(id, patch)? {
                Some(rec) => println!("Updated income '{}'", rec.title),
                None => return Err(anyhow!("Income '{}' not found", id)),
            }
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_expense<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let a = RecordArgs::parse(sub)?;
            let draft = ExpenseDraft {
                title: a.title.unwrap_or_default(),
                amount: a.amount.unwrap_or_default(),
                category: a.category.unwrap_or_default(),
                date: a.date,
                recurrence: a.recurrence,
                notes: a.notes,
                source: a.source,
                tags: a.tags.unwrap_or_default(),
                payment_method: payment_method(sub)?,
                receipt: sub.get_one::<String>("receipt").cloned(),
                location: sub.get_one::<String>("location").cloned(),
            };
            let rec = svc.add::<Expense>(draft)?;
            println!("Recorded expense {} '{}' ({})", rec.amount, rec.title, rec.id);
        }
        Some(("list", sub)) => list::<Expense, B>(svc, sub, "Expense")?,
        Some(("rm", sub)) => remove::<Expense, B>(svc, sub)?,
        Some(("edit", sub)) => {
            let id = sub.get_one::<String>("id").context("id missing")?;
            let a = RecordArgs::parse(sub)?;
            let patch = ExpensePatch {
                title: a.title,
                amount: a.amount,
                category: a.category,
                date: a.date,
                recurrence: a.recurrence,
                notes: a.notes,
                source: a.source,
                tags: a.tags,
                payment_method: payment_method(sub)?,
                receipt: sub.get_one::<String>("receipt").map(|s| Some(s.clone())),
                location: sub.get_one::<String>("location").map(|s| Some(s.clone())),
            };
            match svc.update::<Expense>(id, patch)? {
                Some(rec) => println!("Updated expense '{}'", rec.title),
                None => return Err(anyhow!("Expense '{}' not found", id)),
            }
        }
        _ => {}
    }
    Ok(())
}

/// Records matching the `--month`/`--category`/`--limit` filters, newest first.
pub fn query_rows<T: Collection, B: Backend>(
    svc: &DataService<B>,
    sub: &clap::ArgMatches,
) -> Result<Vec<T>> {
    let range = match sub.get_one::<String>("month") {
        Some(m) => {
            let (y, mo) = parse_month(m)?;
            DateRange::month(y, mo)
        }
        None => None,
    };
    let category = sub.get_one::<String>("category");
    let mut rows: Vec<T> = svc
        .recent::<T>(usize::MAX)
        .into_iter()
        .filter(|r| range.is_none_or(|w| w.contains(r.date())))
        .filter(|r| category.is_none_or(|c| same_category(r.category(), c)))
        .collect();
    if let Some(limit) = sub.get_one::<usize>("limit") {
        rows.truncate(*limit);
    }
    Ok(rows)
}

fn list<T: Collection, B: Backend>(
    svc: &DataService<B>,
    sub: &clap::ArgMatches,
    label: &str,
) -> Result<()> {
    let rows = query_rows::<T, B>(svc, sub)?;
    if maybe_print_json(sub.get_flag("json"), &rows)? {
        return Ok(());
    }
    let settings = Settings::load(svc.store());
    let data = rows
        .iter()
        .map(|r| {
            vec![
                r.id().to_string(),
                format_date(r.date(), &settings.date_format),
                r.label().to_string(),
                r.category().to_string(),
                settings.format_money(r.amount()),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Id", "Date", label, "Category", "Amount"], data)
    );
    Ok(())
}

fn remove<T: Collection, B: Backend>(svc: &mut DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let id = sub.get_one::<String>("id").context("id missing")?;
    if svc.delete::<T>(id)? {
        println!("Removed {} '{}'", T::KIND, id);
        Ok(())
    } else {
        Err(anyhow!("{} '{}' not found", T::KIND, id))
    }
}

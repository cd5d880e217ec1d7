// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::sync::Once;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

static TRACING_INIT: Once = Once::new();

/// Installs the stderr subscriber once. `RUST_LOG` overrides the default
/// `tallybook=warn` filter.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tallybook=warn"));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn parse_tags(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Formats with a user-supplied pattern, falling back to ISO dates when
/// the pattern is invalid.
pub fn format_date(date: NaiveDate, pattern: &str) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    if write!(out, "{}", date.format(pattern)).is_err() {
        return date.format("%Y-%m-%d").to_string();
    }
    out
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(json_flag: bool, v: &T) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    Ok(false)
}

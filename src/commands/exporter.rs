// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use std::fs::File;
use std::path::PathBuf;

use crate::backup::{CsvRow, backup_file_name, backup_to_json, write_csv};
use crate::service::DataService;
use crate::store::Backend;

pub fn handle<B: Backend>(svc: &DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("json", sub)) => export_json(svc, sub),
        Some(("csv", sub)) => export_csv(svc, sub),
        _ => Ok(()),
    }
}

fn export_json<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let out = match sub.get_one::<String>("out") {
        Some(p) => PathBuf::from(p),
        None => PathBuf::from(backup_file_name(svc.clock().today())),
    };
    let text = backup_to_json(svc)?;
    std::fs::write(&out, text).with_context(|| format!("Write {}", out.display()))?;
    println!("Exported backup to {}", out.display());
    Ok(())
}

fn export_csv<B: Backend>(svc: &DataService<B>, sub: &clap::ArgMatches) -> Result<()> {
    let kind = sub
        .get_one::<String>("kind")
        .context("kind missing")?
        .to_lowercase();
    let out = sub.get_one::<String>("out").context("out missing")?;
    let rows: Vec<CsvRow> = match kind.as_str() {
        "income" => svc.income().iter().map(CsvRow::from).collect(),
        "expense" | "expenses" => svc.expenses().iter().map(CsvRow::from).collect(),
        _ => return Err(anyhow!("Unknown kind: {} (use income|expense)", kind)),
    };
    let file = File::create(out).with_context(|| format!("Create {}", out))?;
    write_csv(file, &rows)?;
    println!("Exported {} rows to {}", rows.len(), out);
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};

use crate::backup::restore_backup;
use crate::service::DataService;
use crate::store::Backend;

pub fn handle<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    let path = m.get_one::<String>("path").context("path missing")?.trim();
    let text = std::fs::read_to_string(path).with_context(|| format!("Read {}", path))?;
    if !restore_backup(svc, &text) {
        return Err(anyhow!(
            "Import rejected: {} must contain income, expenses and budgets arrays",
            path
        ));
    }
    println!(
        "Imported {} income, {} expenses, {} budgets from {}",
        svc.income().len(),
        svc.expenses().len(),
        svc.budgets().len(),
        path
    );
    Ok(())
}

// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use tallybook::commands::{advice, budgets, config, exporter, importer, records, reports};
use tallybook::service::DataService;
use tallybook::settings::{Profile, Settings};
use tallybook::store::Store;
use tallybook::{cli, db, seed, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let backend = db::open_or_init()?;
    let mut svc = DataService::open(Store::new(backend));

    match matches.subcommand() {
        Some(("init", _)) => {
            let now = svc.clock().now();
            Profile::ensure(svc.store_mut(), now);
            println!("Data store initialized at {}", db::db_path()?.display());
        }
        Some(("seed", _)) => {
            let added = seed::seed_demo(&mut svc)?;
            let mut settings = Settings::load(svc.store());
            if settings.first_run {
                settings.first_run = false;
                settings.save(svc.store_mut());
            }
            if added == 0 {
                println!("Store already has data; nothing seeded");
            } else {
                println!("Seeded {} demo records", added);
            }
        }
        Some(("income", sub)) => records::handle_income(&mut svc, sub)?,
        Some(("expense", sub)) => records::handle_expense(&mut svc, sub)?,
        Some(("budget", sub)) => budgets::handle(&mut svc, sub)?,
        Some(("report", sub)) => reports::handle(&svc, sub)?,
        Some(("health", sub)) => advice::health(&svc, sub)?,
        Some(("tip", sub)) => advice::tip(&svc, sub)?,
        Some(("allocate", sub)) => advice::allocate(&svc, sub)?,
        Some(("optimize", sub)) => advice::optimize(&svc, sub)?,
        Some(("export", sub)) => exporter::handle(&svc, sub)?,
        Some(("import", sub)) => importer::handle(&mut svc, sub)?,
        Some(("settings", sub)) => config::handle(&mut svc, sub)?,
        Some(("profile", sub)) => config::handle_profile(&mut svc, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

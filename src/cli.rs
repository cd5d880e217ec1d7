// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::models::{EXPENSE_CATEGORIES, INCOME_CATEGORIES};

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Print JSON instead of a table")
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .help("Calendar month YYYY-MM (default: current month)")
}

fn category_arg(categories: &[&str]) -> Arg {
    Arg::new("category")
        .long("category")
        .help(format!("{} or any other label", categories.join("|")))
}

fn record_fields(cmd: Command, required: bool, categories: &[&str]) -> Command {
    cmd.arg(Arg::new("title").long("title").required(required))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(category_arg(categories).required(required))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD (default: today)"))
        .arg(
            Arg::new("recurrence")
                .long("recurrence")
                .help("none|daily|weekly|monthly|yearly"),
        )
        .arg(Arg::new("notes").long("notes"))
        .arg(Arg::new("source").long("source"))
        .arg(Arg::new("tags").long("tags").help("Comma-separated tags"))
}

fn expense_fields(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("method")
            .long("method")
            .help("cash|card|bank_transfer|mobile|other"),
    )
    .arg(Arg::new("location").long("location"))
    .arg(Arg::new("receipt").long("receipt").help("Receipt file reference"))
}

fn list_cmd() -> Command {
    Command::new("list")
        .about("List records, newest first")
        .arg(month_arg())
        .arg(Arg::new("category").long("category"))
        .arg(
            Arg::new("limit")
                .long("limit")
                .value_parser(value_parser!(usize)),
        )
        .arg(json_flag())
}

fn rm_cmd() -> Command {
    Command::new("rm")
        .about("Delete a record by id")
        .arg(Arg::new("id").long("id").required(true))
}

pub fn build_cli() -> Command {
    Command::new("tallybook")
        .about("Local income, expense and budget tracker")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(Command::new("init").about("Create the data store"))
        .subcommand(Command::new("seed").about("Load demo data into an empty store"))
        .subcommand(
            Command::new("income")
                .about("Manage income")
                .subcommand(record_fields(Command::new("add"), true, INCOME_CATEGORIES))
                .subcommand(list_cmd())
                .subcommand(rm_cmd())
                .subcommand(record_fields(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                    false,
                    INCOME_CATEGORIES,
                )),
        )
        .subcommand(
            Command::new("expense")
                .about("Manage expenses")
                .subcommand(expense_fields(record_fields(
                    Command::new("add"),
                    true,
                    EXPENSE_CATEGORIES,
                )))
                .subcommand(list_cmd())
                .subcommand(rm_cmd())
                .subcommand(expense_fields(record_fields(
                    Command::new("edit").arg(Arg::new("id").long("id").required(true)),
                    false,
                    EXPENSE_CATEGORIES,
                ))),
        )
        .subcommand(
            Command::new("budget")
                .about("Manage budgets")
                .subcommand(
                    Command::new("set")
                        .about("Create or replace the budget of a category")
                        .arg(category_arg(EXPENSE_CATEGORIES).required(true))
                        .arg(Arg::new("amount").long("amount").required(true))
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .help("daily|weekly|monthly|yearly (default monthly)"),
                        )
                        .arg(Arg::new("start").long("start").help("Start date YYYY-MM-DD"))
                        .arg(Arg::new("warning").long("warning").help("Warning percent"))
                        .arg(Arg::new("danger").long("danger").help("Danger percent"))
                        .arg(
                            Arg::new("rollover")
                                .long("rollover")
                                .action(ArgAction::SetTrue),
                        ),
                )
                .subcommand(Command::new("list").arg(json_flag()))
                .subcommand(rm_cmd())
                .subcommand(
                    Command::new("status")
                        .about("Spend against each budget in its current period")
                        .arg(Arg::new("id").long("id"))
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Totals and breakdowns")
                .subcommand(Command::new("summary").arg(month_arg()).arg(json_flag()))
                .subcommand(
                    Command::new("categories")
                        .arg(month_arg())
                        .arg(
                            Arg::new("kind")
                                .long("kind")
                                .default_value("expense")
                                .help("income|expense"),
                        )
                        .arg(json_flag()),
                )
                .subcommand(
                    Command::new("trend")
                        .arg(
                            Arg::new("months")
                                .long("months")
                                .value_parser(value_parser!(usize))
                                .default_value("6"),
                        )
                        .arg(json_flag()),
                ),
        )
        .subcommand(
            Command::new("health")
                .about("Score the month's finances")
                .arg(month_arg())
                .arg(json_flag()),
        )
        .subcommand(Command::new("tip").about("Show one piece of advice").arg(month_arg()))
        .subcommand(
            Command::new("allocate")
                .about("Split income into savings, investment, emergency and leisure")
                .arg(Arg::new("income").long("income"))
                .arg(month_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("optimize")
                .about("Suggest category budgets that meet the savings target")
                .arg(month_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("export")
                .about("Export data")
                .subcommand(
                    Command::new("json")
                        .about("Full backup including settings")
                        .arg(Arg::new("out").long("out").help("Output path")),
                )
                .subcommand(
                    Command::new("csv")
                        .arg(Arg::new("kind").long("kind").required(true))
                        .arg(Arg::new("out").long("out").required(true)),
                ),
        )
        .subcommand(
            Command::new("import")
                .about("Replace all data from a JSON backup")
                .arg(Arg::new("path").long("path").required(true)),
        )
        .subcommand(
            Command::new("settings")
                .about("Show or change preferences")
                .subcommand(Command::new("show").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").long("key").required(true))
                        .arg(Arg::new("value").long("value").required(true)),
                ),
        )
        .subcommand(
            Command::new("profile")
                .about("Show or change the owner profile")
                .subcommand(Command::new("show").arg(json_flag()))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("name").long("name"))
                        .arg(Arg::new("email").long("email").help("Empty string clears it")),
                ),
        )
}

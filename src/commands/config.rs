// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};

use crate::service::DataService;
use crate::settings::{Profile, Settings};
use crate::store::Backend;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let s = Settings::load(svc.store());
            if !maybe_print_json(sub.get_flag("json"), &s)? {
                let rows = vec![
                    vec!["currency".into(), s.currency.clone()],
                    vec!["currency_symbol".into(), s.currency_symbol.clone()],
                    vec!["theme".into(), s.theme.to_string()],
                    vec!["locale".into(), s.locale.clone()],
                    vec!["date_format".into(), s.date_format.clone()],
                    vec!["notifications".into(), s.notifications.to_string()],
                    vec!["savings_target".into(), s.savings_target.to_string()],
                    vec!["first_run".into(), s.first_run.to_string()],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").context("key missing")?;
            let value = sub.get_one::<String>("value").context("value missing")?;
            let mut s = Settings::load(svc.store());
            if !s.set(key, value) {
                return Err(anyhow!("Cannot set '{}' to '{}'", key, value));
            }
            if !s.save(svc.store_mut()) {
                return Err(anyhow!("Failed to save settings"));
            }
            println!("Set {} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}

pub fn handle_profile<B: Backend>(svc: &mut DataService<B>, m: &clap::ArgMatches) -> Result<()> {
    let now = svc.clock().now();
    let mut profile = Profile::ensure(svc.store_mut(), now);
    match m.subcommand() {
        Some(("show", sub)) => {
            if !maybe_print_json(sub.get_flag("json"), &profile)? {
                let created = profile
                    .created_at
                    .map(|t| t.format("%Y-%m-%d").to_string())
                    .unwrap_or_default();
                let rows = vec![
                    vec!["name".into(), profile.name.clone()],
                    vec!["email".into(), profile.email.clone().unwrap_or_default()],
                    vec!["created".into(), created],
                ];
                println!("{}", pretty_table(&["Field", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            if let Some(name) = sub.get_one::<String>("name") {
                profile.name = name.trim().to_string();
            }
            if let Some(email) = sub.get_one::<String>("email") {
                let email = email.trim();
                profile.email = (!email.is_empty()).then(|| email.to_string());
            }
            if !profile.save(svc.store_mut()) {
                return Err(anyhow!("Failed to save profile"));
            }
            println!("Profile updated");
        }
        _ => {}
    }
    Ok(())
}

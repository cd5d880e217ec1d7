// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::store::{Backend, PROFILE_KEY, SETTINGS_KEY, Store};

/// Overlays the fields of `patch` onto `base` one at a time. A field that is
/// null, unknown, or would not deserialize is skipped and the base value
/// kept. Returns the merged value and the number of fields taken from `patch`.
fn merge_fields<T>(base: &T, patch: &Value) -> (T, usize)
where
    T: Serialize + DeserializeOwned + Clone,
{
    let Some(fields) = patch.as_object() else {
        return (base.clone(), 0);
    };
    let mut merged = match serde_json::to_value(base) {
        Ok(Value::Object(m)) => m,
        _ => Map::new(),
    };
    let mut applied = 0;
    for (key, value) in fields {
        if value.is_null() || !merged.contains_key(key) {
            continue;
        }
        let mut candidate = merged.clone();
        candidate.insert(key.clone(), value.clone());
        if serde_json::from_value::<T>(Value::Object(candidate)).is_ok() {
            merged.insert(key.clone(), value.clone());
            applied += 1;
        } else {
            warn!(key = key.as_str(), "ignoring unreadable stored field");
        }
    }
    match serde_json::from_value(Value::Object(merged)) {
        Ok(v) => (v, applied),
        Err(_) => (base.clone(), 0),
    }
}

/// Process-wide preferences. Missing, null or unreadable fields fall back
/// to their defaults field by field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub currency: String,
    pub currency_symbol: String,
    pub theme: Theme,
    pub locale: String,
    pub date_format: String,
    pub notifications: bool,
    /// Percent of income to set aside as savings.
    pub savings_target: Decimal,
    pub first_run: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            currency_symbol: "$".into(),
            theme: Theme::default(),
            locale: "en-US".into(),
            date_format: "%Y-%m-%d".into(),
            notifications: true,
            savings_target: Decimal::from(20),
            first_run: true,
        }
    }
}

impl Settings {
    pub fn load<B: Backend>(store: &Store<B>) -> Self {
        Settings::default().merged(&store.load(SETTINGS_KEY, Value::Null))
    }

    pub fn save<B: Backend>(&self, store: &mut Store<B>) -> bool {
        store.save(SETTINGS_KEY, self)
    }

    /// Copy of `self` with every readable field of `patch` applied.
    pub fn merged(&self, patch: &Value) -> Self {
        merge_fields(self, patch).0
    }

    /// Applies the readable fields of `patch` in place and reports how many
    /// were taken.
    pub fn merge(&mut self, patch: &Value) -> usize {
        let (next, applied) = merge_fields(self, patch);
        *self = next;
        applied
    }

    /// Savings target as a fraction of income, clamped to `0..=1`.
    pub fn savings_rate(&self) -> Decimal {
        (self.savings_target / Decimal::ONE_HUNDRED).clamp(Decimal::ZERO, Decimal::ONE)
    }

    pub fn format_money(&self, amount: Decimal) -> String {
        format!("{}{:.2}", self.currency_symbol, amount.round_dp(2))
    }

    /// Applies a `key=value` style override. Returns false for unknown keys
    /// or unparsable values.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        let value = value.trim();
        match key {
            "currency" => self.currency = value.to_uppercase(),
            "currency_symbol" | "currencySymbol" => self.currency_symbol = value.to_string(),
            "theme" => self.theme = Theme::parse(value),
            "locale" => self.locale = value.to_string(),
            "date_format" | "dateFormat" => self.date_format = value.to_string(),
            "notifications" => match value.parse() {
                Ok(v) => self.notifications = v,
                Err(_) => return false,
            },
            "savings_target" | "savingsTarget" => match value.parse::<Decimal>() {
                Ok(v) if v >= Decimal::ZERO && v <= Decimal::ONE_HUNDRED => {
                    self.savings_target = v
                }
                _ => return false,
            },
            "first_run" | "firstRun" => match value.parse() {
                Ok(v) => self.first_run = v,
                Err(_) => return false,
            },
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl Theme {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "light" => Theme::Light,
            "dark" => Theme::Dark,
            _ => Theme::System,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::System => "system",
        })
    }
}

impl<'de> Deserialize<'de> for Theme {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        Ok(value.map(|v| Theme::parse(&v)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Profile {
    pub name: String,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    pub fn load<B: Backend>(store: &Store<B>) -> Self {
        merge_fields(&Profile::default(), &store.load(PROFILE_KEY, Value::Null)).0
    }

    pub fn save<B: Backend>(&self, store: &mut Store<B>) -> bool {
        store.save(PROFILE_KEY, self)
    }

    /// Loads the profile, stamping and saving `created_at` the first time.
    pub fn ensure<B: Backend>(store: &mut Store<B>, now: DateTime<Utc>) -> Self {
        let mut profile = Profile::load(store);
        if profile.created_at.is_none() {
            profile.created_at = Some(now);
            if !profile.save(store) {
                warn!("profile not saved");
            }
        }
        profile
    }
}

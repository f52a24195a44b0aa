/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::io::Write;
use std::path::PathBuf;
use std::{fmt, fs};
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Clone, Debug, EnumIter, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum ConfigKey {
    AuthToken,
    Server,
    SearchServer,
    SelectedCompany,
}

pub type Config = HashMap<ConfigKey, Option<String>>;

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", format!("{:?}", self).to_lowercase())
    }
}

impl std::str::FromStr for ConfigKey {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::iter()
            .find(|key| key.to_string() == s.trim().to_lowercase())
            .ok_or_else(|| {
                let valid = ConfigKey::iter()
                    .map(|key| key.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");

                anyhow!("Invalid key: {}. Valid keys are: {}", s, valid)
            })
    }
}

fn get_config_file() -> Result<PathBuf> {
    let mut config_dir = dirs::config_dir().context("Could not find configuration directory")?;
    config_dir.push("compedia");
    config_dir.push("config.toml");
    Ok(config_dir)
}

pub fn load_config() -> Result<Config> {
    let config_file = get_config_file()?;

    if !config_file.exists() {
        return Ok(ConfigKey::iter().map(|key| (key, None)).collect());
    }

    let contents = fs::read_to_string(&config_file).context("Failed to read configuration file")?;
    toml::from_str(&contents).context("Failed to parse configuration file")
}

pub fn save_config(config: &Config) -> Result<()> {
    let config_file = get_config_file()?;
    let config_dir = config_file
        .parent()
        .context("Failed to get configuration directory")?;

    fs::create_dir_all(config_dir).context("Failed to create configuration directory")?;

    let contents = toml::to_string_pretty(config).context("Failed to serialize configuration")?;
    let mut file = fs::File::create(config_file).context("Failed to create configuration file")?;
    file.write_all(contents.as_bytes())
        .context("Failed to write configuration file")
}

/// Empty strings count as unset.
pub fn lookup(config: &Config, key: &ConfigKey) -> Option<String> {
    config
        .get(key)
        .cloned()
        .flatten()
        .filter(|value| !value.trim().is_empty())
}

pub fn get_value(key: ConfigKey) -> Result<Option<String>> {
    Ok(lookup(&load_config()?, &key))
}

/// Stores `value` under `key`; `None` clears it.
pub fn set_value(key: ConfigKey, value: Option<String>) -> Result<()> {
    let mut config = load_config()?;
    config.insert(key, value.filter(|value| !value.trim().is_empty()));
    save_config(&config)
}

/// Backs `compedia config <key> [value]`.
pub fn set_get_value_from_string(key: &str, value: Option<String>, quiet: bool) -> Result<Option<String>> {
    let key = key.parse::<ConfigKey>()?;

    match value {
        Some(value) => {
            set_value(key.clone(), Some(value.clone()))?;

            if !quiet {
                println!("{} set to \"{}\"", key, value);
            }

            Ok(Some(value))
        }
        None => {
            let value = get_value(key)?;

            if !quiet {
                println!("{}", value.as_deref().unwrap_or("[unset]"));
            }

            Ok(value)
        }
    }
}

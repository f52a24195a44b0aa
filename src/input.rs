/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::config::*;
use anyhow::{Context, Result, bail};
use connector::RequestConfig;
use connector::dto::FormData;
use connector::session::Session;
use rpassword::read_password;
use std::io::Write;
use std::process::Command;
use std::{fs, io};

/// Collects form values, opening `$EDITOR` on a `key: value` file unless
/// `skip` is set and every field already has a value.
pub fn handle_input(values: Vec<(String, Option<String>)>, skip: bool) -> Result<FormData> {
    if values.is_empty() {
        bail!("No input fields");
    }

    if skip && values.iter().all(|(_, v)| v.is_some()) {
        return Ok(values
            .into_iter()
            .filter_map(|(k, v)| v.map(|v| (k, v)))
            .collect());
    }

    let input_fields: String = values
        .iter()
        .map(|(k, v)| format!("{}: {}\n", k, v.as_deref().unwrap_or_default()))
        .collect();

    let name = std::env::temp_dir().join(format!("COMPEDIA-FORM-{}", std::process::id()));

    let mut file = fs::File::create(&name).context("Failed to create form file")?;
    file.write_all(input_fields.as_bytes())
        .context("Failed to write form file")?;

    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());
    let status = Command::new(&editor)
        .arg(&name)
        .status()
        .with_context(|| format!("Failed to open editor {}", editor))?;

    if !status.success() {
        bail!("Failed to open editor {}", editor);
    }

    let contents = fs::read_to_string(&name).context("Failed to read form file")?;
    fs::remove_file(&name).context("Failed to remove form file")?;

    let keys = values.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>();
    parse_form(&contents, &keys)
}

/// Parses `key: value` lines. Blank lines and `#` comments are skipped,
/// empty values are left out.
pub fn parse_form(contents: &str, keys: &[&str]) -> Result<FormData> {
    let mut result = FormData::new();

    for line in contents.lines() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            bail!("Invalid input line: {}", line);
        };

        let key = key.trim();

        if !keys.contains(&key) {
            bail!("Invalid input field: {}", key);
        }

        if !value.trim().is_empty() {
            result.insert(key.to_string(), value.trim().to_string());
        }
    }

    Ok(result)
}

pub fn ask_for_password() -> Result<String> {
    print!("Password: ");
    io::stdout().flush()?;
    let inp = read_password().context("Failed to read password")?;

    if inp.is_empty() {
        bail!("Password cannot be empty.");
    }

    Ok(inp)
}

pub fn ask_for_input(prompt: &str) -> Result<String> {
    print!("{}: ", prompt);
    io::stdout().flush()?;

    let mut inp = String::new();
    io::stdin()
        .read_line(&mut inp)
        .with_context(|| format!("Failed to read {}.", prompt))?;
    let inp = inp.trim().to_string();

    if inp.is_empty() {
        bail!("{} cannot be empty.", prompt);
    }

    Ok(inp)
}

/// Request state for the configured server, logged in if a valid token is
/// stored.
pub fn get_request_config(config: &Config) -> Result<RequestConfig> {
    let Some(server_url) = lookup(config, &ConfigKey::Server) else {
        bail!("Server URL not set. Use `compedia config server <url>` to set it.");
    };

    let token = Session::restore(lookup(config, &ConfigKey::AuthToken).as_deref())
        .map(|session| session.token().to_string());

    Ok(RequestConfig::new(server_url)
        .with_search_url(lookup(config, &ConfigKey::SearchServer))
        .with_token(token))
}

pub fn get_session(config: &Config) -> Result<Session> {
    match Session::restore(lookup(config, &ConfigKey::AuthToken).as_deref()) {
        Some(session) => Ok(session),
        None => bail!("Not logged in. Use `compedia login` to log in."),
    }
}

/// The `selectedcompany` config value, or `company` when given.
pub fn get_company(config: &Config, company: Option<i64>) -> Result<i64> {
    if let Some(company) = company {
        return Ok(company);
    }

    let Some(selected) = lookup(config, &ConfigKey::SelectedCompany) else {
        bail!("Company is required for command. Use `compedia company select <id>`.");
    };

    selected
        .parse()
        .with_context(|| format!("Invalid selected company: {}", selected))
}

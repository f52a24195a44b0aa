/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

mod commands;
mod config;
mod input;


use connector::ConnectorError;
use std::process::exit;

/// Prints `e` once; field validation errors get one line per field.
fn report(e: &anyhow::Error) {
    match e.downcast_ref::<ConnectorError>() {
        Some(ConnectorError::Validation(errors)) => {
            for (field, message) in errors.iter() {
                eprintln!("{}: {}", field, message);
            }
        }
        Some(ConnectorError::SessionExpired) => {
            if let Err(e) = config::set_value(config::ConfigKey::AuthToken, None) {
                tracing::warn!("failed to clear expired token: {:#}", e);
            }

            eprintln!("{}", e);
        }
        _ => eprintln!("{:#}", e),
    }
}

#[tokio::main]
pub async fn main() {
    if let Err(e) = commands::base::run_cli().await {
        report(&e);
        exit(1);
    }
}

/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::base::cancel_on_ctrl_c;
use super::print_company_summary;
use crate::config::*;
use crate::input::*;
use anyhow::{Context, Result};
use connector::ConnectorError;
use connector::discover::*;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Prints every industry that finished loading and was not printed yet.
fn print_progress(state: &DiscoverState, shown: &mut BTreeSet<String>) {
    for industry in &state.services {
        let name = &industry.industry;

        if shown.contains(name) || state.loading_companies.get(name).copied().unwrap_or(true) {
            continue;
        }

        println!("===== {} =====", name);
        match state.industries_with_companies.get(name) {
            Some(companies) if !companies.is_empty() => {
                companies.iter().for_each(print_company_summary);
            }
            _ => println!("No companies."),
        }
        println!();

        shown.insert(name.clone());
    }
}

pub async fn handle_discover(refresh: bool) -> Result<()> {
    let request_config = get_request_config(&load_config()?)?;

    if request_config.search_url.is_none() {
        return Err(ConnectorError::MissingSearchServer.into());
    }

    let path = FileStore::default_location().context("Could not find cache directory")?;
    let routine = Arc::new(DiscoverRoutine::new(request_config, Arc::new(FileStore::new(path))));

    if refresh {
        routine.clear();
    }

    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(&cancel);

    let handle = Arc::clone(&routine).spawn();
    let mut state = handle.state();
    let mut shown = BTreeSet::new();

    while !handle.is_finished() {
        tokio::select! {
            _ = cancel.cancelled() => {
                handle.cancel();
                break;
            }
            changed = state.changed() => {
                changed?;
                print_progress(&state.borrow_and_update(), &mut shown);
            }
            _ = tokio::time::sleep(Duration::from_millis(200)) => {}
        }
    }

    let outcome = handle.join().await?;
    print_progress(&routine.state(), &mut shown);

    match outcome {
        DiscoverOutcome::Cached => println!("Served from cache. Use --refresh to fetch again."),
        DiscoverOutcome::Completed {
            fetched,
            resumed_from,
        } if resumed_from > 0 => {
            println!("Resumed at industry {}, fetched {} more.", resumed_from + 1, fetched)
        }
        DiscoverOutcome::Completed { .. } => {}
        DiscoverOutcome::Cancelled { next_index } => println!(
            "Stopped. Run `compedia discover` again to continue at industry {}.",
            next_index + 1
        ),
    }

    Ok(())
}

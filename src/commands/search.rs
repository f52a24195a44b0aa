/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::print_company_summary;
use crate::config::*;
use crate::input::*;
use anyhow::Result;
use connector::search::{self, SearchRequest};

pub async fn handle_search(
    query: Option<String>,
    services: Vec<i64>,
    location: Option<String>,
    page: u32,
    size: u32,
) -> Result<()> {
    let request_config = get_request_config(&load_config()?)?;

    let req = SearchRequest {
        service_ids: services,
        location: location.filter(|location| !location.trim().is_empty()),
        page: page.max(1),
        size: size.max(1),
        ..SearchRequest::new(query.unwrap_or_default().trim())
    };

    let res = search::search_companies(&request_config, &req).await?;

    if res.results.is_empty() {
        println!("No companies found.");
        return Ok(());
    }

    for company in &res.results {
        print_company_summary(company);
    }

    let pages = res.total.div_ceil(req.size as u64).max(1);
    println!();
    println!("Page {} of {} ({} companies)", req.page, pages, res.total);

    Ok(())
}

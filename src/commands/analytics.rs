/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::*;
use crate::input::*;
use anyhow::Result;
use connector::analytics::{self, Bubble, Share};

pub const BAR_WIDTH: usize = 40;
pub const BUBBLE_WIDTH: usize = 10;

/// One line per share: label, a bar scaled to `width` at 100 %, percentage.
pub fn render_bars(shares: &[Share], width: usize) -> Vec<String> {
    let label_width = shares.iter().map(|s| s.label.chars().count()).max().unwrap_or(0);

    shares
        .iter()
        .map(|share| {
            let filled = (share.percentage as usize * width).div_ceil(100).min(width);
            let filled = if share.value == 0 { 0 } else { filled };

            format!(
                "{:<label_width$}  {:<width$}  {:>3}% ({})",
                share.label,
                "#".repeat(filled),
                share.percentage,
                share.value,
            )
        })
        .collect()
}

pub fn render_bubbles(bubbles: &[Bubble], width: usize) -> Vec<String> {
    let label_width = bubbles.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);

    bubbles
        .iter()
        .map(|bubble| {
            let size = (bubble.radius * width as f64).round() as usize;
            let size = if bubble.value > 0 { size.max(1) } else { 0 };

            format!(
                "{:<label_width$}  {:<width$}  {}",
                bubble.label,
                "o".repeat(size),
                bubble.value,
            )
        })
        .collect()
}

fn print_section(title: &str, lines: Vec<String>) {
    println!("===== {} =====", title);

    if lines.is_empty() {
        println!("No data.");
    }

    for line in lines {
        println!("{}", line);
    }

    println!();
}

pub async fn handle_analytics(company: Option<i64>) -> Result<()> {
    let config = load_config()?;
    let company = get_company(&config, company)?;
    let stats = analytics::get_company_analytics(&get_request_config(&config)?, company).await?;

    println!("Profile views: {}", stats.profile_views);
    println!("Search appearances: {}", stats.search_appearances);
    println!("Project views: {}", stats.project_views);
    match stats.conversion_rate() {
        Some(rate) => println!("Search to profile conversion: {}%", rate),
        None => println!("Search to profile conversion: -"),
    }
    println!();

    print_section(
        "Views by industry",
        render_bars(&analytics::percentages(&stats.views_by_industry), BAR_WIDTH),
    );
    print_section(
        "Views by location",
        render_bubbles(&analytics::bubbles(&stats.views_by_location), BUBBLE_WIDTH),
    );
    print_section(
        "Monthly views",
        render_bars(&analytics::percentages(&stats.monthly_views), BAR_WIDTH),
    );

    Ok(())
}

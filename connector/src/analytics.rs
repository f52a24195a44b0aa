/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Company analytics and the chart data derived from them.

use crate::dto::null_as_default;
use crate::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Count {
    #[serde(alias = "name", alias = "industry", alias = "month")]
    pub label: String,
    #[serde(default, alias = "count", alias = "views")]
    pub value: u64,
}

impl Count {
    pub fn new(label: impl Into<String>, value: u64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyAnalytics {
    #[serde(default)]
    pub profile_views: u64,
    #[serde(default)]
    pub search_appearances: u64,
    #[serde(default)]
    pub project_views: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views_by_industry: Vec<Count>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub views_by_location: Vec<Count>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub monthly_views: Vec<Count>,
}

impl CompanyAnalytics {
    /// Share of search appearances that led to a profile view, in percent.
    pub fn conversion_rate(&self) -> Option<f64> {
        if self.search_appearances == 0 {
            return None;
        }

        let rate = self.profile_views as f64 / self.search_appearances as f64 * 100.0;
        Some((rate * 10.0).round() / 10.0)
    }
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Share {
    pub label: String,
    pub value: u64,
    pub percentage: u32,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct Bubble {
    pub label: String,
    pub value: u64,
    /// Relative radius in `0.0..=1.0`; bubble area is proportional to value.
    pub radius: f64,
}

/// Whole percentages that add up to exactly 100 for a non-zero total.
///
/// Largest remainder rounding: every entry gets its floor, the points left
/// over go to the entries with the largest fractional parts, earlier entries
/// first on ties.
pub fn percentages(counts: &[Count]) -> Vec<Share> {
    let total: u128 = counts.iter().map(|count| count.value as u128).sum();

    if total == 0 {
        return counts
            .iter()
            .map(|count| Share {
                label: count.label.clone(),
                value: count.value,
                percentage: 0,
            })
            .collect();
    }

    let mut shares = counts
        .iter()
        .map(|count| {
            let scaled = count.value as u128 * 100;
            (
                Share {
                    label: count.label.clone(),
                    value: count.value,
                    percentage: (scaled / total) as u32,
                },
                scaled % total,
            )
        })
        .collect::<Vec<_>>();

    let assigned: u32 = shares.iter().map(|(share, _)| share.percentage).sum();
    let mut order = (0..shares.len()).collect::<Vec<_>>();
    order.sort_by(|a, b| shares[*b].1.cmp(&shares[*a].1).then(a.cmp(b)));

    for index in order.into_iter().take(100u32.saturating_sub(assigned) as usize) {
        shares[index].0.percentage += 1;
    }

    shares.into_iter().map(|(share, _)| share).collect()
}

pub fn bubbles(counts: &[Count]) -> Vec<Bubble> {
    let max = counts.iter().map(|count| count.value).max().unwrap_or(0);

    counts
        .iter()
        .map(|count| Bubble {
            label: count.label.clone(),
            value: count.value,
            radius: if max == 0 {
                0.0
            } else {
                (count.value as f64 / max as f64).sqrt()
            },
        })
        .collect()
}

pub async fn get_company_analytics(
    config: &RequestConfig,
    company: i64,
) -> ConnectorResult<CompanyAnalytics> {
    let res = send(get_client(
        config,
        &format!("analytics/companies/{}", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

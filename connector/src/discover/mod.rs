/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Background population of the "top companies per industry" overview.
//!
//! Results are kept in a [`KeyValueStore`] under three keys: the services
//! list (`servicesCache`), the companies per industry (`companiesCache`) and
//! the progress lease of a running fetch (`fetchStatus`). A fetch interrupted
//! part way resumes at the industry it was working on.

pub mod cache;
pub mod lease;
pub mod routine;
pub mod storage;

pub use cache::*;
pub use lease::*;
pub use routine::*;
pub use storage::*;

use crate::companies::{self, IndustryServices};
use crate::dto::CompanyDto;
use crate::search::{self, SearchRequest};
use crate::{ConnectorResult, RequestConfig};
use async_trait::async_trait;
use chrono::Duration;
use std::sync::Arc;

pub const SERVICES_CACHE_KEY: &str = "servicesCache";
pub const COMPANIES_CACHE_KEY: &str = "companiesCache";
pub const FETCH_STATUS_KEY: &str = "fetchStatus";

pub const TOP_COMPANIES_PER_INDUSTRY: usize = 4;

pub fn cache_ttl() -> Duration {
    Duration::hours(24)
}

pub fn fetch_status_timeout() -> Duration {
    Duration::minutes(5)
}

/// Content hash of a services list, independent of ordering.
pub fn services_hash(services: &[IndustryServices]) -> String {
    let mut entries = services
        .iter()
        .map(|industry| {
            let mut ids = industry.service_ids();
            ids.sort_unstable();

            let ids = ids
                .iter()
                .map(|id| id.to_string())
                .collect::<Vec<_>>()
                .join(",");

            format!("{}:{}", industry.industry, ids)
        })
        .collect::<Vec<_>>();

    entries.sort();
    entries.join("|")
}

/// What the discover routine needs from the network.
#[async_trait]
pub trait DiscoverBackend: Send + Sync {
    async fn services(&self) -> ConnectorResult<Vec<IndustryServices>>;

    async fn top_companies(&self, service_ids: &[i64], limit: usize) -> ConnectorResult<Vec<CompanyDto>>;
}

#[async_trait]
impl DiscoverBackend for RequestConfig {
    async fn services(&self) -> ConnectorResult<Vec<IndustryServices>> {
        companies::get_services(self).await
    }

    async fn top_companies(&self, service_ids: &[i64], limit: usize) -> ConnectorResult<Vec<CompanyDto>> {
        let req = SearchRequest::top_for_services(service_ids.to_vec(), limit as u32);
        Ok(search::search_companies(self, &req).await?.results)
    }
}

#[async_trait]
impl<T: DiscoverBackend + ?Sized> DiscoverBackend for Arc<T> {
    async fn services(&self) -> ConnectorResult<Vec<IndustryServices>> {
        (**self).services().await
    }

    async fn top_companies(&self, service_ids: &[i64], limit: usize) -> ConnectorResult<Vec<CompanyDto>> {
        (**self).top_companies(service_ids, limit).await
    }
}

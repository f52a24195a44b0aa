/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::{null_as_default, CompanyDto};
use crate::*;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 10;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub service_ids: Vec<i64>,
    pub location: Option<String>,
    pub page: u32,
    pub size: u32,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            service_ids: Vec::new(),
            location: None,
            page: 1,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// Top companies offering any of `service_ids`, no text or location filter.
    pub fn top_for_services(service_ids: Vec<i64>, size: u32) -> Self {
        Self {
            service_ids,
            size,
            ..Default::default()
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    #[serde(default, alias = "companies", deserialize_with = "null_as_default")]
    pub results: Vec<CompanyDto>,
    #[serde(default, alias = "totalCount")]
    pub total: u64,
}

pub async fn search_companies(config: &RequestConfig, req: &SearchRequest) -> ConnectorResult<SearchResponse> {
    let res = send(get_search_client(config, "search", RequestType::POST)?.json(req)).await?;
    parse_response(res).await
}

/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

#![allow(dead_code)]

use async_trait::async_trait;
use connector::companies::{IndustryServices, ServiceRef};
use connector::discover::DiscoverBackend;
use connector::dto::CompanyDto;
use connector::{ConnectorError, ConnectorResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Services and companies served from memory, recording every call.
pub struct MockBackend {
    pub services: Vec<IndustryServices>,
    pub companies_per_industry: usize,
    /// Service ids whose industry fails to load.
    pub failing: Vec<i64>,
    /// Service id whose industry never finishes loading.
    pub blocking: Option<i64>,
    pub service_calls: AtomicUsize,
    pub company_calls: Mutex<Vec<Vec<i64>>>,
}

impl MockBackend {
    pub fn new(services: Vec<IndustryServices>) -> Self {
        Self {
            services,
            companies_per_industry: 6,
            failing: Vec::new(),
            blocking: None,
            service_calls: AtomicUsize::new(0),
            company_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(mut self, service_id: i64) -> Self {
        self.failing.push(service_id);
        self
    }

    pub fn blocking(mut self, service_id: i64) -> Self {
        self.blocking = Some(service_id);
        self
    }

    pub fn service_calls(&self) -> usize {
        self.service_calls.load(Ordering::SeqCst)
    }

    pub fn company_calls(&self) -> Vec<Vec<i64>> {
        self.company_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DiscoverBackend for MockBackend {
    async fn services(&self) -> ConnectorResult<Vec<IndustryServices>> {
        self.service_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.services.clone())
    }

    async fn top_companies(&self, service_ids: &[i64], _limit: usize) -> ConnectorResult<Vec<CompanyDto>> {
        self.company_calls.lock().unwrap().push(service_ids.to_vec());

        if self.blocking.is_some_and(|id| service_ids.contains(&id)) {
            std::future::pending::<()>().await;
        }

        if service_ids.iter().any(|id| self.failing.contains(id)) {
            return Err(ConnectorError::Api {
                status: 500,
                message: "search unavailable".to_string(),
            });
        }

        Ok((0..self.companies_per_industry)
            .map(|n| company(service_ids[0] * 100 + n as i64))
            .collect())
    }
}

pub fn company(id: i64) -> CompanyDto {
    CompanyDto {
        id,
        name: format!("Company {}", id),
        ..Default::default()
    }
}

/// Industries `A`, `B`, ... each with a single service numbered from 1.
pub fn industries(count: usize) -> Vec<IndustryServices> {
    (0..count)
        .map(|n| IndustryServices {
            industry: ((b'A' + n as u8) as char).to_string(),
            services: vec![ServiceRef {
                id: n as i64 + 1,
                name: format!("Service {}", n + 1),
            }],
        })
        .collect()
}

/// Serves `router` on an ephemeral local port and returns its base URL.
pub async fn serve(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    format!("http://{}", addr)
}

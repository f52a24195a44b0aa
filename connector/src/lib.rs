/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

pub mod analytics;
pub mod auth;
pub mod companies;
pub mod discover;
pub mod dto;
pub mod invitations;
pub mod projects;
pub mod reviews;
pub mod search;
pub mod session;
pub mod users;

mod error;

#[cfg(test)]
mod tests;

pub use error::*;

use serde::de::DeserializeOwned;
use std::sync::OnceLock;
use tracing::debug;

/// Per-call request state: where the backend lives and who is calling.
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub server_url: String,
    pub search_url: Option<String>,
    pub token: Option<String>,
}

impl RequestConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into().trim_end_matches('/').to_string(),
            ..Default::default()
        }
    }

    pub fn with_search_url(mut self, search_url: Option<String>) -> Self {
        self.search_url = search_url.map(|url| url.trim_end_matches('/').to_string());
        self
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|token| !token.is_empty());
        self
    }
}

pub type RequestType = reqwest::Method;

fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(reqwest::Client::new)
}

fn build_request(
    config: &RequestConfig,
    url: String,
    request_type: RequestType,
    login: bool,
) -> ConnectorResult<reqwest::RequestBuilder> {
    debug!(method = %request_type, %url, "building request");

    let mut client = http_client()
        .request(request_type, url)
        .header("Content-Type", "application/json");

    if !login {
        return Ok(client);
    }

    let token = config.token.as_ref().ok_or(ConnectorError::MissingToken)?;
    client = client.header("Authorization", format!("Bearer {}", token));

    Ok(client)
}

pub(crate) fn get_client(
    config: &RequestConfig,
    endpoint: &str,
    request_type: RequestType,
    login: bool,
) -> ConnectorResult<reqwest::RequestBuilder> {
    build_request(
        config,
        format!("{}/api/{}", config.server_url, endpoint),
        request_type,
        login,
    )
}

pub(crate) fn get_search_client(
    config: &RequestConfig,
    endpoint: &str,
    request_type: RequestType,
) -> ConnectorResult<reqwest::RequestBuilder> {
    let search_url = config
        .search_url
        .as_ref()
        .ok_or(ConnectorError::MissingSearchServer)?;

    build_request(
        config,
        format!("{}/{}", search_url, endpoint),
        request_type,
        config.token.is_some(),
    )
}

/// Reads the body and rejects anything that is not a 2xx.
async fn checked_body(res: reqwest::Response) -> ConnectorResult<Vec<u8>> {
    let status = res.status();
    let bytes = res.bytes().await?;

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Err(ConnectorError::SessionExpired);
    }

    if !status.is_success() {
        return Err(ConnectorError::Api {
            status: status.as_u16(),
            message: extract_error_message(status.as_u16(), &bytes),
        });
    }

    Ok(bytes.to_vec())
}

pub(crate) async fn parse_response<T: DeserializeOwned>(
    res: reqwest::Response,
) -> ConnectorResult<T> {
    let body = checked_body(res).await?;
    Ok(serde_json::from_slice::<T>(&body)?)
}

pub(crate) async fn expect_success(res: reqwest::Response) -> ConnectorResult<()> {
    checked_body(res).await.map(|_| ())
}

pub(crate) async fn send(client: reqwest::RequestBuilder) -> ConnectorResult<reqwest::Response> {
    Ok(client.send().await?)
}

const MAX_RAW_MESSAGE_LEN: usize = 200;

/// Best-effort human readable message from an error body: `message`, then
/// `title`, then a short plain-text body, then a generic fallback.
pub fn extract_error_message(status: u16, body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        for field in ["message", "title"] {
            if let Some(message) = value.get(field).and_then(|v| v.as_str()) {
                if !message.trim().is_empty() {
                    return message.trim().to_string();
                }
            }
        }

        if let Some(message) = value.as_str() {
            if !message.trim().is_empty() {
                return message.trim().to_string();
            }
        }
    } else {
        let raw = String::from_utf8_lossy(body);
        let raw = raw.trim();

        if !raw.is_empty() && raw.len() <= MAX_RAW_MESSAGE_LEN && !raw.starts_with('<') {
            return raw.to_string();
        }
    }

    format!("Request failed with status {}", status)
}

pub async fn health(config: &RequestConfig) -> ConnectorResult<()> {
    let res = send(get_client(config, "health", RequestType::GET, false)?).await?;
    expect_success(res).await
}

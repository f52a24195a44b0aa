/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::session::Session;
use crate::*;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const VERIFICATION_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Serialize, Deserialize, Debug)]
struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct LoginResponse {
    pub token: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct EmailRequest {
    pub email: String,
}

#[derive(Serialize, Deserialize, Debug)]
struct VerifiedResponse {
    #[serde(default, alias = "isVerified")]
    pub verified: bool,
}

pub async fn login(config: &RequestConfig, email: String, password: String) -> ConnectorResult<Session> {
    let req = LoginRequest { email, password };

    let res = send(get_client(config, "auth/login", RequestType::POST, false)?.json(&req)).await?;
    let res: LoginResponse = parse_response(res).await?;

    Session::from_token(&res.token)
}

pub async fn register(config: &RequestConfig, req: &RegisterRequest) -> ConnectorResult<()> {
    let res = send(get_client(config, "auth/register", RequestType::POST, false)?.json(req)).await?;
    expect_success(res).await
}

pub async fn email_verified(config: &RequestConfig, email: &str) -> ConnectorResult<bool> {
    let client = get_client(config, "auth/email-verified", RequestType::GET, false)?
        .query(&[("email", email)]);

    let res: VerifiedResponse = parse_response(send(client).await?).await?;
    Ok(res.verified)
}

pub async fn resend_verification(config: &RequestConfig, email: String) -> ConnectorResult<()> {
    let req = EmailRequest { email };

    let res = send(
        get_client(config, "auth/resend-verification", RequestType::POST, false)?.json(&req),
    )
    .await?;

    expect_success(res).await
}

/// Polls until the address is verified (`Ok(true)`) or `cancel` fires
/// (`Ok(false)`). Transient failures are logged and retried on the next tick.
pub async fn wait_for_verification(
    config: &RequestConfig,
    email: &str,
    every: Duration,
    cancel: &CancellationToken,
) -> ConnectorResult<bool> {
    let mut interval = time::interval(every);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(email, "verification polling cancelled");
                return Ok(false);
            }
            _ = interval.tick() => {}
        }

        match email_verified(config, email).await {
            Ok(true) => {
                info!(email, "email verified");
                return Ok(true);
            }
            Ok(false) => debug!(email, "email not verified yet"),
            Err(ConnectorError::SessionExpired) => return Err(ConnectorError::SessionExpired),
            Err(e) => warn!(email, "verification check failed: {}", e),
        }
    }
}

/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::session::User;
use crate::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}

pub async fn get_user(config: &RequestConfig, user: i64) -> ConnectorResult<User> {
    let res = send(get_client(
        config,
        &format!("users/{}", user),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

pub async fn update_user(
    config: &RequestConfig,
    user: i64,
    req: &UpdateUserRequest,
) -> ConnectorResult<User> {
    let res = send(
        get_client(config, &format!("users/{}", user), RequestType::PUT, true)?.json(req),
    )
    .await?;

    parse_response(res).await
}

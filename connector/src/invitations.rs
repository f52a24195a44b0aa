/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::{deserialize_id, deserialize_opt_id, null_as_default};
use crate::*;
use chrono::{DateTime, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvitationStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Accepted")]
    Accepted,
    #[serde(alias = "Rejected", alias = "declined")]
    Rejected,
}

impl fmt::Display for InvitationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvitationStatus::Pending => "pending",
            InvitationStatus::Accepted => "accepted",
            InvitationStatus::Rejected => "rejected",
        };

        write!(f, "{}", label)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub company_id: Option<i64>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default, alias = "sentDate")]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: InvitationStatus,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct SendInvitationRequest {
    pub email: String,
    pub company_id: i64,
}

pub async fn send_invitation(
    config: &RequestConfig,
    email: String,
    company: i64,
) -> ConnectorResult<Invitation> {
    if !EmailAddress::is_valid(email.trim()) {
        let mut errors = FieldErrors::new();
        errors.insert("email", "Enter a valid email address");
        return Err(errors.into());
    }

    let req = SendInvitationRequest {
        email: email.trim().to_string(),
        company_id: company,
    };

    let res = send(get_client(config, "invitations", RequestType::POST, true)?.json(&req)).await?;
    parse_response(res).await
}

/// Invitations addressed to the logged in user.
pub async fn get_invitations(config: &RequestConfig) -> ConnectorResult<Vec<Invitation>> {
    let res = send(get_client(config, "invitations", RequestType::GET, true)?).await?;
    parse_response(res).await
}

pub async fn get_company_invitations(
    config: &RequestConfig,
    company: i64,
) -> ConnectorResult<Vec<Invitation>> {
    let res = send(get_client(
        config,
        &format!("companies/{}/invitations", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

async fn respond(
    config: &RequestConfig,
    invitation: &mut Invitation,
    outcome: InvitationStatus,
) -> ConnectorResult<()> {
    if invitation.status != InvitationStatus::Pending {
        let mut errors = FieldErrors::new();
        errors.insert("status", format!("Invitation is already {}", invitation.status));
        return Err(errors.into());
    }

    let action = match outcome {
        InvitationStatus::Rejected => "reject",
        _ => "accept",
    };

    let res = send(get_client(
        config,
        &format!("invitations/{}/{}", invitation.id, action),
        RequestType::POST,
        true,
    )?)
    .await?;

    expect_success(res).await?;
    invitation.status = outcome;

    Ok(())
}

/// The invitation is only updated after the backend confirmed the action.
pub async fn accept(config: &RequestConfig, invitation: &mut Invitation) -> ConnectorResult<()> {
    respond(config, invitation, InvitationStatus::Accepted).await
}

pub async fn reject(config: &RequestConfig, invitation: &mut Invitation) -> ConnectorResult<()> {
    respond(config, invitation, InvitationStatus::Rejected).await
}

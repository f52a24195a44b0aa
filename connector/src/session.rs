/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::{deserialize_id, null_as_default};
use crate::*;
use chrono::{DateTime, Utc};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCompany {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default, deserialize_with = "deserialize_companies")]
    pub companies: Vec<UserCompany>,
}

/// Company claims are sometimes embedded as a JSON encoded string.
fn deserialize_companies<'de, D>(d: D) -> Result<Vec<UserCompany>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Companies {
        List(Vec<UserCompany>),
        Encoded(String),
    }

    match Option::<Companies>::deserialize(d)? {
        None => Ok(Vec::new()),
        Some(Companies::List(companies)) => Ok(companies),
        Some(Companies::Encoded(text)) => {
            serde_json::from_str(&text).map_err(serde::de::Error::custom)
        }
    }
}

/// Claim names some issuers use instead of the user fields.
const CLAIM_ALIASES: &[(&str, &str)] = &[("sub", "id"), ("unique_name", "username")];

/// Moves aliased claims onto the user field names; an explicit field wins.
fn normalize_claims(mut claims: serde_json::Value) -> serde_json::Value {
    if let Some(map) = claims.as_object_mut() {
        for (alias, field) in CLAIM_ALIASES {
            if let Some(value) = map.remove(*alias) {
                if !map.get(*field).is_some_and(|v| !v.is_null()) {
                    map.insert(field.to_string(), value);
                }
            }
        }
    }

    claims
}

/// Authenticated session: the bearer token and the user it was issued for.
///
/// The signature is verified by the backend on every call; locally the token
/// is only decoded to learn who is logged in and until when.
#[derive(Debug, Clone)]
pub struct Session {
    token: String,
    user: User,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn from_token(token: &str) -> ConnectorResult<Self> {
        let header = jsonwebtoken::decode_header(token)?;

        let mut validation = Validation::new(header.alg);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let claims = jsonwebtoken::decode::<serde_json::Value>(
            token,
            &DecodingKey::from_secret(&[]),
            &validation,
        )?
        .claims;

        let expires_at = claims
            .get("exp")
            .and_then(|exp| exp.as_i64())
            .and_then(|exp| DateTime::<Utc>::from_timestamp(exp, 0));

        Ok(Self {
            token: token.to_string(),
            user: serde_json::from_value(normalize_claims(claims))?,
            expires_at,
        })
    }

    /// Restores a persisted token, dropping it if it cannot be decoded or
    /// has expired.
    pub fn restore(token: Option<&str>) -> Option<Self> {
        let token = token.filter(|token| !token.is_empty())?;

        match Session::from_token(token) {
            Ok(session) if !session.is_expired() => Some(session),
            Ok(_) => {
                tracing::info!("stored session token has expired");
                None
            }
            Err(e) => {
                tracing::warn!("discarding unreadable session token: {}", e);
                None
            }
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|exp| exp <= Utc::now())
    }

    pub fn belongs_to(&self, company_id: i64) -> bool {
        self.user.companies.iter().any(|company| company.id == company_id)
    }

    pub fn request_config(&self, server_url: &str, search_url: Option<String>) -> RequestConfig {
        RequestConfig::new(server_url)
            .with_search_url(search_url)
            .with_token(Some(self.token.clone()))
    }
}

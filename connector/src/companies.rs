/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::*;
use crate::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRef {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// An industry and the services grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndustryServices {
    pub industry: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<ServiceRef>,
}

impl IndustryServices {
    pub fn service_ids(&self) -> Vec<i64> {
        self.services.iter().map(|service| service.id).collect()
    }
}

async fn company_from(res: reqwest::Response) -> ConnectorResult<CompanyDto> {
    let value: serde_json::Value = parse_response(res).await?;
    Ok(CompanyDto::from_response(value)?)
}

pub async fn get_company(config: &RequestConfig, company: i64) -> ConnectorResult<CompanyDto> {
    let res = send(get_client(
        config,
        &format!("companies/{}", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    company_from(res).await
}

pub async fn get_user_companies(config: &RequestConfig, user: i64) -> ConnectorResult<Vec<CompanyDto>> {
    let res = send(get_client(
        config,
        &format!("users/{}/companies", user),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

/// Validates locally first and only posts a request the backend can accept.
pub async fn create_company(
    config: &RequestConfig,
    req: &CreateCompanyRequestDto,
) -> ConnectorResult<CompanyDto> {
    req.validate()?;

    let res = send(get_client(config, "companies", RequestType::POST, true)?.json(req)).await?;
    company_from(res).await
}

/// Runs the backend's validation rules without creating anything.
pub async fn validate(
    config: &RequestConfig,
    req: &CreateCompanyRequestDto,
) -> ConnectorResult<FieldErrors> {
    let res = send(get_client(config, "companies/validate", RequestType::POST, true)?.json(req))
        .await?;

    #[derive(Deserialize)]
    struct ValidationResponse {
        #[serde(default, deserialize_with = "null_as_default")]
        errors: FieldErrors,
    }

    let res: ValidationResponse = parse_response(res).await?;
    Ok(res.errors)
}

pub async fn update_company(
    config: &RequestConfig,
    company: i64,
    profile: &CompanyProfileDto,
) -> ConnectorResult<CompanyDto> {
    let res = send(
        get_client(
            config,
            &format!("companies/{}", company),
            RequestType::PUT,
            true,
        )?
        .json(profile),
    )
    .await?;

    company_from(res).await
}

pub async fn delete_company(config: &RequestConfig, company: i64) -> ConnectorResult<()> {
    let res = send(get_client(
        config,
        &format!("companies/{}", company),
        RequestType::DELETE,
        true,
    )?)
    .await?;

    expect_success(res).await
}

pub async fn get_company_projects(
    config: &RequestConfig,
    company: i64,
) -> ConnectorResult<Vec<ProjectDto>> {
    let res = send(get_client(
        config,
        &format!("companies/{}/projects", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    let values: Vec<serde_json::Value> = parse_response(res).await?;
    Ok(values
        .into_iter()
        .map(ProjectDto::from_response)
        .collect::<Result<Vec<_>, _>>()?)
}

pub async fn get_services(config: &RequestConfig) -> ConnectorResult<Vec<IndustryServices>> {
    let res = send(get_client(
        config,
        "companies/services",
        RequestType::GET,
        config.token.is_some(),
    )?)
    .await?;

    parse_response(res).await
}

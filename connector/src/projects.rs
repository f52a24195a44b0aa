/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::*;
use crate::*;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct CompleteProjectRequest {
    pub company_id: i64,
}

async fn project_from(res: reqwest::Response) -> ConnectorResult<ProjectDto> {
    let value: serde_json::Value = parse_response(res).await?;
    Ok(ProjectDto::from_response(value)?)
}

pub async fn get_project(config: &RequestConfig, project: i64) -> ConnectorResult<ProjectDto> {
    let res = send(get_client(
        config,
        &format!("projects/{}", project),
        RequestType::GET,
        true,
    )?)
    .await?;

    project_from(res).await
}

pub async fn create_project(config: &RequestConfig, project: &ProjectDto) -> ConnectorResult<ProjectDto> {
    project.validate()?;

    let res = send(get_client(config, "projects", RequestType::POST, true)?.json(project)).await?;
    project_from(res).await
}

pub async fn update_project(config: &RequestConfig, project: &ProjectDto) -> ConnectorResult<ProjectDto> {
    project.validate()?;

    let res = send(
        get_client(
            config,
            &format!("projects/{}", project.id),
            RequestType::PUT,
            true,
        )?
        .json(project),
    )
    .await?;

    project_from(res).await
}

pub async fn delete_project(config: &RequestConfig, project: i64) -> ConnectorResult<()> {
    let res = send(get_client(
        config,
        &format!("projects/{}", project),
        RequestType::DELETE,
        true,
    )?)
    .await?;

    expect_success(res).await
}

/// Submits a project to the counterpart company for approval.
pub async fn request_project(
    config: &RequestConfig,
    request: &ProjectRequestDto,
) -> ConnectorResult<ProjectRequestDto> {
    request.project.validate()?;

    let res = send(get_client(config, "projects/requests", RequestType::POST, true)?.json(request))
        .await?;

    parse_response(res).await
}

pub async fn get_project_requests(
    config: &RequestConfig,
    company: i64,
) -> ConnectorResult<Vec<ProjectRequestDto>> {
    let res = send(get_client(
        config,
        &format!("companies/{}/project-requests", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

async fn decide_request(
    config: &RequestConfig,
    request: &mut ProjectRequestDto,
    decision: RequestStatus,
) -> ConnectorResult<()> {
    let request_id = request.request_id.ok_or_else(|| {
        let mut errors = FieldErrors::new();
        errors.insert("request_id", "Request has not been submitted");
        ConnectorError::Validation(errors)
    })?;

    if !request.is_pending() {
        let mut errors = FieldErrors::new();
        errors.insert("status", format!("Request is already {}", request.status));
        return Err(errors.into());
    }

    let action = match decision {
        RequestStatus::Declined => "decline",
        _ => "approve",
    };

    let res = send(get_client(
        config,
        &format!("projects/requests/{}/{}", request_id, action),
        RequestType::POST,
        true,
    )?)
    .await?;

    expect_success(res).await?;
    request.resolve(decision)?;

    Ok(())
}

/// The local status only changes once the backend accepted the decision.
pub async fn approve_request(config: &RequestConfig, request: &mut ProjectRequestDto) -> ConnectorResult<()> {
    decide_request(config, request, RequestStatus::Approved).await
}

pub async fn decline_request(config: &RequestConfig, request: &mut ProjectRequestDto) -> ConnectorResult<()> {
    decide_request(config, request, RequestStatus::Declined).await
}

/// Marks the project completed from `company`'s side and returns the
/// backend's view, which carries both sides' flags.
pub async fn mark_completed(
    config: &RequestConfig,
    project: i64,
    company: i64,
) -> ConnectorResult<ProjectDto> {
    let req = CompleteProjectRequest { company_id: company };

    let res = send(
        get_client(
            config,
            &format!("projects/{}/complete", project),
            RequestType::POST,
            true,
        )?
        .json(&req),
    )
    .await?;

    project_from(res).await
}

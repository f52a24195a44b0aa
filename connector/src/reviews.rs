/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::dto::{deserialize_id, null_as_default, ProjectDto};
use crate::*;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const RATING_RANGE: RangeInclusive<u8> = 1..=5;
pub const MAX_COMMENT_LEN: usize = 2000;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRequest {
    pub project_id: i64,
    pub company_id: i64,
    pub rating: u8,
    pub comment: String,
}

impl ReviewRequest {
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if !RATING_RANGE.contains(&self.rating) {
            errors.insert(
                "rating",
                format!(
                    "Rating must be between {} and {}",
                    RATING_RANGE.start(),
                    RATING_RANGE.end()
                ),
            );
        }

        if self.comment.trim().is_empty() {
            errors.insert("comment", "Comment is required");
        } else if self.comment.chars().count() > MAX_COMMENT_LEN {
            errors.insert(
                "comment",
                format!("Comment cannot exceed {} characters", MAX_COMMENT_LEN),
            );
        }

        errors.into_result()
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "deserialize_id")]
    pub project_id: i64,
    #[serde(default)]
    pub project_name: Option<String>,
    #[serde(default)]
    pub reviewer_name: Option<String>,
    #[serde(default)]
    pub rating: u8,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Posting requires the project to be completed by both sides.
pub async fn post_review(
    config: &RequestConfig,
    project: &ProjectDto,
    req: &ReviewRequest,
) -> ConnectorResult<Review> {
    let mut errors = match req.validate() {
        Ok(()) => FieldErrors::new(),
        Err(errors) => errors,
    };

    if !project.is_reviewable() {
        errors.insert(
            "project_id",
            "Both companies must mark the project as completed before it can be reviewed",
        );
    }

    errors.into_result()?;

    let res = send(get_client(config, "reviews", RequestType::POST, true)?.json(req)).await?;
    parse_response(res).await
}

pub async fn get_company_reviews(config: &RequestConfig, company: i64) -> ConnectorResult<Vec<Review>> {
    let res = send(get_client(
        config,
        &format!("companies/{}/reviews", company),
        RequestType::GET,
        true,
    )?)
    .await?;

    parse_response(res).await
}

/// Mean rating rounded to one decimal, `None` without reviews.
pub fn average_rating(reviews: &[Review]) -> Option<f64> {
    if reviews.is_empty() {
        return None;
    }

    let total: u32 = reviews.iter().map(|review| review.rating as u32).sum();
    let average = total as f64 / reviews.len() as f64;
    Some((average * 10.0).round() / 10.0)
}

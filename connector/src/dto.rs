/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

//! Data transfer objects shared between forms, the backend and the cache.
//!
//! Reading is lenient: lists may arrive as arrays, comma separated strings or
//! `null`, ids as numbers or strings. List fields that describe a company or a
//! project are never empty after construction; they fall back to
//! [`NOT_SPECIFIED`].

use crate::FieldErrors;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use email_address::EmailAddress;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

pub const NOT_SPECIFIED: &str = "Not specified";
pub const EARLIEST_FOUNDED_YEAR: i32 = 1800;

/// Raw form input keyed by field name.
pub type FormData = HashMap<String, String>;

pub fn not_specified() -> Vec<String> {
    vec![NOT_SPECIFIED.to_string()]
}

fn not_specified_text() -> String {
    NOT_SPECIFIED.to_string()
}

/// Trims entries, drops empty ones and falls back to `["Not specified"]`.
pub fn or_not_specified(items: Vec<String>) -> Vec<String> {
    let items = items
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect::<Vec<_>>();

    if items.is_empty() { not_specified() } else { items }
}

pub fn split_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok()
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ListOrString {
    List(Vec<Option<String>>),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Number(i64),
    Text(String),
}

impl IdRepr {
    fn into_id(self) -> Option<i64> {
        match self {
            IdRepr::Number(id) => Some(id),
            IdRepr::Text(text) => text.trim().parse().ok(),
        }
    }
}

fn deserialize_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let items = match Option::<ListOrString>::deserialize(d)? {
        None => Vec::new(),
        Some(ListOrString::List(items)) => items.into_iter().flatten().collect(),
        Some(ListOrString::Text(text)) => split_list(&text),
    };

    Ok(or_not_specified(items))
}

fn deserialize_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(not_specified_text))
}

pub(crate) fn deserialize_id<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    Ok(Option::<IdRepr>::deserialize(d)?
        .and_then(IdRepr::into_id)
        .unwrap_or_default())
}

pub(crate) fn deserialize_opt_id<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(Option::<IdRepr>::deserialize(d)?.and_then(IdRepr::into_id))
}

fn deserialize_date<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
    Ok(Option::<String>::deserialize(d)?
        .as_deref()
        .and_then(parse_date))
}

pub(crate) fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

fn field(form: &FormData, key: &str) -> Option<String> {
    form.get(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn list_field(form: &FormData, key: &str) -> Vec<String> {
    or_not_specified(field(form, key).map(|v| split_list(&v)).unwrap_or_default())
}

fn id_field(form: &FormData, key: &str, errors: &mut FieldErrors) -> Option<i64> {
    let value = field(form, key)?;
    match value.parse::<i64>() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.insert(key, format!("`{}` is not a valid id", value));
            None
        }
    }
}

fn date_field(form: &FormData, key: &str, errors: &mut FieldErrors) -> Option<NaiveDate> {
    let value = field(form, key)?;
    match parse_date(&value) {
        Some(date) => Some(date),
        None => {
            errors.insert(key, "Use the format YYYY-MM-DD");
            None
        }
    }
}

fn year_field(form: &FormData, key: &str, errors: &mut FieldErrors) -> Option<i32> {
    let value = field(form, key)?;
    match value.parse::<i32>() {
        Ok(year) => Some(year),
        Err(_) => {
            errors.insert(key, format!("`{}` is not a valid year", value));
            None
        }
    }
}

fn check_founded_year(year: Option<i32>, errors: &mut FieldErrors) {
    if let Some(year) = year {
        let current = Utc::now().year();
        if !(EARLIEST_FOUNDED_YEAR..=current).contains(&year) {
            errors.insert(
                "founded_year",
                format!("Year must be between {} and {}", EARLIEST_FOUNDED_YEAR, current),
            );
        }
    }
}

fn join(items: &[String]) -> String {
    items
        .iter()
        .filter(|item| item.as_str() != NOT_SPECIFIED)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDto {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default = "not_specified", deserialize_with = "deserialize_list")]
    pub specialties: Vec<String>,
    #[serde(default = "not_specified", deserialize_with = "deserialize_list")]
    pub expertise: Vec<String>,
    #[serde(default, alias = "isVerified", deserialize_with = "null_as_default")]
    pub verified: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: Vec<ProjectDto>,
    #[serde(default = "not_specified", deserialize_with = "deserialize_list")]
    pub industries: Vec<String>,
    #[serde(default = "not_specified_text", deserialize_with = "deserialize_text")]
    pub location: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(
        default = "not_specified",
        alias = "technologies",
        deserialize_with = "deserialize_list"
    )]
    pub technologies_used: Vec<String>,
    #[serde(default = "not_specified", deserialize_with = "deserialize_list")]
    pub partnerships: Vec<String>,
    #[serde(default = "not_specified_text", deserialize_with = "deserialize_text")]
    pub size: String,
    #[serde(default)]
    pub founded_year: Option<i32>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, alias = "email")]
    pub contact_email: Option<String>,
    #[serde(default, alias = "phone")]
    pub contact_phone: Option<String>,
}

impl Default for CompanyDto {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            specialties: not_specified(),
            expertise: not_specified(),
            verified: false,
            projects: Vec::new(),
            industries: not_specified(),
            location: not_specified_text(),
            website: None,
            technologies_used: not_specified(),
            partnerships: not_specified(),
            size: not_specified_text(),
            founded_year: None,
            address: None,
            contact_email: None,
            contact_phone: None,
        }
    }
}

impl CompanyDto {
    pub fn from_response(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }
}

/// Editable part of a company, sent when updating a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfileDto {
    pub name: String,
    pub description: String,
    pub specialties: Vec<String>,
    pub expertise: Vec<String>,
    pub industries: Vec<String>,
    pub location: String,
    pub website: Option<String>,
    pub technologies_used: Vec<String>,
    pub partnerships: Vec<String>,
    pub size: String,
    pub founded_year: Option<i32>,
    pub address: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

impl CompanyProfileDto {
    pub fn from_company(company: &CompanyDto) -> Self {
        Self {
            name: company.name.clone(),
            description: company.description.clone(),
            specialties: or_not_specified(company.specialties.clone()),
            expertise: or_not_specified(company.expertise.clone()),
            industries: or_not_specified(company.industries.clone()),
            location: company.location.clone(),
            website: company.website.clone(),
            technologies_used: or_not_specified(company.technologies_used.clone()),
            partnerships: or_not_specified(company.partnerships.clone()),
            size: company.size.clone(),
            founded_year: company.founded_year,
            address: company.address.clone(),
            contact_email: company.contact_email.clone(),
            contact_phone: company.contact_phone.clone(),
        }
    }

    pub fn from_form_data(form: &FormData) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();
        let founded_year = year_field(form, "founded_year", &mut errors);
        check_founded_year(founded_year, &mut errors);

        let profile = Self {
            name: field(form, "name").unwrap_or_default(),
            description: field(form, "description").unwrap_or_default(),
            specialties: list_field(form, "specialties"),
            expertise: list_field(form, "expertise"),
            industries: list_field(form, "industries"),
            location: field(form, "location").unwrap_or_else(not_specified_text),
            website: field(form, "website"),
            technologies_used: list_field(form, "technologies"),
            partnerships: list_field(form, "partnerships"),
            size: field(form, "size").unwrap_or_else(not_specified_text),
            founded_year,
            address: field(form, "address"),
            contact_email: field(form, "contact_email"),
            contact_phone: field(form, "contact_phone"),
        };

        if profile.name.is_empty() {
            errors.insert("name", "Company name is required");
        }

        if let Some(email) = &profile.contact_email {
            if !EmailAddress::is_valid(email) {
                errors.insert("contact_email", "Enter a valid email address");
            }
        }

        errors.into_result().map(|_| profile)
    }

    /// Form prefilled with the current values, suitable for editing.
    pub fn to_form_data(&self) -> Vec<(String, Option<String>)> {
        let text = |value: &str| Some(value.to_string()).filter(|v| v != NOT_SPECIFIED);

        vec![
            ("name".to_string(), text(&self.name)),
            ("description".to_string(), text(&self.description)),
            ("specialties".to_string(), text(&join(&self.specialties))),
            ("expertise".to_string(), text(&join(&self.expertise))),
            ("industries".to_string(), text(&join(&self.industries))),
            ("location".to_string(), text(&self.location)),
            ("website".to_string(), self.website.clone()),
            ("technologies".to_string(), text(&join(&self.technologies_used))),
            ("partnerships".to_string(), text(&join(&self.partnerships))),
            ("size".to_string(), text(&self.size)),
            ("founded_year".to_string(), self.founded_year.map(|y| y.to_string())),
            ("address".to_string(), self.address.clone()),
            ("contact_email".to_string(), self.contact_email.clone()),
            ("contact_phone".to_string(), self.contact_phone.clone()),
        ]
        .into_iter()
        .map(|(key, value)| (key, value.filter(|v| !v.is_empty())))
        .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDto {
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(
        default = "not_specified",
        alias = "technologies",
        deserialize_with = "deserialize_list"
    )]
    pub technologies_used: Vec<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub impact: Option<String>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "deserialize_date")]
    pub completion_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed_by_client: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_completed_by_provider: bool,
    #[serde(default, alias = "projectUrl")]
    pub url: Option<String>,
    #[serde(default)]
    pub client_type: Option<String>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub client_company_id: Option<i64>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub provider_company_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_company: Option<Box<CompanyDto>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider_company: Option<Box<CompanyDto>>,
}

impl Default for ProjectDto {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            description: String::new(),
            technologies_used: not_specified(),
            industry: None,
            impact: None,
            start_date: None,
            completion_date: None,
            is_completed_by_client: false,
            is_completed_by_provider: false,
            url: None,
            client_type: None,
            client_company_id: None,
            provider_company_id: None,
            client_company: None,
            provider_company: None,
        }
    }
}

impl ProjectDto {
    pub fn from_response(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let mut project: Self = serde_json::from_value(value)?;

        if project.client_company_id.is_none() {
            project.client_company_id = project.client_company.as_ref().map(|c| c.id);
        }

        if project.provider_company_id.is_none() {
            project.provider_company_id = project.provider_company.as_ref().map(|c| c.id);
        }

        Ok(project)
    }

    pub fn from_form_data(form: &FormData) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let project = Self {
            name: field(form, "name").unwrap_or_default(),
            description: field(form, "description").unwrap_or_default(),
            technologies_used: list_field(form, "technologies"),
            industry: field(form, "industry"),
            impact: field(form, "impact"),
            start_date: date_field(form, "start_date", &mut errors),
            completion_date: date_field(form, "completion_date", &mut errors),
            url: field(form, "url"),
            client_type: field(form, "client_type"),
            client_company_id: id_field(form, "client_company_id", &mut errors),
            provider_company_id: id_field(form, "provider_company_id", &mut errors),
            ..Default::default()
        };

        if let Err(validation) = project.validate() {
            errors.merge(validation);
        }

        errors.into_result().map(|_| project)
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if self.name.trim().is_empty() {
            errors.insert("name", "Project name is required");
        }

        if self.description.trim().is_empty() {
            errors.insert("description", "Project description is required");
        }

        if self.client_company_id.is_none() && self.provider_company_id.is_none() {
            errors.insert(
                "client_company_id",
                "A client or provider company is required",
            );
        }

        if let (Some(start), Some(end)) = (self.start_date, self.completion_date) {
            if end < start {
                errors.insert("completion_date", "Completion date is before the start date");
            }
        }

        errors.into_result()
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed_by_client && self.is_completed_by_provider
    }

    /// Reviews open once both sides confirmed completion.
    pub fn is_reviewable(&self) -> bool {
        self.is_completed()
    }

    /// Records completion for whichever side `company_id` is on.
    pub fn mark_completed_by(&mut self, company_id: i64) -> bool {
        let mut matched = false;

        if self.client_company_id == Some(company_id) {
            self.is_completed_by_client = true;
            matched = true;
        }

        if self.provider_company_id == Some(company_id) {
            self.is_completed_by_provider = true;
            matched = true;
        }

        matched
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    #[default]
    #[serde(alias = "Pending")]
    Pending,
    #[serde(alias = "Approved")]
    Approved,
    #[serde(alias = "Declined", alias = "rejected", alias = "Rejected")]
    Declined,
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Approved => "approved",
            RequestStatus::Declined => "declined",
        };

        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectRequestDto {
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub request_id: Option<i64>,
    #[serde(flatten)]
    pub project: ProjectDto,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: RequestStatus,
    #[serde(default)]
    pub requested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ProjectRequestDto {
    pub fn from_form_data(form: &FormData) -> Result<Self, FieldErrors> {
        Ok(Self {
            request_id: None,
            project: ProjectDto::from_form_data(form)?,
            status: RequestStatus::Pending,
            requested_at: None,
            message: field(form, "message"),
        })
    }

    pub fn is_pending(&self) -> bool {
        self.status == RequestStatus::Pending
    }

    /// Applies a decision; only pending requests can be decided.
    pub fn resolve(&mut self, decision: RequestStatus) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        if decision == RequestStatus::Pending {
            errors.insert("status", "A request can only be approved or declined");
        } else if !self.is_pending() {
            errors.insert("status", format!("Request is already {}", self.status));
        }

        errors.into_result()?;
        self.status = decision;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompanyRequestDto {
    pub name: String,
    pub description: String,
    pub industry: String,
    pub location: String,
    pub website: Option<String>,
    pub size: Option<String>,
    pub founded_year: Option<i32>,
    pub contact_email: String,
    pub contact_phone: Option<String>,
    pub specialties: Vec<String>,
    pub technologies_used: Vec<String>,
}

impl Default for CreateCompanyRequestDto {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            industry: String::new(),
            location: String::new(),
            website: None,
            size: None,
            founded_year: None,
            contact_email: String::new(),
            contact_phone: None,
            specialties: not_specified(),
            technologies_used: not_specified(),
        }
    }
}

impl CreateCompanyRequestDto {
    pub fn from_form_data(form: &FormData) -> Result<Self, FieldErrors> {
        let mut errors = FieldErrors::new();

        let request = Self {
            name: field(form, "name").unwrap_or_default(),
            description: field(form, "description").unwrap_or_default(),
            industry: field(form, "industry").unwrap_or_default(),
            location: field(form, "location").unwrap_or_default(),
            website: field(form, "website"),
            size: field(form, "size"),
            founded_year: year_field(form, "founded_year", &mut errors),
            contact_email: field(form, "contact_email").unwrap_or_default(),
            contact_phone: field(form, "contact_phone"),
            specialties: list_field(form, "specialties"),
            technologies_used: list_field(form, "technologies"),
        };

        if let Err(validation) = request.validate() {
            errors.merge(validation);
        }

        errors.into_result().map(|_| request)
    }

    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let required = [
            ("name", &self.name, "Company name is required"),
            ("description", &self.description, "Description is required"),
            ("industry", &self.industry, "Industry is required"),
            ("location", &self.location, "Location is required"),
            ("contact_email", &self.contact_email, "Contact email is required"),
        ];

        for (key, value, message) in required {
            if value.trim().is_empty() {
                errors.insert(key, message);
            }
        }

        if !self.contact_email.trim().is_empty() && !EmailAddress::is_valid(self.contact_email.trim())
        {
            errors.insert("contact_email", "Enter a valid email address");
        }

        check_founded_year(self.founded_year, &mut errors);

        errors.into_result()
    }
}

/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::company::print_list;
use crate::config::*;
use crate::input::*;
use anyhow::{Context, Result, bail};
use clap::{Subcommand, arg};
use connector::ConnectorError;
use connector::dto::*;
use connector::projects;
use connector::reviews::{self, ReviewRequest};

#[derive(Subcommand, Debug)]
pub enum Commands {
    Show {
        project: i64,
    },
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        client: Option<i64>,
        #[arg(short, long)]
        provider: Option<i64>,
    },
    Edit {
        project: i64,
    },
    Delete {
        project: i64,
    },
    /// Ask the other company to confirm a project.
    Request {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        client: Option<i64>,
        #[arg(short, long)]
        provider: Option<i64>,
    },
    /// Pending project requests of the selected company.
    Requests {
        #[arg(short = 'C', long)]
        company: Option<i64>,
    },
    Approve {
        request: i64,
        #[arg(short = 'C', long)]
        company: Option<i64>,
    },
    Decline {
        request: i64,
        #[arg(short = 'C', long)]
        company: Option<i64>,
    },
    /// Mark a project completed for the selected company.
    Complete {
        project: i64,
        #[arg(short = 'C', long)]
        company: Option<i64>,
    },
    Review {
        project: i64,
        #[arg(short, long)]
        rating: u8,
        #[arg(short = 'm', long)]
        comment: Option<String>,
        #[arg(short = 'C', long)]
        company: Option<i64>,
    },
}

fn project_fields(
    project: &ProjectDto,
    name: Option<String>,
    description: Option<String>,
    client: Option<i64>,
    provider: Option<i64>,
) -> Vec<(String, Option<String>)> {
    let date = |date: Option<chrono::NaiveDate>| date.map(|d| d.format("%Y-%m-%d").to_string());
    let technologies = project
        .technologies_used
        .iter()
        .filter(|t| t.as_str() != NOT_SPECIFIED)
        .cloned()
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        ("name", name.or_else(|| Some(project.name.clone()))),
        ("description", description.or_else(|| Some(project.description.clone()))),
        ("technologies", Some(technologies)),
        ("industry", project.industry.clone()),
        ("impact", project.impact.clone()),
        ("start_date", date(project.start_date)),
        ("completion_date", date(project.completion_date)),
        ("url", project.url.clone()),
        ("client_type", project.client_type.clone()),
        (
            "client_company_id",
            client.or(project.client_company_id).map(|id| id.to_string()),
        ),
        (
            "provider_company_id",
            provider.or(project.provider_company_id).map(|id| id.to_string()),
        ),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.filter(|v| !v.is_empty())))
    .collect()
}

fn print_project(project: &ProjectDto) {
    let company = |id: Option<i64>, nested: &Option<Box<CompanyDto>>| match (id, nested) {
        (_, Some(company)) => format!("{} ({})", company.name, company.id),
        (Some(id), None) => id.to_string(),
        (None, None) => "-".to_string(),
    };

    println!("===== Project =====");
    println!("ID: {}", project.id);
    println!("Name: {}", project.name);
    println!("Description: {}", project.description);
    println!("Industry: {}", project.industry.as_deref().unwrap_or(NOT_SPECIFIED));
    println!("Impact: {}", project.impact.as_deref().unwrap_or(NOT_SPECIFIED));
    print_list("Technologies", &project.technologies_used);
    println!(
        "Client: {}",
        company(project.client_company_id, &project.client_company)
    );
    println!(
        "Provider: {}",
        company(project.provider_company_id, &project.provider_company)
    );

    if let Some(start) = project.start_date {
        println!("Started: {}", start);
    }

    if let Some(end) = project.completion_date {
        println!("Completed: {}", end);
    }

    println!(
        "Confirmed by client: {}, by provider: {}",
        if project.is_completed_by_client { "yes" } else { "no" },
        if project.is_completed_by_provider { "yes" } else { "no" }
    );
}

async fn find_request(
    request_config: &connector::RequestConfig,
    company: i64,
    request: i64,
) -> Result<ProjectRequestDto> {
    projects::get_project_requests(request_config, company)
        .await?
        .into_iter()
        .find(|pending| pending.request_id == Some(request))
        .with_context(|| format!("Project request {} not found for company {}", request, company))
}

pub async fn handle(cmd: Commands) -> Result<()> {
    let config = load_config()?;
    let request_config = get_request_config(&config)?;

    match cmd {
        Commands::Show { project } => {
            let project = projects::get_project(&request_config, project).await?;
            print_project(&project);
        }

        Commands::Create {
            name,
            description,
            client,
            provider,
        } => {
            let client = client.or_else(|| get_company(&config, None).ok());
            let fields = project_fields(&ProjectDto::default(), name, description, client, provider);

            let project = ProjectDto::from_form_data(&handle_input(fields, false)?)
                .map_err(ConnectorError::from)?;

            let project = projects::create_project(&request_config, &project).await?;
            println!("Project {} created.", project.id);
        }

        Commands::Edit { project } => {
            let current = projects::get_project(&request_config, project).await?;
            let fields = project_fields(&current, None, None, None, None);

            let updated = ProjectDto::from_form_data(&handle_input(fields, false)?)
                .map_err(ConnectorError::from)?;

            let updated = ProjectDto {
                id: current.id,
                is_completed_by_client: current.is_completed_by_client,
                is_completed_by_provider: current.is_completed_by_provider,
                ..updated
            };

            projects::update_project(&request_config, &updated).await?;
            println!("Project {} updated.", project);
        }

        Commands::Delete { project } => {
            projects::delete_project(&request_config, project).await?;
            println!("Project {} deleted.", project);
        }

        Commands::Request {
            name,
            description,
            client,
            provider,
        } => {
            let provider = provider.or_else(|| get_company(&config, None).ok());
            let mut fields = project_fields(&ProjectDto::default(), name, description, client, provider);
            fields.push(("message".to_string(), None));

            let request = ProjectRequestDto::from_form_data(&handle_input(fields, false)?)
                .map_err(ConnectorError::from)?;

            let request = projects::request_project(&request_config, &request).await?;
            match request.request_id {
                Some(id) => println!("Project request {} sent.", id),
                None => println!("Project request sent."),
            }
        }

        Commands::Requests { company } => {
            let company = get_company(&config, company)?;
            let requests = projects::get_project_requests(&request_config, company).await?;

            if requests.is_empty() {
                println!("No project requests.");
                return Ok(());
            }

            for request in requests {
                println!(
                    "{:>6}  {} [{}]{}",
                    request
                        .request_id
                        .map(|id| id.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    request.project.name,
                    request.status,
                    request
                        .requested_at
                        .map(|at| format!(" {}", at.format("%Y-%m-%d")))
                        .unwrap_or_default()
                );

                if let Some(message) = request.message {
                    println!("        {}", message);
                }
            }
        }

        Commands::Approve { request, company } => {
            let company = get_company(&config, company)?;
            let mut pending = find_request(&request_config, company, request).await?;

            projects::approve_request(&request_config, &mut pending).await?;
            println!("Project request {} {}.", request, pending.status);
        }

        Commands::Decline { request, company } => {
            let company = get_company(&config, company)?;
            let mut pending = find_request(&request_config, company, request).await?;

            projects::decline_request(&request_config, &mut pending).await?;
            println!("Project request {} {}.", request, pending.status);
        }

        Commands::Complete { project, company } => {
            let company = get_company(&config, company)?;
            let current = projects::get_project(&request_config, project).await?;

            if current.client_company_id != Some(company) && current.provider_company_id != Some(company) {
                bail!("Company {} is not part of project {}.", company, project);
            }

            let updated = projects::mark_completed(&request_config, project, company).await?;

            if updated.is_reviewable() {
                println!("Project {} completed by both companies. It can now be reviewed.", project);
            } else {
                println!("Project {} marked completed. Waiting for the other company.", project);
            }
        }

        Commands::Review {
            project,
            rating,
            comment,
            company,
        } => {
            let company = get_company(&config, company)?;
            let current = projects::get_project(&request_config, project).await?;

            let reviewed = if current.client_company_id == Some(company) {
                current.provider_company_id
            } else {
                current.client_company_id
            }
            .with_context(|| format!("Project {} has no company to review", project))?;

            let comment = match comment {
                Some(comment) => comment,
                None => ask_for_input("Comment")?,
            };

            let req = ReviewRequest {
                project_id: project,
                company_id: reviewed,
                rating,
                comment,
            };

            let review = reviews::post_review(&request_config, &current, &req).await?;
            println!("Review {} posted.", review.id);
        }
    }

    Ok(())
}

/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::print_company_summary;
use crate::config::*;
use crate::input::*;
use anyhow::Result;
use clap::{Subcommand, arg};
use connector::ConnectorError;
use connector::companies;
use connector::dto::*;
use connector::reviews;
use tracing::warn;

#[derive(Subcommand, Debug)]
pub enum Commands {
    Select {
        company: i64,
    },
    List,
    Show {
        company: Option<i64>,
    },
    Create {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        description: Option<String>,
        #[arg(short, long)]
        industry: Option<String>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        /// Only ask the server whether the company would be accepted.
        #[arg(long)]
        dry_run: bool,
    },
    Edit {
        company: Option<i64>,
    },
    Delete {
        company: Option<i64>,
    },
    Projects {
        company: Option<i64>,
    },
    Reviews {
        company: Option<i64>,
    },
    Services,
}

pub(crate) fn print_list(label: &str, items: &[String]) {
    println!("{}: {}", label, items.join(", "));
}

fn print_company(company: &CompanyDto) {
    println!("===== Company =====");
    println!("ID: {}", company.id);
    println!("Name: {}", company.name);
    println!("Verified: {}", if company.verified { "yes" } else { "no" });
    println!("Description: {}", company.description);
    println!("Location: {}", company.location);
    println!("Size: {}", company.size);
    println!(
        "Founded: {}",
        company
            .founded_year
            .map(|year| year.to_string())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    );
    println!("Website: {}", company.website.as_deref().unwrap_or(NOT_SPECIFIED));
    println!("Email: {}", company.contact_email.as_deref().unwrap_or(NOT_SPECIFIED));
    println!("Phone: {}", company.contact_phone.as_deref().unwrap_or(NOT_SPECIFIED));
    print_list("Industries", &company.industries);
    print_list("Specialties", &company.specialties);
    print_list("Expertise", &company.expertise);
    print_list("Technologies", &company.technologies_used);
    print_list("Partnerships", &company.partnerships);
}

pub async fn handle(cmd: Commands) -> Result<()> {
    let config = load_config()?;
    let request_config = get_request_config(&config)?;

    match cmd {
        Commands::Select { company } => {
            let session = get_session(&config)?;

            if !session.belongs_to(company) {
                warn!(company, "selected company is not listed in the session token");
            }

            set_value(ConfigKey::SelectedCompany, Some(company.to_string()))?;
            println!("Company {} selected.", company);
        }

        Commands::List => {
            let session = get_session(&config)?;
            let companies = companies::get_user_companies(&request_config, session.user().id).await?;

            if companies.is_empty() {
                println!("No companies.");
                return Ok(());
            }

            let selected = lookup(&config, &ConfigKey::SelectedCompany);
            for company in companies {
                let marker = if selected.as_deref() == Some(company.id.to_string().as_str()) {
                    "*"
                } else {
                    " "
                };

                print!("{}", marker);
                print_company_summary(&company);
            }
        }

        Commands::Show { company } => {
            let company = get_company(&config, company)?;
            let company = companies::get_company(&request_config, company).await?;
            print_company(&company);

            let reviews = reviews::get_company_reviews(&request_config, company.id).await?;
            println!();
            match reviews::average_rating(&reviews) {
                Some(average) => println!("Rating: {} ({} reviews)", average, reviews.len()),
                None => println!("No reviews."),
            }
        }

        Commands::Create {
            name,
            description,
            industry,
            location,
            email,
            dry_run,
        } => {
            let input_fields = vec![
                ("name", name),
                ("description", description),
                ("industry", industry),
                ("location", location),
                ("contact_email", email),
                ("website", None),
                ("size", None),
                ("founded_year", None),
                ("contact_phone", None),
                ("specialties", None),
                ("technologies", None),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

            let input = handle_input(input_fields, false)?;
            let req = CreateCompanyRequestDto::from_form_data(&input).map_err(ConnectorError::from)?;

            if dry_run {
                let errors = companies::validate(&request_config, &req).await?;

                if errors.is_empty() {
                    println!("Company is valid.");
                    return Ok(());
                }

                return Err(ConnectorError::from(errors).into());
            }

            let company = companies::create_company(&request_config, &req).await?;
            set_value(ConfigKey::SelectedCompany, Some(company.id.to_string()))?;
            println!("Company {} created and selected.", company.id);
        }

        Commands::Edit { company } => {
            let company = get_company(&config, company)?;
            let current = companies::get_company(&request_config, company).await?;

            let input = handle_input(CompanyProfileDto::from_company(&current).to_form_data(), false)?;
            let profile = CompanyProfileDto::from_form_data(&input).map_err(ConnectorError::from)?;

            let company = companies::update_company(&request_config, company, &profile).await?;
            println!("Company {} updated.", company.id);
        }

        Commands::Delete { company } => {
            let company = get_company(&config, company)?;
            companies::delete_company(&request_config, company).await?;

            if lookup(&config, &ConfigKey::SelectedCompany) == Some(company.to_string()) {
                set_value(ConfigKey::SelectedCompany, None)?;
            }

            println!("Company {} deleted.", company);
        }

        Commands::Projects { company } => {
            let company = get_company(&config, company)?;
            let projects = companies::get_company_projects(&request_config, company).await?;

            if projects.is_empty() {
                println!("No projects.");
                return Ok(());
            }

            for project in projects {
                let status = if project.is_completed() {
                    "completed"
                } else if project.is_completed_by_client || project.is_completed_by_provider {
                    "awaiting confirmation"
                } else {
                    "in progress"
                };

                println!("{:>6}  {} [{}]", project.id, project.name, status);
            }
        }

        Commands::Reviews { company } => {
            let company = get_company(&config, company)?;
            let reviews = reviews::get_company_reviews(&request_config, company).await?;

            if reviews.is_empty() {
                println!("No reviews.");
                return Ok(());
            }

            for review in &reviews {
                println!(
                    "{}/5  {}  ({})",
                    review.rating,
                    review.project_name.as_deref().unwrap_or("-"),
                    review.reviewer_name.as_deref().unwrap_or("anonymous")
                );
                println!("      {}", review.comment);
            }

            if let Some(average) = reviews::average_rating(&reviews) {
                println!("Average: {}", average);
            }
        }

        Commands::Services => {
            for industry in companies::get_services(&request_config).await? {
                let services = industry
                    .services
                    .iter()
                    .map(|service| format!("{} ({})", service.name, service.id))
                    .collect::<Vec<_>>();

                println!("{}: {}", industry.industry, services.join(", "));
            }
        }
    }

    Ok(())
}

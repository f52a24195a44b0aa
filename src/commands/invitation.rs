/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use crate::config::*;
use crate::input::*;
use anyhow::{Context, Result};
use clap::{Subcommand, arg};
use connector::RequestConfig;
use connector::invitations::{self, Invitation};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Invitations addressed to you.
    List,
    /// Invitations sent by the selected company.
    Sent {
        #[arg(short, long)]
        company: Option<i64>,
    },
    Send {
        email: String,
        #[arg(short, long)]
        company: Option<i64>,
    },
    Accept {
        invitation: i64,
    },
    Reject {
        invitation: i64,
    },
}

fn print_invitation(invitation: &Invitation) {
    let company = match (&invitation.company_name, invitation.company_id) {
        (Some(name), _) => name.clone(),
        (None, Some(id)) => format!("company {}", id),
        (None, None) => "-".to_string(),
    };

    let sent = invitation
        .sent_at
        .map(|at| at.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());

    println!(
        "{:>6}  {}  {}  [{}]  {}",
        invitation.id, invitation.email, company, invitation.status, sent
    );
}

async fn find_invitation(request_config: &RequestConfig, invitation: i64) -> Result<Invitation> {
    invitations::get_invitations(request_config)
        .await?
        .into_iter()
        .find(|candidate| candidate.id == invitation)
        .with_context(|| format!("Invitation {} not found", invitation))
}

pub async fn handle(cmd: Commands) -> Result<()> {
    let config = load_config()?;
    let request_config = get_request_config(&config)?;

    match cmd {
        Commands::List => {
            let invitations = invitations::get_invitations(&request_config).await?;

            if invitations.is_empty() {
                println!("No invitations.");
            }

            invitations.iter().for_each(print_invitation);
        }

        Commands::Sent { company } => {
            let company = get_company(&config, company)?;
            let invitations = invitations::get_company_invitations(&request_config, company).await?;

            if invitations.is_empty() {
                println!("No invitations.");
            }

            invitations.iter().for_each(print_invitation);
        }

        Commands::Send { email, company } => {
            let company = get_company(&config, company)?;
            let invitation = invitations::send_invitation(&request_config, email, company).await?;
            println!("Invitation {} sent to {}.", invitation.id, invitation.email);
        }

        Commands::Accept { invitation } => {
            let mut pending = find_invitation(&request_config, invitation).await?;
            invitations::accept(&request_config, &mut pending).await?;
            println!("Invitation {} {}.", invitation, pending.status);

            if let Some(company) = pending.company_id {
                println!("Log in again to act for company {}.", company);
            }
        }

        Commands::Reject { invitation } => {
            let mut pending = find_invitation(&request_config, invitation).await?;
            invitations::reject(&request_config, &mut pending).await?;
            println!("Invitation {} {}.", invitation, pending.status);
        }
    }

    Ok(())
}

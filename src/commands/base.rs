/*
 * SPDX-FileCopyrightText: 2026 Compedia <info@compedia.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use super::*;
use crate::config::*;
use crate::input::*;
use anyhow::{Result, bail};
use clap::{CommandFactory, Parser, Subcommand, arg};
use clap_complete::{Shell, generate};
use connector::auth::{self, RegisterRequest, VERIFICATION_POLL_INTERVAL};
use connector::users::{self, UpdateUserRequest};
use connector::health;
use std::io;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "Compedia", display_name = "Compedia", bin_name = "compedia", author = "Compedia", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Option<MainCommands>,
    #[arg(long, value_enum)]
    pub generate_completions: Option<Shell>,
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum MainCommands {
    Config {
        key: String,
        value: Option<String>,
    },
    Status,
    Register {
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        email: Option<String>,
        #[arg(short, long)]
        phone: Option<String>,
    },
    Login {
        #[arg(short, long)]
        email: Option<String>,
    },
    Logout,
    Info,
    /// Edit the logged in user's profile.
    Profile,
    /// Wait until an email address has been verified.
    Verify {
        email: Option<String>,
        #[arg(short, long)]
        resend: bool,
    },
    Company {
        #[command(subcommand)]
        cmd: company::Commands,
    },
    Project {
        #[command(subcommand)]
        cmd: project::Commands,
    },
    Invitation {
        #[command(subcommand)]
        cmd: invitation::Commands,
    },
    Search {
        query: Option<String>,
        #[arg(short = 'S', long = "service")]
        services: Vec<i64>,
        #[arg(short, long)]
        location: Option<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
        #[arg(short, long, default_value_t = connector::search::DEFAULT_PAGE_SIZE)]
        size: u32,
    },
    /// Top companies per industry.
    Discover {
        #[arg(short, long)]
        refresh: bool,
    },
    Analytics {
        #[arg(short, long)]
        company: Option<i64>,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env("COMPEDIA_LOG").unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Waits for Ctrl-C and cancels `cancel`.
pub(crate) fn cancel_on_ctrl_c(cancel: &CancellationToken) {
    let cancel = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });
}

pub async fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.generate_completions {
        let mut app = Cli::command();
        let bin_name = app.get_name().to_string();
        generate(shell, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    init_logging(cli.verbose);

    let Some(cmd) = cli.cmd else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match cmd {
        MainCommands::Config { key, value } => {
            set_get_value_from_string(&key, value, false)?;
        }

        MainCommands::Status => {
            let config = load_config()?;
            let request_config = get_request_config(&config)?;

            health(&request_config).await?;
            println!("Server Online.");

            match get_session(&config) {
                Ok(session) => println!("Logged in as {}.", session.user().email),
                Err(e) => println!("{}", e),
            }

            if request_config.search_url.is_none() {
                println!("Search server not set. Use `compedia config searchserver <url>` to set it.");
            }
        }

        MainCommands::Register {
            name,
            username,
            email,
            phone,
        } => {
            let request_config = get_request_config(&load_config()?)?;

            let input_fields = vec![
                ("name", name),
                ("username", username),
                ("email", email),
                ("phone", phone),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();

            let mut input = handle_input(input_fields, true)?;
            let mut field = |key: &str| input.remove(key).unwrap_or_default();

            let req = RegisterRequest {
                name: field("name"),
                username: field("username"),
                email: field("email"),
                phone: Some(field("phone")).filter(|phone| !phone.is_empty()),
                password: ask_for_password()?,
            };

            if req.email.is_empty() {
                bail!("email cannot be empty.");
            }

            auth::register(&request_config, &req).await?;
            println!(
                "Registration successful. Verify your email, then run `compedia verify {}`.",
                req.email
            );
        }

        MainCommands::Login { email } => {
            if get_value(ConfigKey::Server)?.is_none() {
                set_value(ConfigKey::Server, Some(ask_for_input("Server URL")?))?;
            }

            let email = match email {
                Some(email) => email,
                None => ask_for_input("Email")?,
            };

            let password = ask_for_password()?;

            let session = auth::login(&get_request_config(&load_config()?)?, email, password).await?;
            set_value(ConfigKey::AuthToken, Some(session.token().to_string()))?;

            if let [company] = session.user().companies.as_slice() {
                set_value(ConfigKey::SelectedCompany, Some(company.id.to_string()))?;
            }

            println!("Logged in as {}.", session.user().email);
        }

        MainCommands::Logout => {
            set_value(ConfigKey::AuthToken, None)?;
            set_value(ConfigKey::SelectedCompany, None)?;
            println!("Logged out.");
        }

        MainCommands::Info => {
            let config = load_config()?;
            let session = get_session(&config)?;
            let user = users::get_user(&get_request_config(&config)?, session.user().id).await?;

            println!("User ID: {}", user.id);
            println!("Username: {}", user.username);
            println!("Name: {}", user.name);
            println!("Email: {}", user.email);
            println!("Phone: {}", user.phone.as_deref().unwrap_or("-"));
            println!("Bio: {}", user.bio.as_deref().unwrap_or("-"));

            if let Some(expires_at) = session.expires_at() {
                println!("Session expires: {}", expires_at.format("%Y-%m-%d %H:%M UTC"));
            }

            if !session.user().companies.is_empty() {
                println!("Companies:");
                for company in &session.user().companies {
                    println!("{:>6}  {}", company.id, company.name);
                }
            }
        }

        MainCommands::Profile => {
            let config = load_config()?;
            let session = get_session(&config)?;
            let request_config = get_request_config(&config)?;
            let user = users::get_user(&request_config, session.user().id).await?;

            let input_fields = vec![
                ("name", Some(user.name)),
                ("username", Some(user.username)),
                ("email", Some(user.email)),
                ("phone", user.phone),
                ("bio", user.bio),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.filter(|v| !v.is_empty())))
            .collect();

            let mut input = handle_input(input_fields, false)?;

            let req = UpdateUserRequest {
                name: input.remove("name"),
                username: input.remove("username"),
                email: input.remove("email"),
                phone: input.remove("phone"),
                bio: input.remove("bio"),
            };

            let user = users::update_user(&request_config, session.user().id, &req).await?;
            println!("Profile of {} updated.", user.username);
        }

        MainCommands::Verify { email, resend } => {
            let config = load_config()?;
            let request_config = get_request_config(&config)?;

            let email = match email {
                Some(email) => email,
                None => ask_for_input("Email")?,
            };

            if resend {
                auth::resend_verification(&request_config, email.clone()).await?;
                println!("Verification email sent to {}.", email);
            }

            println!("Waiting for {} to be verified. Press Ctrl-C to stop.", email);

            let cancel = CancellationToken::new();
            cancel_on_ctrl_c(&cancel);

            if auth::wait_for_verification(&request_config, &email, VERIFICATION_POLL_INTERVAL, &cancel).await? {
                println!("Email verified. Use `compedia login` to log in.");
            } else {
                println!("Stopped waiting.");
            }
        }

        MainCommands::Company { cmd } => company::handle(cmd).await?,
        MainCommands::Project { cmd } => project::handle(cmd).await?,
        MainCommands::Invitation { cmd } => invitation::handle(cmd).await?,
        MainCommands::Search {
            query,
            services,
            location,
            page,
            size,
        } => search::handle_search(query, services, location, page, size).await?,
        MainCommands::Discover { refresh } => discover::handle_discover(refresh).await?,
        MainCommands::Analytics { company } => analytics::handle_analytics(company).await?,
    }

    Ok(())
}

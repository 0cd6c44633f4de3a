// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! SkillShare command-line client
//!
//! Logs in against the SkillShare backend and works with learning plans
//! and notifications from the terminal.

use anyhow::Context;
use clap::{Parser, Subcommand};
use skillshare_client::{
    config::ClientConfig,
    gateway::LogNavigator,
    models::LearningPlan,
    services::{Fetched, OAuthProvider},
    session::SessionState,
    storage::FileStore,
    SkillShareClient,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "skillshare")]
#[command(version, about = "SkillShare learning plan client", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        password: String,
    },
    /// Print the authorization URL for an OAuth provider (google, github)
    Oauth { provider: OAuthProvider },
    /// Complete an OAuth login with the token from the callback
    Callback {
        token: String,
        #[arg(long)]
        user_id: Option<String>,
    },
    /// End the session and forget stored credentials
    Logout,
    /// Show the current session
    Whoami,
    /// Learning plans
    Plans {
        #[command(subcommand)]
        command: PlanCommand,
    },
    /// List notifications for the current user
    Notifications {
        /// Mark all of them read afterwards
        #[arg(long)]
        mark_read: bool,
    },
}

#[derive(Subcommand)]
enum PlanCommand {
    /// List all plans, or one user's plans
    List {
        #[arg(long)]
        user: Option<String>,
    },
    /// Show one plan with its topics
    Show { id: String },
    /// Mark a topic completed
    Complete {
        plan: String,
        topic: String,
        /// Mark the topic as not completed instead
        #[arg(long)]
        undo: bool,
    },
    Follow { id: String },
    Unfollow { id: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json)?;

    let config = ClientConfig::from_env().context("Failed to load configuration")?;
    let store_path = config
        .store_path
        .clone()
        .unwrap_or_else(FileStore::default_path);
    let store = Arc::new(FileStore::open(&store_path).context("Failed to open credential store")?);
    tracing::debug!(path = %store_path.display(), "Using credential store");

    let client = SkillShareClient::new(config, store, Arc::new(LogNavigator))?;

    match cli.command {
        Command::Login { email, password } => {
            let outcome = client
                .session
                .login_with_credentials(&email, &password)
                .await;
            report_login(&client, outcome.success, outcome.error)?;
        }
        Command::Register {
            name,
            email,
            password,
        } => {
            let outcome = client.session.register(&name, &email, &password).await;
            report_login(&client, outcome.success, outcome.error)?;
        }
        Command::Oauth { provider } => {
            println!("{}", client.session.login(provider));
        }
        Command::Callback { token, user_id } => {
            client
                .session
                .handle_auth_callback(&token, user_id.as_deref())
                .await;
            print_session(&client);
        }
        Command::Logout => {
            client.session.logout().await;
            println!("Logged out");
        }
        Command::Whoami => {
            client.session.check_auth().await;
            print_session(&client);
        }
        Command::Plans { command } => run_plans(&client, command).await?,
        Command::Notifications { mark_read } => {
            let user_id = current_user_id(&client).await?;
            let notifications = client.notifications.get_for_user(&user_id).await?;
            warn_if_degraded(&notifications);
            for n in notifications.data() {
                let marker = if n.read { " " } else { "*" };
                println!("{} [{}] {}", marker, n.created_at, n.message);
            }
            if mark_read {
                client.notifications.mark_all_as_read(&user_id).await?;
            }
        }
    }

    Ok(())
}

async fn run_plans(client: &SkillShareClient, command: PlanCommand) -> anyhow::Result<()> {
    match command {
        PlanCommand::List { user } => {
            let plans = match user {
                Some(user_id) => client.plans.get_for_user(&user_id).await?,
                None => client.plans.get_all().await?,
            };
            warn_if_degraded(&plans);
            for plan in plans.data() {
                println!(
                    "{:>8}  {:<45} {:>3.0}%  {} followers",
                    plan.id, plan.title, plan.completion_percentage, plan.followers
                );
            }
        }
        PlanCommand::Show { id } => {
            let plan = client.plans.get_by_id(&id).await?;
            warn_if_degraded(&plan);
            print_plan(plan.data());
        }
        PlanCommand::Complete { plan, topic, undo } => {
            let updated = client
                .plans
                .mark_topic_as_completed(&plan, &topic, !undo)
                .await?;
            warn_if_degraded(&updated);
            print_plan(updated.data());
        }
        PlanCommand::Follow { id } => {
            let user_id = current_user_id(client).await?;
            let plan = client.plans.follow(&id, &user_id).await?;
            warn_if_degraded(&plan);
            println!("Following {} ({} followers)", plan.data().title, plan.data().followers);
        }
        PlanCommand::Unfollow { id } => {
            let user_id = current_user_id(client).await?;
            let plan = client.plans.unfollow(&id, &user_id).await?;
            warn_if_degraded(&plan);
            println!("Unfollowed {}", plan.data().title);
        }
    }
    Ok(())
}

fn report_login(
    client: &SkillShareClient,
    success: bool,
    error: Option<String>,
) -> anyhow::Result<()> {
    if !success {
        anyhow::bail!(error.unwrap_or_else(|| "Login failed".to_string()));
    }
    print_session(client);
    Ok(())
}

/// Resolve the session and return its user id.
async fn current_user_id(client: &SkillShareClient) -> anyhow::Result<String> {
    client.session.check_auth().await;
    match client.session.snapshot().state {
        SessionState::Authenticated(user) => Ok(user.id),
        SessionState::Resolving { user_id: Some(id) } => Ok(id),
        _ => anyhow::bail!("Not logged in. Run `skillshare login` first."),
    }
}

fn print_session(client: &SkillShareClient) {
    match client.session.snapshot().state {
        SessionState::Authenticated(user) => {
            println!("Logged in as {} <{}> (id {})", user.name, user.email, user.id)
        }
        SessionState::Resolving { user_id } => println!(
            "Token stored, profile not loaded yet (user id {})",
            user_id.as_deref().unwrap_or("unknown")
        ),
        SessionState::Invalid => println!("Stored session was rejected; please log in again"),
        SessionState::Unauthenticated => println!("Not logged in"),
    }
}

fn print_plan(plan: &LearningPlan) {
    println!("{} ({})", plan.title, plan.subject);
    if !plan.description.is_empty() {
        println!("  {}", plan.description);
    }
    println!(
        "  {:.0}% complete, ~{} days, {} followers",
        plan.completion_percentage, plan.estimated_days, plan.followers
    );
    for topic in &plan.topics {
        let mark = if topic.completed { "x" } else { " " };
        println!("  [{}] {} ({})", mark, topic.title, topic.id);
    }
    for resource in &plan.resources {
        println!("  - {:?}: {} <{}>", resource.kind, resource.title, resource.url);
    }
}

fn warn_if_degraded<T>(result: &Fetched<T>) {
    if let Some(reason) = result.reason() {
        eprintln!("warning: backend unavailable, showing offline data ({})", reason);
    }
}

/// Initialize logging: human-readable by default, JSON on request.
fn init_logging(json: bool) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("skillshare_client=info".parse()?)
        .add_directive("warn".parse()?);

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
    Ok(())
}

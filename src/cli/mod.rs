pub mod commands;
pub mod config;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::navigation::{Navigator, Route};

#[derive(Parser)]
#[command(name = "coach")]
#[command(about = "Coach CLI - admin and client console for the coaching platform API")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[arg(long, global = true, help = "API base URL (overrides COACH_API_URL)")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Login, logout, registration and session status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Manage user accounts (admin)")]
    Users {
        #[command(subcommand)]
        cmd: commands::users::UserCommands,
    },

    #[command(about = "Inspect and cancel subscriptions (admin)")]
    Subscriptions {
        #[command(subcommand)]
        cmd: commands::subscriptions::SubscriptionCommands,
    },

    #[command(about = "Feature flags (admin)")]
    Flags {
        #[command(subcommand)]
        cmd: commands::flags::FlagCommands,
    },

    #[command(about = "Read and leave coaching feedback")]
    Feedback {
        #[command(subcommand)]
        cmd: commands::feedback::FeedbackCommands,
    },

    #[command(about = "Admin dashboard summary")]
    Dashboard,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

/// Navigation in a terminal means telling the user which command to run next
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNavigator;

impl TerminalNavigator {
    pub fn hint(route: Route) -> &'static str {
        match route {
            Route::Login => "coach auth login <email>",
            Route::Register => "coach auth register <name> <email>",
            Route::Dashboard => "coach dashboard",
            Route::Users => "coach users list",
            Route::Subscriptions => "coach subscriptions list",
            Route::Flags => "coach flags list",
            Route::Feedback => "coach feedback list",
        }
    }
}

impl Navigator for TerminalNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!("Navigating to {}", route);
        eprintln!("→ {}", Self::hint(route));
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let api_url = cli.api_url.clone();

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, api_url, output_format).await,
        Commands::Users { cmd } => commands::users::handle(cmd, api_url, output_format).await,
        Commands::Subscriptions { cmd } => commands::subscriptions::handle(cmd, api_url, output_format).await,
        Commands::Flags { cmd } => commands::flags::handle(cmd, api_url, output_format).await,
        Commands::Feedback { cmd } => commands::feedback::handle(cmd, api_url, output_format).await,
        Commands::Dashboard => commands::dashboard::handle(api_url, output_format).await,
    }
}

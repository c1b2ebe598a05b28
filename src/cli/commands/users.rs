use clap::Subcommand;

use super::{finish_mutation, list_page, open_view, single, ListArgs};
use crate::auth::Role;
use crate::cli::config::build_context;
use crate::cli::OutputFormat;
use crate::models::User;
use crate::pages::users;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users")]
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Activate or deactivate a user")]
    Toggle {
        #[arg(help = "User ID")]
        id: String,
    },

    #[command(about = "Change a user's role")]
    Role {
        #[arg(help = "User ID")]
        id: String,
        #[arg(help = "New role (user or admin)")]
        role: Role,
    },
}

pub async fn handle(cmd: UserCommands, api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let page = &users::PAGE;

    match cmd {
        UserCommands::List { args } => list_page::<User>(&ctx, page, args, output_format).await,
        UserCommands::Toggle { id } => {
            let view = open_view::<User>(&ctx, page, single(&id)).await?;
            let result = users::toggle_active(&view, &id).await;
            finish_mutation(&ctx, page, output_format, result)
        }
        UserCommands::Role { id, role } => {
            let view = open_view::<User>(&ctx, page, single(&id)).await?;
            let result = users::set_role(&view, &id, role).await;
            finish_mutation(&ctx, page, output_format, result)
        }
    }
}

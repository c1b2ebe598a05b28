use clap::Subcommand;
use serde_json::json;

use super::{finish_mutation, list_page, open_view, single, ListArgs};
use crate::cli::config::build_context;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::ListQuery;
use crate::models::Subscription;
use crate::pages::subscriptions;

#[derive(Subcommand)]
pub enum SubscriptionCommands {
    #[command(about = "List subscriptions")]
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Cancel a subscription")]
    Cancel {
        #[arg(help = "Subscription ID")]
        id: String,
    },

    #[command(about = "Monthly recurring revenue, total and per plan")]
    Revenue,
}

pub async fn handle(
    cmd: SubscriptionCommands,
    api_url: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let page = &subscriptions::PAGE;

    match cmd {
        SubscriptionCommands::List { args } => list_page::<Subscription>(&ctx, page, args, output_format).await,
        SubscriptionCommands::Cancel { id } => {
            let view = open_view::<Subscription>(&ctx, page, single(&id)).await?;
            let result = subscriptions::cancel(&view, &id).await;
            finish_mutation(&ctx, page, output_format, result)
        }
        SubscriptionCommands::Revenue => {
            let view = open_view::<Subscription>(&ctx, page, ListQuery::default()).await?;
            let rows = view.snapshot().await.data;
            let total = subscriptions::monthly_revenue(&rows);
            let by_plan = subscriptions::revenue_by_plan(&rows);

            if let OutputFormat::Text = output_format {
                for (plan, amount) in &by_plan {
                    println!("{:<16} {}", plan, amount);
                }
            }
            output_success(
                &output_format,
                &format!("Monthly revenue: {}", total),
                Some(json!({ "total": total, "by_plan": by_plan })),
            )
        }
    }
}

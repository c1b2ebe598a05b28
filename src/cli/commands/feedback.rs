use clap::Subcommand;
use serde_json::json;
use uuid::Uuid;

use super::{finish_mutation, list_page, open_view, ListArgs};
use crate::cli::config::build_context;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::ListQuery;
use crate::models::Feedback;
use crate::pages::feedback;

#[derive(Subcommand)]
pub enum FeedbackCommands {
    #[command(about = "List feedback")]
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Rate a coaching session")]
    Submit {
        #[arg(long, help = "Coach ID")]
        coach: Uuid,
        #[arg(long, help = "Client ID")]
        client: Uuid,
        #[arg(long, help = "Rating from 1 to 5")]
        rating: u8,
        #[arg(long, help = "Optional comment")]
        comment: Option<String>,
    },

    #[command(about = "Average rating per coach")]
    Averages,
}

pub async fn handle(cmd: FeedbackCommands, api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let page = &feedback::PAGE;

    match cmd {
        FeedbackCommands::List { args } => list_page::<Feedback>(&ctx, page, args, output_format).await,
        FeedbackCommands::Submit { coach, client, rating, comment } => {
            let view = open_view::<Feedback>(&ctx, page, ListQuery::page(1, 0)).await?;
            let result = feedback::submit(&view, coach, client, rating, comment.as_deref()).await;
            finish_mutation(&ctx, page, output_format, result)
        }
        FeedbackCommands::Averages => {
            let view = open_view::<Feedback>(&ctx, page, ListQuery::default()).await?;
            let rows = view.snapshot().await.data;
            let averages = feedback::average_by_coach(&rows);

            if let OutputFormat::Text = output_format {
                for (coach, average) in &averages {
                    println!("{}  {:.2}", coach, average);
                }
            }
            let data: serde_json::Map<String, serde_json::Value> =
                averages.iter().map(|(coach, average)| (coach.to_string(), json!(average))).collect();
            output_success(
                &output_format,
                &format!("{} coaches rated", averages.len()),
                Some(json!({ "averages": data })),
            )
        }
    }
}

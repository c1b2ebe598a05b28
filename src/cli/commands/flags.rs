use clap::Subcommand;
use serde_json::json;

use super::{finish_mutation, list_page, open_view, single, ListArgs};
use crate::cli::config::build_context;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::client::ListQuery;
use crate::models::FeatureFlag;
use crate::pages::flags;

#[derive(Subcommand)]
pub enum FlagCommands {
    #[command(about = "List feature flags")]
    List {
        #[command(flatten)]
        args: ListArgs,
    },

    #[command(about = "Turn a flag on or off")]
    Toggle {
        #[arg(help = "Flag ID")]
        id: String,
    },

    #[command(about = "Replace a flag's JSON config")]
    Config {
        #[arg(help = "Flag ID")]
        id: String,
        #[arg(help = "JSON object, e.g. '{\"rollout\": 25}'")]
        config: String,
    },

    #[command(about = "Effective state of every flag, including deploy-time defaults")]
    Effective,
}

pub async fn handle(cmd: FlagCommands, api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let page = &flags::PAGE;

    match cmd {
        FlagCommands::List { args } => list_page::<FeatureFlag>(&ctx, page, args, output_format).await,
        FlagCommands::Toggle { id } => {
            let view = open_view::<FeatureFlag>(&ctx, page, single(&id)).await?;
            let result = flags::toggle(&view, &id).await;
            finish_mutation(&ctx, page, output_format, result)
        }
        FlagCommands::Config { id, config } => {
            let view = open_view::<FeatureFlag>(&ctx, page, single(&id)).await?;
            let result = flags::save_config(&view, ctx.sink.as_ref(), &id, &config).await;
            finish_mutation(&ctx, page, output_format, result)
        }
        FlagCommands::Effective => {
            let view = open_view::<FeatureFlag>(&ctx, page, ListQuery::default()).await?;
            let rows = view.snapshot().await.data;
            let states = flags::effective_states(&rows, &ctx.flag_defaults);

            if let OutputFormat::Text = output_format {
                for (key, on) in &states {
                    println!("{:<24} {}", key, if *on { "on" } else { "off" });
                }
            }
            let data: serde_json::Map<String, serde_json::Value> =
                states.iter().map(|(key, on)| (key.clone(), json!(on))).collect();
            output_success(&output_format, &format!("{} flags", states.len()), Some(json!({ "flags": data })))
        }
    }
}

use serde_json::json;

use crate::cli::config::build_context;
use crate::cli::utils::{output_success, print_notifications};
use crate::cli::OutputFormat;
use crate::pages::dashboard;
use crate::view::Rendered;

pub async fn handle(api_url: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let ctx = build_context(api_url)?;
    let view = dashboard::view(&ctx);
    view.mount().await;
    print_notifications(&ctx.notices.drain());

    let summary = match view.render().await {
        Rendered::Table(mut rows) if !rows.is_empty() => rows.remove(0),
        Rendered::Error(message) => anyhow::bail!(message),
        _ => anyhow::bail!("The dashboard is not available for this session"),
    };

    if let OutputFormat::Text = output_format {
        println!("Users:                  {} ({} active)", summary.users, summary.active_users);
        println!("Billable subscriptions: {}", summary.billable_subscriptions);
        println!("Monthly revenue:        {}", summary.monthly_revenue);
        println!("Flags enabled:          {}", summary.flags_enabled);
        match summary.average_rating {
            Some(avg) => println!("Average rating:         {:.2}", avg),
            None => println!("Average rating:         -"),
        }
        return Ok(());
    }

    output_success(&output_format, "Dashboard", Some(json!({ "summary": summary })))
}

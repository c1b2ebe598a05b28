pub mod auth;
pub mod dashboard;
pub mod feedback;
pub mod flags;
pub mod subscriptions;
pub mod users;

use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;

use crate::cli::utils::{output_rendered, output_rows, print_notifications, user_error};
use crate::cli::OutputFormat;
use crate::client::ListQuery;
use crate::context::AppContext;
use crate::error::ClientError;
use crate::models::Record;
use crate::pages::PageSpec;
use crate::transform::{filter, parse_order_str, Predicate};
use crate::view::{Rendered, ViewController, ViewStatus};

/// Options shared by every `list` subcommand
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[arg(long, help = "Server-side search text")]
    pub query: Option<String>,

    #[arg(long, help = "Local substring filter over the fetched page")]
    pub search: Option<String>,

    #[arg(long, help = "Local sort order, e.g. \"name\" or \"created_at desc, name\"")]
    pub sort: Option<String>,

    #[arg(long = "where", help = "Local JSON filter, e.g. '{\"rating\": {\"$gte\": 4}}'")]
    pub where_json: Option<String>,

    #[arg(long, help = "Page size")]
    pub limit: Option<u32>,

    #[arg(long, help = "Rows to skip")]
    pub offset: Option<u32>,
}

impl ListArgs {
    fn list_query(&self, default_page_size: u32) -> ListQuery {
        let mut query = ListQuery::page(self.limit.unwrap_or(default_page_size), self.offset.unwrap_or(0));
        if let Some(text) = &self.query {
            query = query.with_search(text.as_str());
        }
        query
    }
}

/// Mount a page's view with `query`; fails unless it reaches `Ready`
pub async fn open_view<T>(ctx: &AppContext, page: &PageSpec, query: ListQuery) -> anyhow::Result<ViewController<T>>
where
    T: Record + DeserializeOwned,
{
    let mut options = page.options(ctx.config.api.default_page_size).map_err(user_error)?;
    options.initial_query = query;
    let view = ViewController::new(ctx.guard.clone(), ctx.resource::<T>(), ctx.sink.clone(), options);

    if view.mount().await != ViewStatus::Ready {
        print_notifications(&ctx.notices.drain());
        match view.render().await {
            Rendered::Error(message) => anyhow::bail!(message),
            _ => anyhow::bail!("{} is not available for this session", page.title),
        }
    }
    Ok(view)
}

/// Query that narrows a list to one row, so a mutation can find it in the loaded page
pub fn single(id: &str) -> ListQuery {
    ListQuery::page(1, 0).with_filter("id", id)
}

pub async fn list_page<T>(ctx: &AppContext, page: &PageSpec, args: ListArgs, format: OutputFormat) -> anyhow::Result<()>
where
    T: Record + DeserializeOwned + Serialize,
{
    // Bad local options fail before anything is fetched
    let sort = args.sort.as_deref().map(parse_order_str).transpose().map_err(user_error)?;
    let predicate = args.where_json.as_deref().map(Predicate::parse_str).transpose().map_err(user_error)?;

    let view = open_view::<T>(ctx, page, args.list_query(ctx.config.api.default_page_size)).await?;
    if let Some(keys) = sort {
        view.set_sort(keys).await;
    }
    if let Some(text) = &args.search {
        view.set_search(text).await;
    }

    let rendered = match (predicate, view.render().await) {
        (Some(predicate), Rendered::Table(rows)) => {
            let kept = filter(&rows, |row: &T| predicate.matches(row));
            if kept.is_empty() {
                Rendered::Empty("No results match your filter.".to_string())
            } else {
                Rendered::Table(kept)
            }
        }
        (_, rendered) => rendered,
    };

    print_notifications(&ctx.notices.drain());
    output_rendered(&format, page, rendered)
}

/// Report a mutation: notices on stderr, the changed row on stdout
pub fn finish_mutation<T>(
    ctx: &AppContext,
    page: &PageSpec,
    format: OutputFormat,
    result: Result<T, ClientError>,
) -> anyhow::Result<()>
where
    T: Record + Serialize,
{
    print_notifications(&ctx.notices.drain());
    let record = result.map_err(user_error)?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({ "success": true, "record": record }))?);
            Ok(())
        }
        OutputFormat::Text => output_rows(&format, page, std::slice::from_ref(&record)),
    }
}

use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, BufRead, Write};

use crate::cli::OutputFormat;
use crate::error::ClientError;
use crate::models::Record;
use crate::notify::{Notification, NotificationKind};
use crate::pages::{render_table, PageSpec};
use crate::view::Rendered;

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let (Some(Value::Object(extra)), Some(object)) = (data, response.as_object_mut()) {
                object.extend(extra);
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&json!({
                collection_name: []
            }))?);
        }
        OutputFormat::Text => {
            println!("{}", message);
        }
    }
    Ok(())
}

pub fn output_rows<T: Record + Serialize>(
    output_format: &OutputFormat,
    page: &PageSpec,
    rows: &[T],
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let key = T::RESOURCE;
            println!("{}", serde_json::to_string_pretty(&json!({ key: rows }))?);
        }
        OutputFormat::Text => {
            println!("{}", render_table(page.columns, rows));
            println!("\n{} {}", rows.len(), if rows.len() == 1 { "row" } else { "rows" });
        }
    }
    Ok(())
}

/// Notices go to stderr so stdout stays machine-readable
pub fn print_notifications(notices: &[Notification]) {
    for notice in notices {
        match notice.kind {
            NotificationKind::Success => eprintln!("✓ {}", notice.message),
            NotificationKind::Error => eprintln!("✗ {}", notice.message),
        }
    }
}

/// Print what a view rendered; anything but a table or empty state is a failed command
pub fn output_rendered<T: Record + Serialize>(
    output_format: &OutputFormat,
    page: &PageSpec,
    rendered: Rendered<T>,
) -> anyhow::Result<()> {
    match rendered {
        Rendered::Table(rows) => output_rows(output_format, page, &rows),
        Rendered::Empty(message) => output_empty_collection(output_format, T::RESOURCE, &message),
        Rendered::Error(message) => anyhow::bail!(message),
        Rendered::Nothing => anyhow::bail!("{} is not available for this session", page.title),
        Rendered::Loading => anyhow::bail!("{} did not finish loading", page.title),
    }
}

/// Keep the plain-language message on top and the raw error underneath for `CLI_VERBOSE`
pub fn user_error(err: ClientError) -> anyhow::Error {
    let message = err.user_message();
    anyhow::Error::new(err).context(message)
}

/// Password from the flag, then `COACH_PASSWORD`, then one line of stdin
pub fn read_password(flag: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = flag {
        return Ok(password);
    }
    if let Ok(password) = std::env::var("COACH_PASSWORD") {
        return Ok(password);
    }

    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

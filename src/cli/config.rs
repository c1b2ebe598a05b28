use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::{FileTokenStore, SharedTokenStore};
use crate::cli::TerminalNavigator;
use crate::config::config;
use crate::context::AppContext;

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("COACH_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("coachdesk")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn open_token_store() -> anyhow::Result<SharedTokenStore> {
    let dir = get_config_dir()?;
    Ok(Arc::new(FileTokenStore::in_dir(&dir)))
}

/// Process config plus an optional `--api-url`, wired to the saved session
pub fn build_context(api_url: Option<String>) -> anyhow::Result<AppContext> {
    let mut client_config = config().clone();
    if let Some(url) = api_url {
        client_config = client_config.with_base_url(url);
    }
    let store = open_token_store()?;
    Ok(AppContext::new(client_config, store, Arc::new(TerminalNavigator))?)
}

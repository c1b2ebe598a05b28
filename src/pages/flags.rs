use super::{Column, PageSpec};
use crate::auth::Role;
use crate::config::FlagDefaults;
use crate::error::ClientError;
use crate::models::{FeatureFlag, FlagConfigInput};
use crate::navigation::Route;
use crate::notify::NotificationSink;
use crate::view::ViewController;

pub const PAGE: PageSpec = PageSpec {
    route: Route::Flags,
    title: "Feature flags",
    required_role: Some(Role::Admin),
    columns: &[
        Column::new("key", "Key"),
        Column::new("enabled", "Enabled"),
        Column::new("description", "Description"),
    ],
    default_order: "key",
    search_fields: &["key", "description"],
    empty_message: "No feature flags defined.",
};

pub async fn toggle(view: &ViewController<FeatureFlag>, id: &str) -> Result<FeatureFlag, ClientError> {
    view.toggle(id, "enabled").await
}

/// Validate the typed config locally; nothing is sent unless it is a JSON object
pub async fn save_config(
    view: &ViewController<FeatureFlag>,
    sink: &dyn NotificationSink,
    id: &str,
    text: &str,
) -> Result<FeatureFlag, ClientError> {
    let input = match FlagConfigInput::parse(text) {
        Ok(input) => input,
        Err(e) => {
            sink.error(&e.user_message());
            return Err(e);
        }
    };
    view.update(id, input.into_payload()).await
}

/// Keys known to either the server or the deploy-time defaults, with their effective state
pub fn effective_states(flags: &[FeatureFlag], defaults: &FlagDefaults) -> Vec<(String, bool)> {
    let mut keys: Vec<String> = flags.iter().map(|f| f.key.clone()).collect();
    keys.extend(defaults.flags.keys().cloned());
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .map(|key| {
            let on = FeatureFlag::effective(flags, defaults, &key);
            (key, on)
        })
        .collect()
}

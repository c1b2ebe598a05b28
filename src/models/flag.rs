use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{FieldValue, Record};
use crate::config::FlagDefaults;
use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureFlag {
    pub id: Uuid,
    pub key: String,
    pub enabled: bool,
    #[serde(default)]
    pub description: String,
    /// Free-form settings edited by admins as raw JSON
    #[serde(default)]
    pub config: Value,
}

impl FeatureFlag {
    /// Server value wins; otherwise the deploy-time default; otherwise off
    pub fn effective(flags: &[FeatureFlag], defaults: &FlagDefaults, key: &str) -> bool {
        flags
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.enabled)
            .or_else(|| defaults.get(key))
            .unwrap_or(false)
    }
}

impl Record for FeatureFlag {
    const RESOURCE: &'static str = "flags";
    const LABEL: &'static str = "Flag";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "key" => Some(self.key.as_str().into()),
            "enabled" => Some(self.enabled.into()),
            "description" => Some(self.description.as_str().into()),
            _ => None,
        }
    }
}

/// Text typed into the flag config editor, validated before it is sent
#[derive(Debug, Clone, PartialEq)]
pub struct FlagConfigInput {
    value: Value,
}

impl FlagConfigInput {
    pub fn parse(text: &str) -> Result<Self, ClientError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self { value: json!({}) });
        }

        let value: Value = serde_json::from_str(trimmed)
            .map_err(|e| ClientError::field_error("config", format!("Config is not valid JSON: {}", e)))?;
        if !value.is_object() {
            return Err(ClientError::field_error("config", "Config must be a JSON object"));
        }
        Ok(Self { value })
    }

    pub fn into_payload(self) -> Value {
        json!({ "config": self.value })
    }
}

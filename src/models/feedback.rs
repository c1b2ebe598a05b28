use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FieldValue, Record};

/// A client's rating of a coaching session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    pub coach_id: Uuid,
    pub client_id: Uuid,
    /// 1 to 5
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Record for Feedback {
    const RESOURCE: &'static str = "feedback";
    const LABEL: &'static str = "Feedback";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "coach_id" => Some(self.coach_id.to_string().into()),
            "client_id" => Some(self.client_id.to_string().into()),
            "rating" => Some(FieldValue::Number(f64::from(self.rating))),
            "comment" => self.comment.as_deref().map(FieldValue::from),
            "created_at" => Some(self.created_at.into()),
            _ => None,
        }
    }
}

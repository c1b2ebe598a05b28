use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    PastDue,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }

    /// Counts toward recurring revenue
    pub fn is_billable(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::PastDue)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    pub user_id: Uuid,
    pub plan: String,
    pub status: SubscriptionStatus,
    /// Monthly price in the account currency
    pub amount: Decimal,
    #[serde(default)]
    pub renews_at: Option<DateTime<Utc>>,
}

impl Record for Subscription {
    const RESOURCE: &'static str = "subscriptions";
    const LABEL: &'static str = "Subscription";

    fn id(&self) -> String {
        self.id.to_string()
    }

    fn field(&self, name: &str) -> Option<FieldValue> {
        match name {
            "id" => Some(self.id.to_string().into()),
            "user_id" => Some(self.user_id.to_string().into()),
            "plan" => Some(self.plan.as_str().into()),
            "status" => Some(self.status.as_str().into()),
            "amount" => self.amount.to_f64().map(FieldValue::Number),
            "renews_at" => self.renews_at.map(FieldValue::Date),
            _ => None,
        }
    }
}

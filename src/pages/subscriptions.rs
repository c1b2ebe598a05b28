use rust_decimal::Decimal;
use serde_json::json;
use std::collections::BTreeMap;

use super::{Column, PageSpec};
use crate::auth::Role;
use crate::error::ClientError;
use crate::models::subscription::SubscriptionStatus;
use crate::models::Subscription;
use crate::navigation::Route;
use crate::view::ViewController;

pub const PAGE: PageSpec = PageSpec {
    route: Route::Subscriptions,
    title: "Subscriptions",
    required_role: Some(Role::Admin),
    columns: &[
        Column::new("plan", "Plan"),
        Column::new("status", "Status"),
        Column::new("amount", "Amount"),
        Column::new("renews_at", "Renews"),
        Column::new("user_id", "User"),
    ],
    default_order: "renews_at asc",
    search_fields: &["plan", "status"],
    empty_message: "No subscriptions yet.",
};

pub async fn cancel(view: &ViewController<Subscription>, id: &str) -> Result<Subscription, ClientError> {
    view.update(id, json!({ "status": SubscriptionStatus::Cancelled.as_str() })).await
}

/// Recurring revenue from billable subscriptions, exact to the cent
pub fn monthly_revenue(subscriptions: &[Subscription]) -> Decimal {
    subscriptions
        .iter()
        .filter(|s| s.status.is_billable())
        .map(|s| s.amount)
        .sum()
}

pub fn revenue_by_plan(subscriptions: &[Subscription]) -> BTreeMap<String, Decimal> {
    let mut plans: BTreeMap<String, Decimal> = BTreeMap::new();
    for s in subscriptions.iter().filter(|s| s.status.is_billable()) {
        *plans.entry(s.plan.clone()).or_default() += s.amount;
    }
    plans
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sub(plan: &str, status: SubscriptionStatus, amount: Decimal) -> Subscription {
        Subscription { id: Uuid::new_v4(), user_id: Uuid::new_v4(), plan: plan.into(), status, amount, renews_at: None }
    }

    #[test]
    fn revenue_skips_cancelled_and_trials() {
        let subs = vec![
            sub("pro", SubscriptionStatus::Active, Decimal::new(4999, 2)),
            sub("pro", SubscriptionStatus::PastDue, Decimal::new(4999, 2)),
            sub("basic", SubscriptionStatus::Active, Decimal::new(1000, 2)),
            sub("pro", SubscriptionStatus::Cancelled, Decimal::new(4999, 2)),
            sub("basic", SubscriptionStatus::Trialing, Decimal::new(1000, 2)),
        ];
        assert_eq!(monthly_revenue(&subs), Decimal::new(10998, 2));

        let by_plan = revenue_by_plan(&subs);
        assert_eq!(by_plan.get("pro"), Some(&Decimal::new(9998, 2)));
        assert_eq!(by_plan.get("basic"), Some(&Decimal::new(1000, 2)));
    }
}

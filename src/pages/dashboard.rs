use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;

use super::feedback::overall_average;
use super::subscriptions::monthly_revenue;
use crate::auth::Role;
use crate::client::{ListQuery, Resource};
use crate::context::AppContext;
use crate::error::ClientError;
use crate::models::{FeatureFlag, Feedback, Subscription, User};
use crate::view::{CompositeView, Loader};

/// Headline numbers for the admin landing page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub users: usize,
    pub active_users: usize,
    pub billable_subscriptions: usize,
    pub monthly_revenue: Decimal,
    pub flags_enabled: usize,
    pub average_rating: Option<f64>,
}

pub struct DashboardLoader {
    pub users: Arc<dyn Resource<User>>,
    pub subscriptions: Arc<dyn Resource<Subscription>>,
    pub flags: Arc<dyn Resource<FeatureFlag>>,
    pub feedback: Arc<dyn Resource<Feedback>>,
}

impl DashboardLoader {
    pub fn from_context(ctx: &AppContext) -> Self {
        Self {
            users: ctx.resource(),
            subscriptions: ctx.resource(),
            flags: ctx.resource(),
            feedback: ctx.resource(),
        }
    }
}

#[async_trait]
impl Loader<DashboardSummary> for DashboardLoader {
    async fn load_all(&self) -> Result<DashboardSummary, ClientError> {
        let query = ListQuery::default();
        let (users, subscriptions, flags, feedback) = futures::try_join!(
            self.users.list(&query),
            self.subscriptions.list(&query),
            self.flags.list(&query),
            self.feedback.list(&query),
        )?;

        Ok(DashboardSummary {
            users: users.len(),
            active_users: users.iter().filter(|u| u.is_active).count(),
            billable_subscriptions: subscriptions.iter().filter(|s| s.status.is_billable()).count(),
            monthly_revenue: monthly_revenue(&subscriptions),
            flags_enabled: flags.iter().filter(|f| f.enabled).count(),
            average_rating: overall_average(&feedback),
        })
    }
}

pub fn view(ctx: &AppContext) -> CompositeView<DashboardSummary> {
    CompositeView::new(ctx.guard.clone(), Arc::new(DashboardLoader::from_context(ctx)), Some(Role::Admin))
}

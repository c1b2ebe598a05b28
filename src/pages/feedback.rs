use serde_json::json;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::{Column, PageSpec};
use crate::auth::Role;
use crate::error::ClientError;
use crate::models::Feedback;
use crate::navigation::Route;
use crate::transform::average_by;
use crate::view::ViewController;

pub const PAGE: PageSpec = PageSpec {
    route: Route::Feedback,
    title: "Feedback",
    required_role: Some(Role::User),
    columns: &[
        Column::new("created_at", "Date"),
        Column::new("rating", "Rating"),
        Column::new("comment", "Comment"),
        Column::new("coach_id", "Coach"),
    ],
    default_order: "created_at desc",
    search_fields: &["comment"],
    empty_message: "No feedback yet.",
};

pub async fn submit(
    view: &ViewController<Feedback>,
    coach_id: Uuid,
    client_id: Uuid,
    rating: u8,
    comment: Option<&str>,
) -> Result<Feedback, ClientError> {
    if !(1..=5).contains(&rating) {
        return Err(ClientError::field_error("rating", "Rating must be between 1 and 5"));
    }
    let comment = comment.map(str::trim).filter(|c| !c.is_empty());
    view.create(json!({
        "coach_id": coach_id,
        "client_id": client_id,
        "rating": rating,
        "comment": comment,
    }))
    .await
}

/// Mean rating per coach; coaches without feedback are absent
pub fn average_by_coach(entries: &[Feedback]) -> BTreeMap<Uuid, f64> {
    average_by(entries, |f| f.coach_id, |f| Some(f64::from(f.rating)))
}

pub fn overall_average(entries: &[Feedback]) -> Option<f64> {
    if entries.is_empty() {
        return None;
    }
    let total: f64 = entries.iter().map(|f| f64::from(f.rating)).sum();
    Some(total / entries.len() as f64)
}

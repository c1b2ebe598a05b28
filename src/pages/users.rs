use serde_json::json;
use std::collections::BTreeMap;

use super::{Column, PageSpec};
use crate::auth::Role;
use crate::error::ClientError;
use crate::models::User;
use crate::navigation::Route;
use crate::transform::{aggregate, Reducer};
use crate::view::ViewController;

pub const PAGE: PageSpec = PageSpec {
    route: Route::Users,
    title: "Users",
    required_role: Some(Role::Admin),
    columns: &[
        Column::new("name", "Name"),
        Column::new("email", "Email"),
        Column::new("role", "Role"),
        Column::new("is_active", "Active"),
        Column::new("created_at", "Joined"),
    ],
    default_order: "created_at desc",
    search_fields: &["name", "email"],
    empty_message: "No users yet.",
};

pub async fn toggle_active(view: &ViewController<User>, id: &str) -> Result<User, ClientError> {
    view.toggle(id, "is_active").await
}

pub async fn set_role(view: &ViewController<User>, id: &str, role: Role) -> Result<User, ClientError> {
    view.update(id, json!({ "role": role.as_str() })).await
}

/// Head count per role
pub fn role_counts(users: &[User]) -> BTreeMap<String, usize> {
    aggregate(users, |u| u.role.as_str().to_string(), |_| Some(1.0), Reducer::Count)
        .into_iter()
        .map(|(role, count)| (role, count as usize))
        .collect()
}

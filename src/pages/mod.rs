//! Page declarations: which role may open a page, what it shows, how it sorts.

pub mod dashboard;
pub mod feedback;
pub mod flags;
pub mod subscriptions;
pub mod users;

use crate::auth::Role;
use crate::client::ListQuery;
use crate::error::ClientError;
use crate::models::Record;
use crate::navigation::Route;
use crate::transform::parse_order_str;
use crate::view::ViewOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    pub field: &'static str,
    pub title: &'static str,
}

impl Column {
    pub const fn new(field: &'static str, title: &'static str) -> Self {
        Self { field, title }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PageSpec {
    pub route: Route,
    pub title: &'static str,
    pub required_role: Option<Role>,
    pub columns: &'static [Column],
    /// Order string, e.g. `"created_at desc"`
    pub default_order: &'static str,
    pub search_fields: &'static [&'static str],
    pub empty_message: &'static str,
}

impl PageSpec {
    pub fn options(&self, page_size: u32) -> Result<ViewOptions, ClientError> {
        Ok(ViewOptions {
            required_role: self.required_role,
            initial_query: ListQuery::page(page_size, 0),
            default_sort: parse_order_str(self.default_order)?,
            search_fields: self.search_fields.to_vec(),
            empty_message: self.empty_message.to_string(),
        })
    }

    pub fn column(&self, field: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.field == field)
    }
}

pub fn page_for(route: Route) -> Option<&'static PageSpec> {
    match route {
        Route::Users => Some(&users::PAGE),
        Route::Subscriptions => Some(&subscriptions::PAGE),
        Route::Flags => Some(&flags::PAGE),
        Route::Feedback => Some(&feedback::PAGE),
        Route::Login | Route::Register | Route::Dashboard => None,
    }
}

/// Plain-text table with one padded column per field; missing values show as `-`
pub fn render_table<T: Record>(columns: &[Column], rows: &[T]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            columns
                .iter()
                .map(|c| row.field(c.field).map(|v| v.to_string()).unwrap_or_else(|| "-".to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|r| r[i].chars().count())
                .chain(std::iter::once(c.title.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let line = |values: Vec<&str>| -> String {
        values
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<width$}", v, width = *w))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(columns.iter().map(|c| c.title).collect()));
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in &cells {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

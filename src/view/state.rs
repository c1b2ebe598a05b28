use serde::Serialize;

use crate::client::ListQuery;
use crate::models::Record;
use crate::transform::{filter, search, sort_by_keys, SortKey};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Idle,
    Authorizing,
    Loading,
    Ready,
    Error,
    /// The guard refused the view and navigation is under way
    Terminated,
}

impl ViewStatus {
    pub fn is_settled(&self) -> bool {
        matches!(self, ViewStatus::Ready | ViewStatus::Error | ViewStatus::Terminated)
    }
}

#[derive(Debug, Clone)]
pub struct ViewState<T> {
    pub status: ViewStatus,
    pub error: Option<String>,
    pub data: Vec<T>,
    pub query: ListQuery,
    pub sort: Vec<SortKey>,
    /// Local substring filter, applied in memory
    pub search: String,
}

impl<T> ViewState<T> {
    pub fn new(query: ListQuery, sort: Vec<SortKey>) -> Self {
        Self {
            status: ViewStatus::Idle,
            error: None,
            data: Vec::new(),
            query,
            sort,
            search: String::new(),
        }
    }
}

impl<T: Record> ViewState<T> {
    /// Data after the local filter and sort
    pub fn visible(&self, search_fields: &[&str]) -> Vec<T> {
        let matched = filter(&self.data, search::<T>(search_fields, &self.search));
        if self.sort.is_empty() {
            matched
        } else {
            sort_by_keys(&matched, &self.sort)
        }
    }

    pub fn find(&self, id: &str) -> Option<&T> {
        self.data.iter().find(|row| row.id() == id)
    }

    pub(crate) fn replace(&mut self, row: T) -> bool {
        let id = row.id();
        match self.data.iter_mut().find(|r| r.id() == id) {
            Some(slot) => {
                *slot = row;
                true
            }
            None => false,
        }
    }

    pub(crate) fn remove(&mut self, id: &str) -> bool {
        let before = self.data.len();
        self.data.retain(|r| r.id() != id);
        self.data.len() != before
    }
}

/// What a view shows right now
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered<T> {
    /// Redirecting; draw nothing
    Nothing,
    Loading,
    Empty(String),
    Error(String),
    Table(Vec<T>),
}

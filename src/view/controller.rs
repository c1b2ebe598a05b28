use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::state::{Rendered, ViewState, ViewStatus};
use super::ticket::Tickets;
use crate::auth::{Role, SessionGuard};
use crate::client::{ListQuery, Resource};
use crate::error::{ClientError, DenyReason};
use crate::models::Record;
use crate::notify::SharedSink;
use crate::transform::{SortDirection, SortKey};

#[derive(Debug, Clone)]
pub struct ViewOptions {
    pub required_role: Option<Role>,
    pub initial_query: ListQuery,
    pub default_sort: Vec<SortKey>,
    pub search_fields: Vec<&'static str>,
    pub empty_message: String,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            required_role: None,
            initial_query: ListQuery::default(),
            default_sort: Vec::new(),
            search_fields: Vec::new(),
            empty_message: "Nothing here yet.".to_string(),
        }
    }
}

/// Guard, fetch, transform, render and mutate one collection.
///
/// `Idle -> Authorizing -> Loading -> Ready | Error`, with `Ready`/`Error`
/// going back to `Loading` on refetch. A guard denial ends in `Terminated`.
/// Mutations never move the view into `Error`.
pub struct ViewController<T: Record> {
    guard: Arc<SessionGuard>,
    resource: Arc<dyn Resource<T>>,
    sink: SharedSink,
    options: ViewOptions,
    state: RwLock<ViewState<T>>,
    tickets: Tickets,
}

impl<T: Record> ViewController<T> {
    pub fn new(
        guard: Arc<SessionGuard>,
        resource: Arc<dyn Resource<T>>,
        sink: SharedSink,
        options: ViewOptions,
    ) -> Self {
        let state = ViewState::new(options.initial_query.clone(), options.default_sort.clone());
        Self { guard, resource, sink, options, state: RwLock::new(state), tickets: Tickets::new() }
    }

    pub async fn status(&self) -> ViewStatus {
        self.state.read().await.status
    }

    pub async fn snapshot(&self) -> ViewState<T> {
        self.state.read().await.clone()
    }

    /// Authorize, then run the first load
    pub async fn mount(&self) -> ViewStatus {
        self.tickets.mount();
        self.state.write().await.status = ViewStatus::Authorizing;

        if self.guard.authorize(self.options.required_role).is_err() {
            let mut state = self.state.write().await;
            state.status = ViewStatus::Terminated;
            state.data.clear();
            return state.status;
        }

        let query = self.state.read().await.query.clone();
        self.load(query).await
    }

    /// Drop whatever is still in flight; nothing touches the state afterwards
    pub fn unmount(&self) {
        tracing::debug!("Unmounting {} view", T::RESOURCE);
        self.tickets.unmount();
    }

    pub async fn refresh(&self) -> ViewStatus {
        let query = self.state.read().await.query.clone();
        self.load(query).await
    }

    /// Server-side search; resets paging
    pub async fn submit_search(&self, text: &str) -> ViewStatus {
        let mut query = self.state.read().await.query.clone().with_search(text);
        if query.offset.is_some() {
            query.offset = Some(0);
        }
        self.load(query).await
    }

    pub async fn set_page(&self, offset: u32) -> ViewStatus {
        let mut query = self.state.read().await.query.clone();
        query.offset = Some(offset);
        self.load(query).await
    }

    pub async fn next_page(&self) -> ViewStatus {
        let query = self.state.read().await.query.clone();
        let step = query.limit.unwrap_or(0);
        self.set_page(query.offset.unwrap_or(0).saturating_add(step)).await
    }

    pub async fn previous_page(&self) -> ViewStatus {
        let query = self.state.read().await.query.clone();
        let step = query.limit.unwrap_or(0);
        self.set_page(query.offset.unwrap_or(0).saturating_sub(step)).await
    }

    /// Fetch with `query`; only the newest request's result is applied
    pub async fn load(&self, query: ListQuery) -> ViewStatus {
        let (ticket, epoch) = {
            let mut state = self.state.write().await;
            if !self.tickets.is_mounted() || state.status == ViewStatus::Terminated {
                return state.status;
            }
            state.status = ViewStatus::Loading;
            state.query = query.clone();
            (self.tickets.issue(), self.guard.epoch())
        };

        let result = self.resource.list(&query).await;

        let mut state = self.state.write().await;
        if !self.tickets.is_current(ticket) {
            tracing::debug!("Discarding stale {} response (ticket {})", T::RESOURCE, ticket);
            return state.status;
        }

        match result {
            Ok(rows) => {
                tracing::debug!("Loaded {} {}", rows.len(), T::RESOURCE);
                state.data = rows;
                state.error = None;
                state.status = ViewStatus::Ready;
            }
            Err(e) if e.is_session_failure() => {
                state.data.clear();
                state.status = ViewStatus::Terminated;
                drop(state);
                self.guard.deny_since(DenyReason::NoSession, epoch);
                return ViewStatus::Terminated;
            }
            Err(e) => {
                tracing::error!("Loading {} failed: {}", T::RESOURCE, e);
                state.data.clear();
                state.error = Some(e.user_message());
                state.status = ViewStatus::Error;
            }
        }
        state.status
    }

    /// Click on a column header: same field flips direction, a new field starts ascending
    pub async fn sort_by(&self, field: &str) {
        let mut state = self.state.write().await;
        let direction = match state.sort.first() {
            Some(key) if key.field == field => key.direction.toggled(),
            _ => SortDirection::Asc,
        };
        state.sort = vec![SortKey { field: field.to_string(), direction }];
    }

    pub async fn set_sort(&self, keys: Vec<SortKey>) {
        self.state.write().await.sort = keys;
    }

    pub async fn set_search(&self, text: &str) {
        self.state.write().await.search = text.to_string();
    }

    pub async fn rows(&self) -> Vec<T> {
        self.state.read().await.visible(&self.options.search_fields)
    }

    pub async fn render(&self) -> Rendered<T> {
        let state = self.state.read().await;
        match state.status {
            ViewStatus::Terminated => Rendered::Nothing,
            ViewStatus::Idle | ViewStatus::Authorizing | ViewStatus::Loading => Rendered::Loading,
            ViewStatus::Error => Rendered::Error(
                state.error.clone().unwrap_or_else(|| "Something went wrong.".to_string()),
            ),
            ViewStatus::Ready => {
                let rows = state.visible(&self.options.search_fields);
                if state.data.is_empty() {
                    Rendered::Empty(self.options.empty_message.clone())
                } else if rows.is_empty() {
                    Rendered::Empty("No results match your search.".to_string())
                } else {
                    Rendered::Table(rows)
                }
            }
        }
    }

    pub async fn update(&self, id: &str, payload: Value) -> Result<T, ClientError> {
        if let Err(e) = self.ensure_ready().await {
            return Err(self.mutation_failed("update", e, self.guard.epoch()));
        }

        let epoch = self.guard.epoch();
        match self.resource.update(id, &payload).await {
            Ok(row) => {
                self.apply(|state| {
                    if !state.replace(row.clone()) {
                        tracing::warn!("Updated {} {} is not in the loaded page", T::LABEL, id);
                    }
                })
                .await;
                self.sink.success(&format!("{} updated.", T::LABEL));
                Ok(row)
            }
            Err(e) => Err(self.mutation_failed("update", e, epoch)),
        }
    }

    /// Flip a boolean column on one row
    pub async fn toggle(&self, id: &str, field: &str) -> Result<T, ClientError> {
        if let Err(e) = self.ensure_ready().await {
            return Err(self.mutation_failed("update", e, self.guard.epoch()));
        }

        let current = {
            let state = self.state.read().await;
            state
                .find(id)
                .and_then(|row| row.field(field))
                .and_then(|v| v.as_bool())
        };

        let Some(current) = current else {
            let err = ClientError::validation(format!("{} {} has no on/off field '{}'", T::LABEL, id, field));
            self.sink.error(&err.user_message());
            return Err(err);
        };

        self.update(id, json!({ field: !current })).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), ClientError> {
        if let Err(e) = self.ensure_ready().await {
            return Err(self.mutation_failed("delete", e, self.guard.epoch()));
        }

        let epoch = self.guard.epoch();
        match self.resource.remove(id).await {
            Ok(()) => {
                self.apply(|state| {
                    state.remove(id);
                })
                .await;
                self.sink.success(&format!("{} deleted.", T::LABEL));
                Ok(())
            }
            Err(e) => Err(self.mutation_failed("delete", e, epoch)),
        }
    }

    pub async fn create(&self, payload: Value) -> Result<T, ClientError> {
        if let Err(e) = self.ensure_ready().await {
            return Err(self.mutation_failed("create", e, self.guard.epoch()));
        }

        let epoch = self.guard.epoch();
        match self.resource.create(&payload).await {
            Ok(row) => {
                self.apply(|state| state.data.push(row.clone())).await;
                self.sink.success(&format!("{} created.", T::LABEL));
                Ok(row)
            }
            Err(e) => Err(self.mutation_failed("create", e, epoch)),
        }
    }

    async fn ensure_ready(&self) -> Result<(), ClientError> {
        let status = self.status().await;
        if status == ViewStatus::Ready && self.tickets.is_mounted() {
            Ok(())
        } else {
            Err(ClientError::validation("Wait for the page to finish loading."))
        }
    }

    async fn apply<F>(&self, patch: F)
    where
        F: FnOnce(&mut ViewState<T>),
    {
        if !self.tickets.is_mounted() {
            tracing::debug!("View unmounted, skipping {} patch", T::RESOURCE);
            return;
        }
        let mut state = self.state.write().await;
        patch(&mut state);
    }

    /// Every failed mutation ends in exactly one notice or one redirect
    fn mutation_failed(&self, action: &str, err: ClientError, epoch: u64) -> ClientError {
        tracing::warn!("Could not {} {}: {}", action, T::LABEL, err);
        if err.is_session_failure() {
            self.guard.deny_since(DenyReason::NoSession, epoch);
        } else {
            self.sink.error(&err.user_message());
        }
        err
    }
}

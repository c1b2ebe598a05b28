use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::state::{Rendered, ViewStatus};
use super::ticket::Tickets;
use crate::auth::{Role, SessionGuard};
use crate::error::{ClientError, DenyReason};

/// Fetches everything a composite view needs in one go
#[async_trait]
pub trait Loader<D>: Send + Sync {
    async fn load_all(&self) -> Result<D, ClientError>;
}

#[derive(Debug, Clone)]
pub struct CompositeState<D> {
    pub status: ViewStatus,
    pub error: Option<String>,
    pub data: Option<D>,
}

/// A gated view built from several resources at once.
///
/// Any failed fetch fails the whole view; partial data is never shown.
pub struct CompositeView<D> {
    guard: Arc<SessionGuard>,
    loader: Arc<dyn Loader<D>>,
    required_role: Option<Role>,
    state: RwLock<CompositeState<D>>,
    tickets: Tickets,
}

impl<D: Clone + Send + Sync + 'static> CompositeView<D> {
    pub fn new(guard: Arc<SessionGuard>, loader: Arc<dyn Loader<D>>, required_role: Option<Role>) -> Self {
        Self {
            guard,
            loader,
            required_role,
            state: RwLock::new(CompositeState { status: ViewStatus::Idle, error: None, data: None }),
            tickets: Tickets::new(),
        }
    }

    pub async fn snapshot(&self) -> CompositeState<D> {
        self.state.read().await.clone()
    }

    pub async fn mount(&self) -> ViewStatus {
        self.tickets.mount();
        self.state.write().await.status = ViewStatus::Authorizing;

        if self.guard.authorize(self.required_role).is_err() {
            let mut state = self.state.write().await;
            state.status = ViewStatus::Terminated;
            state.data = None;
            return state.status;
        }
        self.refresh().await
    }

    pub fn unmount(&self) {
        self.tickets.unmount();
    }

    pub async fn refresh(&self) -> ViewStatus {
        let (ticket, epoch) = {
            let mut state = self.state.write().await;
            if !self.tickets.is_mounted() || state.status == ViewStatus::Terminated {
                return state.status;
            }
            state.status = ViewStatus::Loading;
            (self.tickets.issue(), self.guard.epoch())
        };

        let result = self.loader.load_all().await;

        let mut state = self.state.write().await;
        if !self.tickets.is_current(ticket) {
            tracing::debug!("Discarding stale composite response (ticket {})", ticket);
            return state.status;
        }

        match result {
            Ok(data) => {
                state.data = Some(data);
                state.error = None;
                state.status = ViewStatus::Ready;
            }
            Err(e) if e.is_session_failure() => {
                state.data = None;
                state.status = ViewStatus::Terminated;
                drop(state);
                self.guard.deny_since(DenyReason::NoSession, epoch);
                return ViewStatus::Terminated;
            }
            Err(e) => {
                tracing::error!("Composite load failed: {}", e);
                state.data = None;
                state.error = Some(e.user_message());
                state.status = ViewStatus::Error;
            }
        }
        state.status
    }

    pub async fn render(&self) -> Rendered<D> {
        let state = self.state.read().await;
        match (state.status, &state.data) {
            (ViewStatus::Terminated, _) => Rendered::Nothing,
            (ViewStatus::Error, _) => Rendered::Error(
                state.error.clone().unwrap_or_else(|| "Something went wrong.".to_string()),
            ),
            (ViewStatus::Ready, Some(data)) => Rendered::Table(vec![data.clone()]),
            _ => Rendered::Loading,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::fresh;
    use crate::auth::MemoryTokenStore;
    use crate::client::{ListQuery, Resource};
    use crate::navigation::{RecordingNavigator, Route};
    use crate::notify::NotificationQueue;
    use crate::view::testing::{FakeResource, Item};
    use std::time::Duration;

    struct Pair {
        left: Arc<FakeResource>,
        right: Arc<FakeResource>,
    }

    #[async_trait]
    impl Loader<(usize, usize)> for Pair {
        async fn load_all(&self) -> Result<(usize, usize), ClientError> {
            let query = ListQuery::default();
            let (left, right) = futures::try_join!(self.left.list(&query), self.right.list(&query))?;
            Ok((left.len(), right.len()))
        }
    }

    fn view(token: Option<String>, pair: Pair) -> (Arc<RecordingNavigator>, CompositeView<(usize, usize)>) {
        let store = Arc::new(match token {
            Some(t) => MemoryTokenStore::with_token(t),
            None => MemoryTokenStore::new(),
        });
        let queue = Arc::new(NotificationQueue::new(Duration::from_secs(60)));
        let nav = Arc::new(RecordingNavigator::new());
        let guard = Arc::new(SessionGuard::new(store, queue, nav.clone()));
        (nav, CompositeView::new(guard, Arc::new(pair), Some(Role::Admin)))
    }

    fn pair() -> Pair {
        Pair {
            left: Arc::new(FakeResource::new(vec![Item::new("1", "a", true)])),
            right: Arc::new(FakeResource::new(vec![Item::new("2", "b", true), Item::new("3", "c", false)])),
        }
    }

    #[tokio::test]
    async fn loads_every_part() {
        let (_, view) = view(Some(fresh(Role::Admin)), pair());
        assert_eq!(view.mount().await, ViewStatus::Ready);
        assert_eq!(view.render().await, Rendered::Table(vec![(1, 2)]));
    }

    #[tokio::test]
    async fn one_failure_fails_the_whole_view() {
        let parts = pair();
        parts.right.fail_next_list(ClientError::request_failed(503, "down"));
        let (_, view) = view(Some(fresh(Role::Admin)), parts);
        assert_eq!(view.mount().await, ViewStatus::Error);
        assert!(view.snapshot().await.data.is_none());
    }

    #[tokio::test]
    async fn user_role_is_sent_home() {
        let (nav, view) = view(Some(fresh(Role::User)), pair());
        assert_eq!(view.mount().await, ViewStatus::Terminated);
        assert_eq!(nav.visits(), vec![Route::Feedback]);
        assert_eq!(view.render().await, Rendered::Nothing);
    }
}

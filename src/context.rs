use serde::de::DeserializeOwned;
use std::sync::Arc;

use crate::auth::{SessionGuard, SharedTokenStore};
use crate::client::{ApiClient, AuthClient, Resource, ResourceClient};
use crate::config::{ClientConfig, FlagDefaults};
use crate::error::ClientError;
use crate::models::Record;
use crate::navigation::Navigator;
use crate::notify::{NotificationQueue, SharedSink, Tee, TracingSink};
use crate::pages::PageSpec;
use crate::view::ViewController;

/// Everything a view needs, wired once per process
pub struct AppContext {
    pub config: ClientConfig,
    pub store: SharedTokenStore,
    pub notices: Arc<NotificationQueue>,
    pub sink: SharedSink,
    pub guard: Arc<SessionGuard>,
    pub api: ApiClient,
    pub flag_defaults: FlagDefaults,
}

impl AppContext {
    pub fn new(
        config: ClientConfig,
        store: SharedTokenStore,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ClientError> {
        let notices = Arc::new(NotificationQueue::new(config.notification_ttl()));
        let sinks: Vec<SharedSink> = vec![notices.clone(), Arc::new(TracingSink)];
        let sink: SharedSink = Arc::new(Tee::new(sinks));
        let guard = Arc::new(SessionGuard::new(store.clone(), sink.clone(), navigator));
        let api = ApiClient::new(&config, store.clone())?;
        let flag_defaults = config.load_flag_defaults()?;

        tracing::debug!("Client context ready for {}", config.api.base_url);
        Ok(Self { config, store, notices, sink, guard, api, flag_defaults })
    }

    pub fn auth(&self) -> AuthClient {
        AuthClient::new(self.api.clone())
    }

    pub fn resource<T>(&self) -> Arc<dyn Resource<T>>
    where
        T: Record + DeserializeOwned,
    {
        Arc::new(ResourceClient::<T>::new(self.api.clone()))
    }

    pub fn view<T>(&self, page: &PageSpec) -> Result<ViewController<T>, ClientError>
    where
        T: Record + DeserializeOwned,
    {
        let options = page.options(self.config.api.default_page_size)?;
        Ok(ViewController::new(self.guard.clone(), self.resource::<T>(), self.sink.clone(), options))
    }
}

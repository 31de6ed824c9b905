use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, error};

use crate::util::error::ServiceError;

/// Observable `{data, loading, error}` triple for one remote read.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    pub data: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self { data: None, loading: true, error: None }
    }
}

pub type Loader<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync>;

/// A remote read kept in memory with its loading/error state.
///
/// Errors are logged and stored, never retried. A failed refresh keeps the
/// previously loaded data.
pub struct Resource<T> {
    name: &'static str,
    loader: Loader<T>,
    state: watch::Sender<ResourceState<T>>,
}

impl<T: Clone + Send + Sync + 'static> Resource<T> {
    /// Creates the resource in the loading state without fetching.
    pub fn new<F>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync + 'static,
    {
        let (state, _) = watch::channel(ResourceState::default());
        Self { name, loader: Arc::new(loader), state }
    }

    /// Creates the resource and runs the first load.
    pub async fn mount<F>(name: &'static str, loader: F) -> Self
    where
        F: Fn() -> BoxFuture<'static, Result<T, ServiceError>> + Send + Sync + 'static,
    {
        let resource = Self::new(name, loader);
        resource.refresh().await;
        resource
    }

    pub async fn refresh(&self) {
        self.state.send_modify(|s| s.loading = true);
        match (self.loader)().await {
            Ok(data) => {
                debug!(resource = self.name, "Resource loaded");
                self.state.send_modify(|s| {
                    s.data = Some(data);
                    s.error = None;
                    s.loading = false;
                });
            }
            Err(e) => {
                error!(resource = self.name, "Failed to load resource: {}", e);
                self.state.send_modify(|s| {
                    s.error = Some(e.to_string());
                    s.loading = false;
                });
            }
        }
    }

    pub fn snapshot(&self) -> ResourceState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ResourceState<T>> {
        self.state.subscribe()
    }
}

use futures::FutureExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};
use uuid::Uuid;

use crate::model::notification::Notification;
use crate::repository::notification_repo::NotificationRepository;
use crate::service::resource::Resource;
use crate::util::error::ServiceError;

const DEFAULT_FEED_LIMIT: usize = 50;

#[derive(Clone)]
pub struct NotificationService {
    repo: NotificationRepository,
}

impl NotificationService {
    pub fn new(repo: NotificationRepository) -> Self {
        Self { repo }
    }

    pub async fn recent(&self, limit: Option<usize>) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.repo.get_all(limit.unwrap_or(DEFAULT_FEED_LIMIT)).await?)
    }

    pub async fn unread(&self) -> Result<Vec<Notification>, ServiceError> {
        Ok(self.repo.get_unread().await?)
    }

    pub async fn unread_count(&self) -> Result<usize, ServiceError> {
        Ok(self.repo.unread_count().await?)
    }

    pub async fn mark_as_read(&self, id: Uuid) -> Result<Notification, ServiceError> {
        Ok(self.repo.mark_as_read(id).await?)
    }

    pub async fn mark_all_as_read(&self) -> Result<usize, ServiceError> {
        Ok(self.repo.mark_all_as_read().await?)
    }
}

/// Keeps the unread-notification feed fresh on a fixed interval.
///
/// The first refresh happens immediately. Stopping or dropping the poller
/// aborts the timer task.
pub struct NotificationPoller {
    feed: Arc<Resource<Vec<Notification>>>,
    task: JoinHandle<()>,
}

impl NotificationPoller {
    pub fn spawn(service: NotificationService, interval: Duration) -> Self {
        let feed = Arc::new(Resource::new("unread_notifications", move || {
            let service = service.clone();
            async move { service.unread().await }.boxed()
        }));

        let polled = feed.clone();
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                polled.refresh().await;
                debug!(unread = polled.data().map_or(0, |n| n.len()), "Notification feed refreshed");
            }
        });
        info!(interval_secs = interval.as_secs(), "Notification poller started");

        Self { feed, task }
    }

    pub fn feed(&self) -> Arc<Resource<Vec<Notification>>> {
        self.feed.clone()
    }

    pub fn unread_count(&self) -> usize {
        self.feed.data().map_or(0, |n| n.len())
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub fn stop(&self) {
        if !self.task.is_finished() {
            info!("Stopping notification poller");
        }
        self.task.abort();
    }
}

impl Drop for NotificationPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

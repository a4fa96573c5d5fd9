//! Notification list with read-state actions

use shopadmin_api::{ListQuery, Notification, Resource};
use shopadmin_client::HttpClient;

use crate::config::ViewOptions;
use crate::error::FetchError;
use crate::fetcher::HttpPageFetcher;
use crate::view::CollectionView;

/// Notification list of the signed-in admin
///
/// Read-state changes are confirmed by the backend before the displayed
/// items are touched; a failed call leaves them as they were.
pub struct NotificationFeed {
    client: HttpClient,
    view: CollectionView<Notification>,
}

impl NotificationFeed {
    /// Create the feed and fetch its first page
    ///
    /// Must be called from within a tokio runtime.
    #[must_use]
    pub fn new(client: HttpClient) -> Self {
        Self::with_options(
            client,
            Resource::Notifications.default_query(),
            ViewOptions::default(),
        )
    }

    #[must_use]
    pub fn with_options(client: HttpClient, query: ListQuery, options: ViewOptions) -> Self {
        let fetcher = HttpPageFetcher::for_resource(client.clone(), Resource::Notifications);
        Self {
            client,
            view: CollectionView::with_options(fetcher, query, options),
        }
    }

    /// Underlying collection view
    #[must_use]
    pub fn view(&self) -> &CollectionView<Notification> {
        &self.view
    }

    /// Unread notifications among the displayed ones
    #[must_use]
    pub fn unread_count(&self) -> usize {
        self.view
            .state()
            .items()
            .iter()
            .filter(|n| n.is_unread)
            .count()
    }

    /// Mark one notification as read
    ///
    /// # Errors
    /// Returns the backend or transport error; nothing is patched locally.
    pub async fn mark_as_read(&self, id: &str) -> Result<(), FetchError> {
        let target = id.to_string();
        self.view
            .mutate_and_patch(self.client.mark_notification_read(id), move |items| {
                items
                    .iter_mut()
                    .filter(|n| n.id == target)
                    .for_each(|n| n.is_unread = false);
            })
            .await?;
        tracing::info!(id, "notification marked as read");
        Ok(())
    }

    /// Mark every notification as read
    ///
    /// # Errors
    /// Returns the backend or transport error; nothing is patched locally.
    pub async fn mark_all_as_read(&self) -> Result<(), FetchError> {
        self.view
            .mutate_and_patch(self.client.mark_all_notifications_read(), |items| {
                items.iter_mut().for_each(|n| n.is_unread = false);
            })
            .await?;
        tracing::info!("all notifications marked as read");
        Ok(())
    }
}

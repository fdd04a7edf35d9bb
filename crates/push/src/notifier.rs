use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;
use geopush_core::{
    LocalNotification, NotificationChannel, NotificationPresenter, NotifyError, Platform,
};
use tracing::{debug, info};

const DEFAULT_HISTORY: usize = 50;

type DisplayFn = Box<dyn Fn(&LocalNotification) + Send + Sync>;

/// Shows local notifications immediately and remembers the most recent ones.
///
/// On platforms that need one, a channel has to be registered with
/// [`set_channel`](Self::set_channel) before the first notification.
pub struct LocalNotifier {
    platform: Platform,
    channels: RwLock<HashMap<String, NotificationChannel>>,
    history: Mutex<VecDeque<LocalNotification>>,
    history_limit: usize,
    display: Option<DisplayFn>,
}

impl LocalNotifier {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            channels: RwLock::new(HashMap::new()),
            history: Mutex::new(VecDeque::new()),
            history_limit: DEFAULT_HISTORY,
            display: None,
        }
    }

    /// Hook invoked for every shown notification, e.g. to print it.
    pub fn with_display<F>(mut self, display: F) -> Self
    where
        F: Fn(&LocalNotification) + Send + Sync + 'static,
    {
        self.display = Some(Box::new(display));
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn set_channel(&self, channel: NotificationChannel) {
        debug!(channel = %channel.id, importance = ?channel.importance, "Notification channel set");
        if let Ok(mut channels) = self.channels.write() {
            channels.insert(channel.id.clone(), channel);
        }
    }

    pub fn channel(&self, id: &str) -> Option<NotificationChannel> {
        self.channels.read().ok()?.get(id).cloned()
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<LocalNotification> {
        self.history
            .lock()
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<LocalNotification> {
        self.history.lock().ok()?.back().cloned()
    }
}

#[async_trait]
impl NotificationPresenter for LocalNotifier {
    async fn show_now(&self, notification: &LocalNotification) -> Result<(), NotifyError> {
        if self.platform.requires_channel() {
            let has_channel = self
                .channels
                .read()
                .map(|c| !c.is_empty())
                .unwrap_or(false);
            if !has_channel {
                return Err(NotifyError::ChannelMissing(
                    NotificationChannel::DEFAULT_ID.to_string(),
                ));
            }
        }

        info!(title = %notification.title, body = %notification.body, "Local notification");

        if let Some(display) = &self.display {
            display(notification);
        }

        let mut history = self
            .history
            .lock()
            .map_err(|e| NotifyError::Display(e.to_string()))?;
        if self.history_limit > 0 {
            if history.len() >= self.history_limit {
                history.pop_front();
            }
            history.push_back(notification.clone());
        }

        Ok(())
    }
}

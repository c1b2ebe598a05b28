use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

/// Fire-and-forget user feedback. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, kind: NotificationKind, message: &str);

    fn success(&self, message: &str) {
        self.notify(NotificationKind::Success, message);
    }

    fn error(&self, message: &str) {
        self.notify(NotificationKind::Error, message);
    }
}

pub type SharedSink = Arc<dyn NotificationSink>;

/// Stacks notifications; each one disappears `ttl` after it was posted
#[derive(Debug)]
pub struct NotificationQueue {
    ttl: Duration,
    entries: Mutex<VecDeque<(Instant, Notification)>>,
}

impl NotificationQueue {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Mutex::new(VecDeque::new()) }
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        self.prune(&mut entries, now);
        entries.iter().map(|(_, n)| n.clone()).collect()
    }

    fn post_at(&self, now: Instant, notification: Notification) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        self.prune(&mut entries, now);
        entries.push_back((now, notification));
    }

    // Entries are in posting order, so expired ones sit at the front
    fn prune(&self, entries: &mut VecDeque<(Instant, Notification)>, now: Instant) {
        while let Some((posted, _)) = entries.front() {
            if now.saturating_duration_since(*posted) >= self.ttl {
                entries.pop_front();
            } else {
                break;
            }
        }
    }

    /// Take everything still on screen
    pub fn drain(&self) -> Vec<Notification> {
        let visible = self.visible();
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.clear();
        visible
    }

    pub fn len(&self) -> usize {
        self.visible().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for NotificationQueue {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.post_at(Instant::now(), Notification { kind, message: message.to_string() });
    }
}

/// Sends notifications to the log only
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn notify(&self, kind: NotificationKind, message: &str) {
        match kind {
            NotificationKind::Success => tracing::info!(target: "coachdesk::notify", "{}", message),
            NotificationKind::Error => tracing::warn!(target: "coachdesk::notify", "{}", message),
        }
    }
}

/// Forwards every notification to each inner sink in turn
#[derive(Clone, Default)]
pub struct Tee {
    sinks: Vec<SharedSink>,
}

impl Tee {
    pub fn new(sinks: Vec<SharedSink>) -> Self {
        Self { sinks }
    }
}

impl NotificationSink for Tee {
    fn notify(&self, kind: NotificationKind, message: &str) {
        for sink in &self.sinks {
            sink.notify(kind, message);
        }
    }
}

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};
use crate::ui::UiEffects;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotificationKind::Success => f.write_str("success"),
            NotificationKind::Error => f.write_str("error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: u64,
    pub message: String,
    pub kind: NotificationKind,
}

/// Transient messages, most recent first. Each one expires on its own timer.
#[derive(Clone)]
pub struct Notifier {
    inner: Arc<Inner>,
}

struct Inner {
    next_id: AtomicU64,
    stack: watch::Sender<Vec<Notification>>,
    effects: Arc<dyn UiEffects>,
    ttl: Duration,
}

impl Inner {
    fn remove(&self, id: u64) {
        let mut removed = false;
        self.stack.send_if_modified(|stack| {
            let before = stack.len();
            stack.retain(|n| n.id != id);
            removed = stack.len() != before;
            removed
        });
        if removed {
            debug!("Notification {} expired", id);
            self.effects.notification_removed(id);
        }
    }
}

impl Notifier {
    pub fn new(effects: Arc<dyn UiEffects>, ttl: Duration) -> Self {
        let (stack, _) = watch::channel(Vec::new());
        Notifier {
            inner: Arc::new(Inner {
                next_id: AtomicU64::new(1),
                stack,
                effects,
                ttl,
            }),
        }
    }

    /// Must be called from within a tokio runtime: the removal timer is a spawned task.
    pub fn show_notification(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        let notification = Notification {
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
            message: message.into(),
            kind,
        };
        match kind {
            NotificationKind::Success => info!("{}", notification.message),
            NotificationKind::Error => warn!("{}", notification.message),
        }

        let id = notification.id;
        self.inner.effects.notification_inserted(&notification);
        self.inner.stack.send_modify(|stack| stack.insert(0, notification));

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            sleep(inner.ttl).await;
            inner.remove(id);
        });

        id
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.inner.stack.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Notification>> {
        self.inner.stack.subscribe()
    }
}

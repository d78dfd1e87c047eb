use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::debug;
use crate::notification::Notification;

/// Side effects the console needs from whatever is rendering it.
pub trait UiEffects: Send + Sync {
    fn set_loader_visible(&self, visible: bool);

    fn clear_file_input(&self);

    /// Asks the operator to confirm a destructive action.
    fn confirm(&self, prompt: &str) -> bool;

    fn notification_inserted(&self, _notification: &Notification) {}

    fn notification_removed(&self, _id: u64) {}
}

/// Busy indicator shown while a backend call is in flight.
#[derive(Clone)]
pub struct Loader {
    effects: Arc<dyn UiEffects>,
    depth: Arc<AtomicUsize>,
}

impl Loader {
    pub fn new(effects: Arc<dyn UiEffects>) -> Self {
        Loader {
            effects,
            depth: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Shows the loader until the returned guard is dropped. Brackets may nest;
    /// the loader hides when the outermost one ends.
    pub fn show(&self) -> LoaderGuard {
        if self.depth.fetch_add(1, Ordering::SeqCst) == 0 {
            debug!("Showing loader");
            self.effects.set_loader_visible(true);
        }
        LoaderGuard { loader: self.clone() }
    }

    pub fn is_visible(&self) -> bool {
        self.depth.load(Ordering::SeqCst) > 0
    }
}

#[must_use = "the loader hides as soon as the guard is dropped"]
pub struct LoaderGuard {
    loader: Loader,
}

impl Drop for LoaderGuard {
    fn drop(&mut self) {
        if self.loader.depth.fetch_sub(1, Ordering::SeqCst) == 1 {
            debug!("Hiding loader");
            self.loader.effects.set_loader_visible(false);
        }
    }
}

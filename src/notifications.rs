use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use crate::domain::{Notification, Severity};

pub const DEFAULT_DISMISS_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Default)]
struct Slot {
    current: Option<Notification>,
    generation: u64,
}

/// Holds at most one toast and owns the task that dismisses it.
///
/// Every `show` aborts the pending dismissal and bumps a generation counter;
/// a dismissal that already woke up only clears the slot if its generation
/// is still current, so a stale timer never removes a newer message.
///
/// Outside a tokio runtime there is nothing to run the dismissal on, so the
/// toast stays until it is replaced or dismissed.
pub struct NotificationManager {
    slot: Arc<Mutex<Slot>>,
    timer: Option<JoinHandle<()>>,
    dismiss_after: Duration,
}

impl NotificationManager {
    pub fn new(dismiss_after: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Slot::default())),
            timer: None,
            dismiss_after,
        }
    }

    pub fn dismiss_after(&self) -> Duration {
        self.dismiss_after
    }

    pub fn show(&mut self, text: impl Into<String>, severity: Severity) {
        let notification = Notification::new(text, severity);
        tracing::info!(severity = severity.as_str(), text = %notification.text, "Showing notification");

        self.cancel_timer();
        let generation = {
            let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
            slot.generation += 1;
            slot.current = Some(notification);
            slot.generation
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("No tokio runtime, notification will not auto-dismiss");
            return;
        };
        let slot = Arc::clone(&self.slot);
        let dismiss_after = self.dismiss_after;
        self.timer = Some(runtime.spawn(async move {
            tokio::time::sleep(dismiss_after).await;
            let mut slot = slot.lock().unwrap_or_else(|e| e.into_inner());
            if slot.generation == generation {
                slot.current = None;
            }
        }));
    }

    pub fn dismiss(&mut self) {
        self.cancel_timer();
        let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
        slot.generation += 1;
        slot.current = None;
    }

    pub fn current(&self) -> Option<Notification> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner()).current.clone()
    }

    fn cancel_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Default for NotificationManager {
    fn default() -> Self {
        Self::new(DEFAULT_DISMISS_AFTER)
    }
}

impl Drop for NotificationManager {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}

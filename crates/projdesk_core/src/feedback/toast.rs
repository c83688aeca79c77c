//! Transient toast notifications.
//!
//! A toast goes through three observable phases: queued (present but not yet
//! visible), revealed (text visible) and expired (removed). Time is passed in
//! explicitly so callers and tests control the clock.

use log::debug;
use std::time::{Duration, Instant};
use tokio::sync::watch;

pub type ToastId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Failure,
}

/// A toast whose text is currently visible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibleToast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub message: String,
}

#[derive(Debug, Clone)]
struct Toast {
    id: ToastId,
    kind: ToastKind,
    message: String,
    queued_at: Instant,
}

pub struct ToastChannel {
    reveal_delay: Duration,
    duration: Duration,
    next_id: ToastId,
    toasts: Vec<Toast>,
    visible_tx: watch::Sender<Vec<VisibleToast>>,
}

impl ToastChannel {
    pub fn new(reveal_delay: Duration, duration: Duration) -> Self {
        let (visible_tx, _) = watch::channel(Vec::new());
        Self {
            reveal_delay,
            duration,
            next_id: 1,
            toasts: Vec::new(),
            visible_tx,
        }
    }

    /// Queues a toast and publishes the visible set as of `now`.
    pub fn push(&mut self, kind: ToastKind, message: impl Into<String>, now: Instant) -> ToastId {
        let id = self.next_id;
        self.next_id += 1;
        let message = message.into();
        debug!("event=toast_queued module=feedback id={id} kind={kind:?} message={message}");
        self.toasts.push(Toast {
            id,
            kind,
            message,
            queued_at: now,
        });
        self.tick(now);
        id
    }

    /// Drops expired toasts and republishes the visible set.
    pub fn tick(&mut self, now: Instant) {
        let lifetime = self.reveal_delay + self.duration;
        self.toasts
            .retain(|toast| now.saturating_duration_since(toast.queued_at) < lifetime);
        let visible = self.visible(now);
        self.visible_tx.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }

    /// True while the toast exists, revealed or not.
    pub fn is_present(&self, id: ToastId) -> bool {
        self.toasts.iter().any(|toast| toast.id == id)
    }

    /// True once the toast's text is visible at `now` and until it expires.
    pub fn is_visible(&self, id: ToastId, now: Instant) -> bool {
        self.visible(now).iter().any(|toast| toast.id == id)
    }

    /// Toasts whose text is visible at `now`.
    pub fn visible(&self, now: Instant) -> Vec<VisibleToast> {
        let lifetime = self.reveal_delay + self.duration;
        self.toasts
            .iter()
            .filter(|toast| {
                let age = now.saturating_duration_since(toast.queued_at);
                age >= self.reveal_delay && age < lifetime
            })
            .map(|toast| VisibleToast {
                id: toast.id,
                kind: toast.kind,
                message: toast.message.clone(),
            })
            .collect()
    }

    /// True when a visible toast contains `needle`.
    pub fn shows_text(&self, needle: &str, now: Instant) -> bool {
        self.visible(now)
            .iter()
            .any(|toast| toast.message.contains(needle))
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<VisibleToast>> {
        self.visible_tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::{ToastChannel, ToastKind};
    use std::time::{Duration, Instant};

    fn channel() -> ToastChannel {
        ToastChannel::new(Duration::from_millis(100), Duration::from_millis(1000))
    }

    #[test]
    fn toast_is_present_before_visible() {
        let mut toasts = channel();
        let start = Instant::now();
        let id = toasts.push(ToastKind::Success, "Project created successfully", start);

        assert!(toasts.is_present(id));
        assert!(!toasts.is_visible(id, start));
        assert!(!toasts.shows_text("Project created", start));
        assert!(toasts.is_visible(id, start + Duration::from_millis(100)));
        assert!(toasts.shows_text(
            "Project created",
            start + Duration::from_millis(100)
        ));
    }

    #[test]
    fn toast_self_dismisses_after_duration() {
        let mut toasts = channel();
        let start = Instant::now();
        let id = toasts.push(ToastKind::Failure, "boom", start);

        toasts.tick(start + Duration::from_millis(1099));
        assert!(toasts.is_present(id));
        toasts.tick(start + Duration::from_millis(1100));
        assert!(!toasts.is_present(id));
    }

    #[test]
    fn subscribers_see_revealed_toasts_only() {
        let mut toasts = channel();
        let rx = toasts.subscribe();
        let start = Instant::now();
        toasts.push(ToastKind::Success, "saved", start);
        assert!(rx.borrow().is_empty());

        toasts.tick(start + Duration::from_millis(150));
        assert_eq!(rx.borrow().len(), 1);
        assert_eq!(rx.borrow()[0].message, "saved");
    }
}

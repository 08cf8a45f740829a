//! Transient single-slot notifications with per-instance dismissal.

use std::{sync::Arc, time::Duration};

use tokio::sync::Mutex;
use tracing::debug;

use crate::effects::{UiEffect, UiSurface};

pub const DEFAULT_NOTIFICATION_DURATION: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub token: u64,
    pub text: String,
    pub is_error: bool,
}

/// Pure slot state: showing replaces whatever is visible, dismissing only
/// acts when the token still names the visible notification.
#[derive(Debug, Default)]
pub struct NotificationSlot {
    current: Option<Notification>,
    next_token: u64,
}

impl NotificationSlot {
    pub fn show(&mut self, text: impl Into<String>, is_error: bool) -> (u64, UiEffect) {
        self.next_token += 1;
        let notification = Notification {
            token: self.next_token,
            text: text.into(),
            is_error,
        };
        let effect = UiEffect::ShowNotification {
            text: notification.text.clone(),
            is_error,
        };
        self.current = Some(notification);
        (self.next_token, effect)
    }

    pub fn dismiss(&mut self, token: u64) -> Option<UiEffect> {
        match &self.current {
            Some(current) if current.token == token => {
                self.current = None;
                Some(UiEffect::HideNotification)
            }
            _ => None,
        }
    }

    pub fn current(&self) -> Option<&Notification> {
        self.current.as_ref()
    }
}

#[derive(Clone)]
pub struct NotificationEmitter {
    slot: Arc<Mutex<NotificationSlot>>,
    surface: Arc<dyn UiSurface>,
    duration: Duration,
}

impl NotificationEmitter {
    pub fn new(surface: Arc<dyn UiSurface>, duration: Duration) -> Self {
        Self {
            slot: Arc::new(Mutex::new(NotificationSlot::default())),
            surface,
            duration,
        }
    }

    /// Shows `text`, replacing any visible notification, and arms a dismissal
    /// timer for this instance only. Must be called inside a tokio runtime.
    pub async fn notify(&self, text: impl Into<String>, is_error: bool) -> u64 {
        let token = {
            let mut slot = self.slot.lock().await;
            let (token, effect) = slot.show(text, is_error);
            self.surface.apply(effect);
            token
        };
        debug!(token, is_error, "notification shown");

        let emitter = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(emitter.duration).await;
            emitter.dismiss(token).await;
        });
        token
    }

    /// Returns whether `token` was still visible and got hidden.
    pub async fn dismiss(&self, token: u64) -> bool {
        let mut slot = self.slot.lock().await;
        match slot.dismiss(token) {
            Some(effect) => {
                self.surface.apply(effect);
                debug!(token, "notification dismissed");
                true
            }
            None => {
                debug!(token, "stale dismissal ignored");
                false
            }
        }
    }

    pub async fn current(&self) -> Option<Notification> {
        self.slot.lock().await.current().cloned()
    }
}

#[cfg(test)]
#[path = "tests/notification_tests.rs"]
mod tests;

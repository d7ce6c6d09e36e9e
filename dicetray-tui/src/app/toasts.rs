use std::{
    collections::VecDeque,
    time::{Duration, Instant},
};

use dicetray::prelude::*;

pub const TOAST_LIFETIME: Duration = Duration::from_secs(3);
pub const MAX_TOASTS: usize = 4;

#[derive(Debug, Clone)]
pub struct Toast {
    pub notice: Notice,
    pub shown_at: Instant,
}

/// Short-lived messages stacked at the bottom of the screen.
#[derive(Debug, Default)]
pub struct Toasts {
    queue: VecDeque<Toast>,
}

impl Toasts {
    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.queue.iter().map(|t| &t.notice)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    /// Drops every toast older than [`TOAST_LIFETIME`]. Returns true if any were dropped.
    pub fn expire(&mut self, now: Instant) -> bool {
        let before = self.queue.len();
        self.queue
            .retain(|t| now.saturating_duration_since(t.shown_at) < TOAST_LIFETIME);
        self.queue.len() != before
    }

    fn push_at(&mut self, notice: Notice, now: Instant) {
        log::debug!("Toast ({:?}): {}", notice.severity, notice.message);
        // a repeated message refreshes the existing toast
        self.queue.retain(|t| t.notice != notice);
        self.queue.push_back(Toast {
            notice,
            shown_at: now,
        });
        while self.queue.len() > MAX_TOASTS {
            self.queue.pop_front();
        }
    }
}

impl NotificationSink for Toasts {
    fn notify(&mut self, notice: Notice) {
        self.push_at(notice, Instant::now());
    }
}

//! Per-room broadcast hub.
//!
//! Lives inside the room actor. Subscribers are keyed by session, not by
//! player, so one player watching from two tabs gets two copies.

use std::collections::HashMap;

use neologisms_protocol::{SessionId, Update};
use tokio::sync::mpsc;

/// Channel a session receives room updates on.
///
/// Unbounded: publishing never waits on a slow subscriber.
pub type UpdateSender = mpsc::UnboundedSender<Update>;

/// The sessions subscribed to one room.
#[derive(Debug, Default)]
pub struct BroadcastHub {
    subscribers: HashMap<SessionId, UpdateSender>,
}

impl BroadcastHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a subscriber and immediately sends it `current`,
    /// so a late joiner never waits for the next change.
    pub fn subscribe(&mut self, session: SessionId, sender: UpdateSender, current: Update) {
        if sender.send(current).is_err() {
            tracing::debug!(%session, "subscriber closed before first update");
            return;
        }
        self.subscribers.insert(session, sender);
    }

    /// Removes a subscriber. Returns `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, session: SessionId) -> bool {
        self.subscribers.remove(&session).is_some()
    }

    /// Sends `update` to every subscriber, dropping those whose receiver
    /// is gone.
    pub fn publish(&mut self, update: &Update) {
        self.subscribers.retain(|session, sender| {
            let alive = sender.send(update.clone()).is_ok();
            if !alive {
                tracing::debug!(%session, "pruning closed subscriber");
            }
            alive
        });
    }

    pub fn is_subscribed(&self, session: SessionId) -> bool {
        self.subscribers.contains_key(&session)
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }
}

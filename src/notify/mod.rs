//! Notification relay: one ordered, auto-expiring toast queue.
//!
//! Two independent origins feed it: server-pushed `logEvent` messages off the
//! validation channel, and local failures raised at REST call sites. Both land
//! in the same queue, in arrival order, and every toast is dropped after a
//! fixed delay regardless of type. `raise` is the explicit registration point;
//! there is no process-wide event bus.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use serde::{Deserialize, Serialize};
use tokio::runtime::Runtime;

use crate::{ShareLock, common::BroadcastQueue, utils};

/// Severity of a toast, as the backend labels its log events.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ToastKind {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// One transient status message.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    /// Monotonic id, unique per relay.
    pub id: u64,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
    /// Millisecond timestamp the toast was raised at.
    pub raised_at: i64,
}

/// Fan-out point for user-visible status messages.
pub struct NotificationRelay {
    toasts: ShareLock<Vec<Toast>>,
    broadcast: Arc<BroadcastQueue<Toast>>,
    next_id: AtomicU64,
    ttl: Duration,
    runtime: Arc<Runtime>,
}

impl NotificationRelay {
    pub(crate) fn new(
        ttl: Duration,
        queue_size: usize,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            toasts: ShareLock::new(Vec::new().into()),
            broadcast: BroadcastQueue::new(queue_size),
            next_id: AtomicU64::new(0),
            ttl,
            runtime,
        }
    }

    /// Appends a toast to the queue and schedules its expiry.
    ///
    /// Returns the toast's id. Call sites raising REST failures do not need
    /// any other handle on the relay.
    pub fn raise(
        &self,
        message: &str,
        kind: ToastKind,
    ) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let toast = Toast {
            id,
            message: message.to_string(),
            kind,
            raised_at: utils::time::time_millis(),
        };

        self.toasts.write().unwrap().push(toast.clone());
        let _ = self.broadcast.send(toast);

        let toasts = self.toasts.clone();
        let ttl = self.ttl;
        self.runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            toasts.write().unwrap().retain(|toast| toast.id != id);
        });

        id
    }

    /// The live queue, in arrival order.
    pub fn active(&self) -> Vec<Toast> {
        self.toasts.read().unwrap().clone()
    }

    /// Subscribes to every toast as it is raised.
    pub fn subscribe(&self) -> tokio::sync::broadcast::Receiver<Toast> {
        self.broadcast.subscribe()
    }
}

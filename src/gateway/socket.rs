//! The validation gateway: one owned WebSocket connection per editor.
//!
//! The gateway keeps a single bidirectional channel to the backend alive for
//! the lifetime of the editor. Outbound envelopes pass through a bounded queue
//! drained only while the socket is open; a send attempted while disconnected
//! waits behind the next connect attempt and is lost if that attempt fails
//! (logged, never surfaced). On unexpected close the gateway waits a fixed
//! delay and retries indefinitely, with no backoff and no retry cutoff.

use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use futures::{SinkExt, StreamExt};
use globset::{Glob, GlobMatcher};
use serde_json::Value as JsonValue;
use tokio::runtime::Runtime;
use tokio_tungstenite::{connect_async, tungstenite::Message as WsMessage};
use url::Url;

use crate::{
    DagflowError, Result, ShareLock,
    common::{Queue, Shutdown},
    config::GatewayConfig,
    gateway::message::Envelope,
    model::GraphSnapshot,
    utils::urls::ensure_trailing_slash,
};

/// Handler invoked for every inbound envelope whose kind matches the
/// subscription.
pub type MessageHandler = Arc<dyn Fn(&str, &JsonValue) + Send + Sync>;

/// Handle identifying one subscription, for idempotent removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

enum KindMatcher {
    Exact(String),
    Pattern(GlobMatcher),
}

impl KindMatcher {
    fn is_match(
        &self,
        kind: &str,
    ) -> bool {
        match self {
            KindMatcher::Exact(exact) => exact.eq(kind),
            KindMatcher::Pattern(matcher) => matcher.is_match(kind),
        }
    }
}

struct Subscription {
    id: SubscriptionId,
    matcher: KindMatcher,
    handler: MessageHandler,
}

/// Owned connection manager for the validation channel.
///
/// Constructed once per editor and injected into whichever components need it;
/// lifecycle is explicit (`open`/`close`), never first-caller-wins.
pub struct ValidationGateway {
    endpoint: Url,
    outbound: Arc<Queue<Envelope>>,
    subscriptions: ShareLock<Vec<Subscription>>,
    connected: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    reconnect_delay: Duration,
    next_subscription: AtomicU64,
    runtime: Arc<Runtime>,
    shutdown: Arc<Shutdown>,
}

impl ValidationGateway {
    pub fn new(
        endpoint: Url,
        config: &GatewayConfig,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            endpoint,
            outbound: Queue::new(config.send_queue_size),
            subscriptions: ShareLock::new(Vec::new().into()),
            connected: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            reconnect_delay: Duration::from_millis(config.reconnect_delay_ms),
            next_subscription: AtomicU64::new(0),
            runtime,
            shutdown: Arc::new(Shutdown::new()),
        }
    }

    /// Whether the socket is currently open.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Relaxed)
    }

    /// Registers a handler for one exact message kind.
    pub fn on(
        &self,
        kind: &str,
        handler: impl Fn(&str, &JsonValue) + Send + Sync + 'static,
    ) -> SubscriptionId {
        self.register(KindMatcher::Exact(kind.to_string()), Arc::new(handler))
    }

    /// Registers a handler for every message kind matching a glob pattern
    /// (e.g. `dag_*` or `*`).
    pub fn subscribe(
        &self,
        pattern: &str,
        handler: impl Fn(&str, &JsonValue) + Send + Sync + 'static,
    ) -> Result<SubscriptionId> {
        let matcher = Glob::new(pattern).map_err(|e| DagflowError::Gateway(format!("invalid subscription pattern: {}", e)))?.compile_matcher();
        Ok(self.register(KindMatcher::Pattern(matcher), Arc::new(handler)))
    }

    fn register(
        &self,
        matcher: KindMatcher,
        handler: MessageHandler,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.subscriptions.write().unwrap().push(Subscription {
            id,
            matcher,
            handler,
        });
        id
    }

    /// Removes a subscription; removing one that is already gone is a no-op.
    pub fn unsubscribe(
        &self,
        id: SubscriptionId,
    ) {
        self.subscriptions.write().unwrap().retain(|sub| sub.id != id);
    }

    /// Queues an envelope for the write half.
    ///
    /// Never fails synchronously: a full or closed queue is logged and the
    /// envelope dropped, matching the channel's no-ack contract.
    pub fn send(
        &self,
        envelope: Envelope,
    ) {
        if let Err(err) = self.outbound.send(envelope) {
            tracing::warn!("gateway dropped outbound message: {}", err);
        }
    }

    /// Pushes the whole snapshot for validation.
    pub fn send_graph(
        &self,
        snapshot: &GraphSnapshot,
    ) {
        match Envelope::dag_data(snapshot) {
            Ok(envelope) => self.send(envelope),
            Err(err) => tracing::warn!("failed to encode snapshot: {}", err),
        }
    }

    /// Sends a content search query.
    pub fn send_search(
        &self,
        query: &str,
    ) {
        self.send(Envelope::search_query(query));
    }

    /// Starts the connect loop. Idempotent.
    pub fn open(&self) {
        if self.running.swap(true, Ordering::Relaxed) {
            return;
        }

        let endpoint = self.endpoint.to_string();
        let outbound = self.outbound.clone();
        let subscriptions = self.subscriptions.clone();
        let connected = self.connected.clone();
        let shutdown = self.shutdown.clone();
        let reconnect_delay = self.reconnect_delay;

        self.runtime.spawn(async move {
            loop {
                if shutdown.is_terminated() {
                    break;
                }

                match connect_async(endpoint.as_str()).await {
                    Ok((stream, _)) => {
                        tracing::debug!("gateway connected to {}", endpoint);
                        connected.store(true, Ordering::Relaxed);
                        let (mut write, mut read) = stream.split();

                        loop {
                            tokio::select! {
                                _ = shutdown.wait() => {
                                    let _ = write.close().await;
                                    connected.store(false, Ordering::Relaxed);
                                    return;
                                }
                                Some(envelope) = outbound.next_async() => {
                                    match serde_json::to_string(&envelope) {
                                        Ok(text) => {
                                            if let Err(err) = write.send(WsMessage::Text(text.into())).await {
                                                tracing::warn!("gateway send failed: {}", err);
                                                break;
                                            }
                                        }
                                        Err(err) => tracing::warn!("gateway failed to encode {}: {}", envelope.kind, err),
                                    }
                                }
                                msg = read.next() => {
                                    match msg {
                                        Some(Ok(msg)) => {
                                            let Ok(text) = msg.to_text() else {
                                                continue;
                                            };
                                            if text.is_empty() {
                                                continue;
                                            }
                                            match serde_json::from_str::<Envelope>(text) {
                                                Ok(envelope) => dispatch(&subscriptions, &envelope),
                                                Err(err) => tracing::warn!("gateway received malformed message: {}", err),
                                            }
                                        }
                                        Some(Err(err)) => {
                                            tracing::warn!("gateway read failed: {}", err);
                                            break;
                                        }
                                        None => break,
                                    }
                                }
                            }
                        }

                        connected.store(false, Ordering::Relaxed);
                        tracing::debug!("gateway disconnected, reconnecting");
                    }
                    Err(err) => {
                        tracing::warn!("gateway connect to {} failed: {}", endpoint, err);
                    }
                }

                tokio::select! {
                    _ = shutdown.wait() => break,
                    _ = tokio::time::sleep(reconnect_delay) => {}
                }
            }
        });
    }

    /// Stops the connect loop and closes the socket.
    pub fn close(&self) {
        if !self.running.swap(false, Ordering::Relaxed) {
            return;
        }
        self.shutdown.shutdown();
    }

    /// Fans an envelope out to every matching subscriber.
    pub(crate) fn dispatch(
        &self,
        envelope: &Envelope,
    ) {
        dispatch(&self.subscriptions, envelope);
    }
}

fn dispatch(
    subscriptions: &ShareLock<Vec<Subscription>>,
    envelope: &Envelope,
) {
    let subscriptions = subscriptions.read().unwrap();
    for subscription in subscriptions.iter() {
        if subscription.matcher.is_match(&envelope.kind) {
            (subscription.handler)(&envelope.kind, &envelope.data);
        }
    }
}

/// Derives the socket endpoint from the page's own URL: the page path with
/// `ws` appended and the scheme swapped to its socket counterpart.
pub fn ws_endpoint(base: &Url) -> Result<Url> {
    let mut endpoint = ensure_trailing_slash(base).join("ws").map_err(|e| DagflowError::Gateway(e.to_string()))?;

    let scheme = match endpoint.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => return Err(DagflowError::Gateway(format!("unsupported scheme: {}", other))),
    };
    endpoint.set_scheme(scheme).map_err(|_| DagflowError::Gateway(format!("cannot derive socket scheme for {}", base)))?;
    Ok(endpoint)
}

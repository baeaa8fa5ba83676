//! Message queues for inter-component communication.
//!
//! Provides both point-to-point (Queue) and broadcast (BroadcastQueue) messaging.

use std::sync::Arc;

use tokio::sync::broadcast;

use crate::{DagflowError, Result};

/// Bounded MPMC (multi-producer, multi-consumer) queue.
///
/// Used for the gateway's outbound sends, where each envelope must be drained
/// by exactly one writer task. Backed by flume for high-performance message
/// passing.
#[derive(Clone)]
pub struct Queue<T> {
    receiver: Arc<flume::Receiver<T>>,
    sender: Arc<flume::Sender<T>>,
}

impl<T> Queue<T> {
    /// create a new queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, rx) = flume::bounded(cap);

        Arc::new(Self {
            receiver: Arc::new(rx),
            sender: Arc::new(tx),
        })
    }

    /// send a message to the queue
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.try_send(msg).map_err(|e| DagflowError::Queue(e.to_string()))
    }

    /// receive a message from the queue asynchronously
    pub async fn next_async(&self) -> Option<T> {
        self.receiver.recv_async().await.ok()
    }
}

/// Broadcast queue for one-to-many message distribution.
///
/// Used for graph-change events and toast fan-out, where all subscribers
/// receive every message. Backed by tokio's broadcast channel.
#[derive(Clone)]
pub struct BroadcastQueue<T> {
    sender: Arc<broadcast::Sender<T>>,
}

impl<T: Clone> BroadcastQueue<T> {
    /// create a new broadcast queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, _) = broadcast::channel(cap);

        Arc::new(Self {
            sender: Arc::new(tx),
        })
    }

    /// send a message to the queue
    pub fn send(
        &self,
        msg: T,
    ) -> Result<()> {
        self.sender.send(msg).map_err(|e| DagflowError::Queue(e.to_string()))?;
        Ok(())
    }

    /// subscribe to the queue
    pub fn subscribe(&self) -> broadcast::Receiver<T> {
        self.sender.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_queue_bounded_send() {
        let queue = Queue::new(1);
        assert!(queue.send(1u32).is_ok());
        // Full queue rejects instead of blocking
        assert!(queue.send(2u32).is_err());
    }

    #[test]
    fn test_broadcast_fan_out() {
        let queue = BroadcastQueue::new(8);
        let mut a = queue.subscribe();
        let mut b = queue.subscribe();
        queue.send("hello").unwrap();
        assert_eq!(a.try_recv().unwrap(), "hello");
        assert_eq!(b.try_recv().unwrap(), "hello");
    }
}

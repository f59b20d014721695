//! Fan-out of [`ProgressEvent`]s to live observers.
//!
//! Backed by a `tokio::sync::broadcast` channel: publishing never waits on
//! observers, and an observer that falls more than the channel capacity
//! behind skips the events it missed rather than holding up the runner.

use engine_logging::engine_warn;
use futures_util::Stream;
use relay_core::ProgressEvent;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

const DEFAULT_CAPACITY: usize = 1024;

/// Destination for events produced by a running job.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

pub struct ProgressBroadcaster {
    sender: broadcast::Sender<ProgressEvent>,
}

impl ProgressBroadcaster {
    /// `capacity` bounds how far an observer may lag before it starts losing events.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Deliver to every current observer. Returns how many observers were
    /// subscribed; with none, the event is dropped.
    pub fn publish(&self, event: ProgressEvent) -> usize {
        self.sender.send(event).unwrap_or(0)
    }

    /// Observe every event published from now on. Dropping the
    /// subscription unsubscribes.
    pub fn subscribe(&self) -> Subscription {
        Subscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ProgressBroadcaster {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl ProgressSink for ProgressBroadcaster {
    fn emit(&self, event: ProgressEvent) {
        self.publish(event);
    }
}

pub struct Subscription {
    receiver: broadcast::Receiver<ProgressEvent>,
}

impl Subscription {
    /// Next event in emission order, or `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    engine_warn!("Progress observer lagged; skipped {} event(s)", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Non-blocking variant of [`Subscription::recv`].
    pub fn try_recv(&mut self) -> Option<ProgressEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    engine_warn!("Progress observer lagged; skipped {} event(s)", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}

    pub fn into_stream(self) -> impl Stream<Item = ProgressEvent> + Send {
        futures_util::stream::unfold(self, |mut subscription| async move {
            subscription
                .recv()
                .await
                .map(|event| (event, subscription))
        })
    }
}

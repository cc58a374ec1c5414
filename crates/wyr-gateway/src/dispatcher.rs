use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::sync::broadcast;

use wyr_engine::{Notifier, NotifyError};
use wyr_types::events::PollEvent;

const BROADCAST_CAPACITY: usize = 1024;

/// Fans poll events out to every connected platform adapter.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<DispatcherInner>,
}

struct DispatcherInner {
    /// All connected adapters receive all events
    broadcast_tx: broadcast::Sender<PollEvent>,

    /// Open WebSocket connections, for health reporting
    connections: AtomicUsize,
}

impl Dispatcher {
    pub fn new() -> Self {
        let (broadcast_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            inner: Arc::new(DispatcherInner {
                broadcast_tx,
                connections: AtomicUsize::new(0),
            }),
        }
    }

    /// Subscribe to poll events. Returns a broadcast receiver.
    pub fn subscribe(&self) -> broadcast::Receiver<PollEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Broadcast an event; returns how many subscribers will see it.
    pub fn broadcast(&self, event: PollEvent) -> Result<usize, NotifyError> {
        let kind = event.kind();
        self.inner
            .broadcast_tx
            .send(event)
            .map_err(|_| NotifyError::NoSubscribers(kind))
    }

    pub fn connection_opened(&self) {
        self.inner.connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.inner.connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn connection_count(&self) -> usize {
        self.inner.connections.load(Ordering::Relaxed)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for Dispatcher {
    fn publish(&self, event: PollEvent) -> Result<(), NotifyError> {
        self.broadcast(event).map(|_| ())
    }
}

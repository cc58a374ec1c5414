use thiserror::Error;

use wyr_types::events::PollEvent;

#[derive(Debug, Error)]
pub enum NotifyError {
    /// Nobody is listening; the event is dropped.
    #[error("no subscribers for {0}")]
    NoSubscribers(&'static str),
}

/// Sink for best-effort side effects. Implementations may drop events;
/// the engine logs failures and carries on.
pub trait Notifier: Send + Sync {
    fn publish(&self, event: PollEvent) -> Result<(), NotifyError>;
}

/// No-op notifier that discards all events.
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn publish(&self, _event: PollEvent) -> Result<(), NotifyError> {
        Ok(())
    }
}

use tokio::sync::broadcast;

use crate::{ChannelParseError, SyncAction, SyncChannel, SyncSubscription, TRACING_TARGET};

/// Default number of buffered notifications per subscriber.
pub const DEFAULT_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub(crate) struct Notification {
    pub channel: SyncChannel,
    pub action: SyncAction,
}

/// Fan-out point between the push transport and subscribed views.
///
/// Cheap to clone; clones publish to the same subscribers.
#[derive(Debug, Clone)]
pub struct DataSync {
    sender: broadcast::Sender<Notification>,
}

impl Default for DataSync {
    fn default() -> Self {
        Self::new()
    }
}

impl DataSync {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a hub buffering up to `capacity` notifications per subscriber.
    ///
    /// A zero capacity is raised to one.
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Publishes a raw notification as received from the transport.
    ///
    /// Returns the number of subscribers it reached.
    pub fn publish(&self, channel: &str, action: &str) -> Result<usize, ChannelParseError> {
        let channel = channel.parse::<SyncChannel>().inspect_err(|error| {
            tracing::debug!(target: TRACING_TARGET, error = %error, "dropping notification");
        })?;

        Ok(self.notify(channel, SyncAction::parse(action)))
    }

    /// Publishes a typed notification, returning the number of subscribers.
    pub fn notify(&self, channel: SyncChannel, action: SyncAction) -> usize {
        tracing::trace!(
            target: TRACING_TARGET,
            channel = %channel,
            action = %action,
            "notification published"
        );

        // Sending fails only when nobody is subscribed.
        self.sender
            .send(Notification { channel, action })
            .unwrap_or_default()
    }

    /// Subscribes to `channel`.
    pub fn subscribe(&self, channel: SyncChannel) -> SyncSubscription {
        SyncSubscription::new(channel, self.sender.subscribe())
    }

    /// Returns the number of live subscriptions over all channels.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}
